//! The group-schema registry: data, not code (§9).
//!
//! A `GroupSchema` is a fixed ordered list of `SectionSchema` rows, each naming a section and
//! whether it is required. Matching walks the schema and a group's actual section-name
//! sequence together in lockstep, consuming required entries, skipping optional ones that
//! don't appear, and reporting the first out-of-place section as an error. This keeps the
//! matcher one ~100-line function instead of one hand-written parser per group kind.

use super::names::*;
use once_cell::sync::Lazy;

/// The shape a section's arguments must take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSchema {
    SingleClause,
    ClauseList,
    Formulation,
    Text,
    ArgumentText,
    /// A bare, unquoted identifier argument, e.g. the `f(x)` in `Defines: f(x)`.
    Id,
    /// A section whose arguments are themselves nested groups matched against `GroupSchema`s
    /// of a listed kind (e.g. `Proof`'s proof-item arguments).
    SubGroupList,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    pub name: &'static str,
    pub required: bool,
    pub argument_schema: ArgumentSchema,
}

impl SectionSchema {
    const fn new(name: &'static str, required: bool, argument_schema: ArgumentSchema) -> Self {
        Self { name, required, argument_schema }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Defines,
    Describes,
    States,
    Axiom,
    Conjecture,
    Theorem,
    Corollary,
    Lemma,
    Specify,
    Person,
    Resource,
    AllOf,
    AnyOf,
    OneOf,
    Not,
    Exists,
    ExistsUnique,
    ForAll,
    If,
    Iff,
    Piecewise,
    When,
}

#[derive(Debug, Clone)]
pub struct GroupSchema {
    pub kind: GroupKind,
    pub sections: &'static [SectionSchema],
}

const DEFINES_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_DEFINES_NAME, true, ArgumentSchema::Id),
    SectionSchema::new(LOWER_WITH_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_USING_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_WHEN_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_SUCH_THAT_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_EXTENDS_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_SATISFIES_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_MEANS_QUESTION, false, ArgumentSchema::Formulation),
    SectionSchema::new(LOWER_SPECIFIES_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_EXPRESSES_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_PROVIDING_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_USING_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_CODIFIED_QUESTION, false, ArgumentSchema::Text),
    SectionSchema::new(UPPER_DOCUMENTED_QUESTION, false, ArgumentSchema::Text),
    SectionSchema::new(UPPER_REFERENCES_QUESTION, false, ArgumentSchema::Text),
    SectionSchema::new(UPPER_ALIASES_QUESTION, false, ArgumentSchema::Text),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const DESCRIBES_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_DESCRIBES_NAME, true, ArgumentSchema::Id),
    SectionSchema::new(LOWER_WITH_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_WHEN_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_EXTENDS_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_SATISFIES_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_DOCUMENTED_QUESTION, false, ArgumentSchema::Text),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const STATES_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_STATES_NAME, true, ArgumentSchema::Id),
    SectionSchema::new(LOWER_WITH_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_WHEN_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const AXIOM_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_AXIOM_NAME, true, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const CONJECTURE_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_CONJECTURE_NAME, true, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_PROOF_QUESTION, false, ArgumentSchema::ArgumentText),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const THEOREM_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_THEOREM_NAME, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_PROOF_QUESTION, false, ArgumentSchema::ArgumentText),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const COROLLARY_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_COROLLARY_NAME, true, ArgumentSchema::Text),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_PROOF_QUESTION, false, ArgumentSchema::ArgumentText),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const LEMMA_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_LEMMA_NAME, true, ArgumentSchema::Text),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_PROOF_QUESTION, false, ArgumentSchema::ArgumentText),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const SPECIFY_SECTIONS: &[SectionSchema] =
    &[SectionSchema::new(UPPER_SPECIFY_NAME, true, ArgumentSchema::ClauseList)];

const PERSON_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_PERSON_NAME, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const RESOURCE_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(UPPER_RESOURCE_NAME, true, ArgumentSchema::ClauseList),
    SectionSchema::new(UPPER_ID_QUESTION, false, ArgumentSchema::Text),
];

const ALL_OF_SECTIONS: &[SectionSchema] = &[SectionSchema::new(UPPER_ALL_OF, true, ArgumentSchema::ClauseList)];
const ANY_OF_SECTIONS: &[SectionSchema] = &[SectionSchema::new(UPPER_ANY_OF, true, ArgumentSchema::ClauseList)];
const ONE_OF_SECTIONS: &[SectionSchema] = &[SectionSchema::new(UPPER_ONE_OF, true, ArgumentSchema::ClauseList)];
const NOT_SECTIONS: &[SectionSchema] = &[SectionSchema::new(LOWER_NOT, true, ArgumentSchema::SingleClause)];
const EXISTS_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_EXISTS, true, ArgumentSchema::Text),
    SectionSchema::new(LOWER_WHEN_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_SUCH_THAT_QUESTION, false, ArgumentSchema::ClauseList),
];
const EXISTS_UNIQUE_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_EXISTS_UNIQUE, true, ArgumentSchema::Text),
    SectionSchema::new(LOWER_WHEN_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_SUCH_THAT_QUESTION, false, ArgumentSchema::ClauseList),
];
const FOR_ALL_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_FOR_ALL, true, ArgumentSchema::Text),
    SectionSchema::new(LOWER_WHEN_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_SUCH_THAT_QUESTION, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
];
const IF_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_IF, true, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
];
const IFF_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_IFF, true, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
];
const LOWER_ELSE_QUESTION: &str = "else?";
const PIECEWISE_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_PIECEWISE, true, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, false, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_ELSE_QUESTION, false, ArgumentSchema::ClauseList),
];
const WHEN_SECTIONS: &[SectionSchema] = &[
    SectionSchema::new(LOWER_WHEN, true, ArgumentSchema::ClauseList),
    SectionSchema::new(LOWER_THEN, true, ArgumentSchema::ClauseList),
];

static REGISTRY: Lazy<Vec<GroupSchema>> = Lazy::new(|| {
    vec![
        GroupSchema { kind: GroupKind::Defines, sections: DEFINES_SECTIONS },
        GroupSchema { kind: GroupKind::Describes, sections: DESCRIBES_SECTIONS },
        GroupSchema { kind: GroupKind::States, sections: STATES_SECTIONS },
        GroupSchema { kind: GroupKind::Axiom, sections: AXIOM_SECTIONS },
        GroupSchema { kind: GroupKind::Conjecture, sections: CONJECTURE_SECTIONS },
        GroupSchema { kind: GroupKind::Theorem, sections: THEOREM_SECTIONS },
        GroupSchema { kind: GroupKind::Corollary, sections: COROLLARY_SECTIONS },
        GroupSchema { kind: GroupKind::Lemma, sections: LEMMA_SECTIONS },
        GroupSchema { kind: GroupKind::Specify, sections: SPECIFY_SECTIONS },
        GroupSchema { kind: GroupKind::Person, sections: PERSON_SECTIONS },
        GroupSchema { kind: GroupKind::Resource, sections: RESOURCE_SECTIONS },
        GroupSchema { kind: GroupKind::AllOf, sections: ALL_OF_SECTIONS },
        GroupSchema { kind: GroupKind::AnyOf, sections: ANY_OF_SECTIONS },
        GroupSchema { kind: GroupKind::OneOf, sections: ONE_OF_SECTIONS },
        GroupSchema { kind: GroupKind::Not, sections: NOT_SECTIONS },
        GroupSchema { kind: GroupKind::Exists, sections: EXISTS_SECTIONS },
        GroupSchema { kind: GroupKind::ExistsUnique, sections: EXISTS_UNIQUE_SECTIONS },
        GroupSchema { kind: GroupKind::ForAll, sections: FOR_ALL_SECTIONS },
        GroupSchema { kind: GroupKind::If, sections: IF_SECTIONS },
        GroupSchema { kind: GroupKind::Iff, sections: IFF_SECTIONS },
        GroupSchema { kind: GroupKind::Piecewise, sections: PIECEWISE_SECTIONS },
        GroupSchema { kind: GroupKind::When, sections: WHEN_SECTIONS },
    ]
});

pub fn registry() -> &'static [GroupSchema] {
    &REGISTRY
}

/// Finds the schema whose required first section matches `first_section_name`, accounting for
/// the `States`/`states` alias (see DESIGN.md's Open Question decisions).
pub fn schema_for_first_section(first_section_name: &str) -> Option<&'static GroupSchema> {
    registry().iter().find(|schema| {
        let first = schema.sections.first().map(|s| s.name).unwrap_or("");
        first == first_section_name
            || (is_states_name(first) && is_states_name(first_section_name))
    })
}

/// The result of matching a group's actual section names against a schema: which schema
/// section (by index) each actual section bound to, and the unmatched (surplus) actual
/// section indices.
pub struct MatchResult {
    pub bindings: Vec<Option<usize>>,
    pub unmatched_actual: Vec<usize>,
}

/// Walks `schema` and `actual_names` together: consumes a schema entry when its name matches
/// the current actual name (accounting for the `States` alias), skips optional schema entries
/// that don't match, and records any actual section left over as unmatched. Order-sensitive:
/// permuting two required sections causes the second to fail to match in place and be recorded
/// as unmatched (§8, property 6).
pub fn match_schema(schema: &GroupSchema, actual_names: &[&str]) -> MatchResult {
    let mut bindings = vec![None; actual_names.len()];
    let mut unmatched_actual = Vec::new();
    let mut schema_idx = 0;
    let mut actual_idx = 0;

    while actual_idx < actual_names.len() {
        if schema_idx >= schema.sections.len() {
            unmatched_actual.push(actual_idx);
            actual_idx += 1;
            continue;
        }

        let schema_entry = &schema.sections[schema_idx];
        let actual = actual_names[actual_idx];
        let names_match = names_equivalent(schema_entry.name, actual);

        if names_match {
            bindings[actual_idx] = Some(schema_idx);
            schema_idx += 1;
            actual_idx += 1;
        } else if !schema_entry.required {
            schema_idx += 1;
        } else {
            unmatched_actual.push(actual_idx);
            actual_idx += 1;
        }
    }

    MatchResult { bindings, unmatched_actual }
}

fn names_equivalent(schema_name: &str, actual_name: &str) -> bool {
    if is_states_name(schema_name) && is_states_name(actual_name) {
        return true;
    }
    bare(schema_name) == bare(actual_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_schema_matches_minimal_group() {
        let schema = schema_for_first_section(UPPER_DEFINES_NAME).unwrap();
        let actual = [UPPER_DEFINES_NAME, "means?"];
        let result = match_schema(schema, &actual);
        assert!(result.unmatched_actual.is_empty());
        assert!(result.bindings.iter().all(Option::is_some));
    }

    #[test]
    fn unknown_section_is_unmatched() {
        let schema = schema_for_first_section(UPPER_DEFINES_NAME).unwrap();
        let actual = [UPPER_DEFINES_NAME, "means?", "bogusSection"];
        let result = match_schema(schema, &actual);
        assert_eq!(result.unmatched_actual, vec![2]);
    }

    #[test]
    fn permuting_required_sections_leaves_one_unmatched() {
        let schema = schema_for_first_section(LOWER_IF).unwrap();
        let actual = [LOWER_THEN_CLAUSE, LOWER_IF];
        let result = match_schema(schema, &actual);
        assert!(!result.unmatched_actual.is_empty());
    }

    #[test]
    fn states_alias_matches_either_spelling() {
        assert!(is_states_name(UPPER_STATES_NAME));
        assert!(is_states_name(LOWER_STATES_NAME));
        let schema = schema_for_first_section(LOWER_STATES_NAME).unwrap();
        assert_eq!(schema.kind, GroupKind::States);
    }
}
