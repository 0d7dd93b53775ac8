//! Phase 5 — the typed parser.
//!
//! Walks the phase-4 structural tree one more time, this time schema-aware: each [`Group`]'s
//! actual section names are matched against the [`schema`] registry for its kind, and the
//! matched sections are rebuilt into a typed [`Node`] whose [`ArgumentValue`]s carry either
//! nested clauses, a parsed [`formulation::FormulaNode`], or plain text. A schema mismatch never
//! aborts the group: it is recorded as a diagnostic and the group is still built on a
//! best-effort basis, per §4.5's failure policy.
//!
//! Every [`Node`] and [`Clause::Node`] carries a [`Key`] minted from the shared
//! [`KeyGenerator`], matching §3's "every phase-5 node has a unique key and a position"
//! invariant.
//!
//! The [`Visitor`] trait follows the teacher's `traits.rs` pattern: one default-empty method per
//! node shape, dispatched by a free `for_each` walk rather than a method on every node (phase 5's
//! node count is schema-driven, so a single generic walk is simpler than per-type `accept`
//! methods).

pub mod formulation;
pub mod names;
pub mod schema;

use crate::diagnostics::{DiagnosticTracker, Severity};
use crate::keygen::{Key, KeyGenerator};
use crate::phase4;
use crate::position::Range;
use formulation::FormulaNode;
use schema::{ArgumentSchema, GroupKind};

const ORIGIN: &str = "phase5";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub items: Vec<TopLevelItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    TextBlock(phase4::TextBlock),
    Node(Node),
}

/// A typed group: its kind (`None` when no schema in the registry claims its first section),
/// key, range, and the sections matched against that schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Option<GroupKind>,
    pub key: Key,
    pub range: Range,
    pub sections: Vec<BoundSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundSection {
    pub name: String,
    pub range: Range,
    pub argument: ArgumentValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Clause(Box<Clause>),
    ClauseList(Vec<Clause>),
    Formulation(FormulaNode),
    Text(String),
    ArgumentText(String),
    Id(String),
    SubGroupList(Vec<Node>),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Node(Node),
    Formulation(FormulaNode),
}

/// Walks a phase-4 structural root, producing the typed document. `success` is `false` when at
/// least one schema mismatch was recorded, mirroring §4.5's "the document is still returned, but
/// flagged" contract.
pub fn build(
    root: &phase4::StructuralRoot,
    path: &str,
    tracker: &mut DiagnosticTracker,
    keygen: &mut KeyGenerator,
) -> (Document, bool) {
    let before = tracker.count();
    let items = root
        .items
        .iter()
        .map(|item| match item {
            phase4::TopLevelNode::TextBlock(tb) => TopLevelItem::TextBlock(tb.clone()),
            phase4::TopLevelNode::Group(group) => TopLevelItem::Node(build_node(group, path, tracker, keygen)),
        })
        .collect();
    (Document { items }, tracker.count() == before)
}

fn build_node(group: &phase4::Group, path: &str, tracker: &mut DiagnosticTracker, keygen: &mut KeyGenerator) -> Node {
    let actual_names: Vec<&str> = group.sections.iter().map(|s| s.name.as_str()).collect();
    let first_name = actual_names.first().copied();

    let schema = first_name.and_then(schema::schema_for_first_section);
    let Some(schema) = schema else {
        if let Some(name) = first_name {
            tracker.append(
                Severity::Error,
                ORIGIN,
                path,
                group.range.clone(),
                format!("'{name}' does not begin a recognised group"),
            );
        } else {
            tracker.append(Severity::Error, ORIGIN, path, group.range.clone(), "group has no sections to match");
        }
        return Node {
            kind: None,
            key: keygen.next_key(),
            range: group.range.clone(),
            sections: group
                .sections
                .iter()
                .map(|section| best_effort_section(section, path, tracker, keygen))
                .collect(),
        };
    };

    let match_result = schema::match_schema(schema, &actual_names);

    for index in &match_result.unmatched_actual {
        tracker.append(
            Severity::Error,
            ORIGIN,
            path,
            group.sections[*index].name_range.clone(),
            format!("section '{}' does not belong in a {:?} group", group.sections[*index].name, schema.kind),
        );
    }

    for section_schema in schema.sections.iter().filter(|s| s.required) {
        let bound = match_result.bindings.iter().any(|binding| {
            binding.map(|idx| schema.sections[idx].name) == Some(section_schema.name)
        });
        if !bound {
            tracker.append(
                Severity::Error,
                ORIGIN,
                path,
                group.range.clone(),
                format!("missing required section '{}' in a {:?} group", section_schema.name, schema.kind),
            );
        }
    }

    let sections = group
        .sections
        .iter()
        .zip(match_result.bindings.iter())
        .map(|(section, binding)| match binding {
            Some(schema_idx) => build_bound_section(section, schema.sections[*schema_idx].argument_schema, path, tracker, keygen),
            None => best_effort_section(section, path, tracker, keygen),
        })
        .collect();

    Node { kind: Some(schema.kind), key: keygen.next_key(), range: group.range.clone(), sections }
}

fn build_bound_section(
    section: &phase4::Section,
    argument_schema: ArgumentSchema,
    path: &str,
    tracker: &mut DiagnosticTracker,
    keygen: &mut KeyGenerator,
) -> BoundSection {
    let argument = match argument_schema {
        ArgumentSchema::SingleClause => section
            .arguments
            .first()
            .map(|arg| ArgumentValue::Clause(Box::new(build_clause(arg, path, tracker, keygen))))
            .unwrap_or(ArgumentValue::Missing),
        ArgumentSchema::ClauseList => {
            ArgumentValue::ClauseList(section.arguments.iter().map(|arg| build_clause(arg, path, tracker, keygen)).collect())
        }
        ArgumentSchema::Formulation => match section.arguments.first() {
            Some(phase4::Argument::Formulation(text, range)) => {
                let (node, ok) = formulation::parse(text, range.clone(), keygen);
                if !ok {
                    tracker.append(Severity::Warning, ORIGIN, path, range.clone(), "formulation did not fully parse");
                }
                ArgumentValue::Formulation(node)
            }
            _ => {
                tracker.append(Severity::Error, ORIGIN, path, section.range.clone(), "expected a formulation argument");
                ArgumentValue::Missing
            }
        },
        ArgumentSchema::Text => match section.arguments.first() {
            Some(phase4::Argument::Text(text, _)) => ArgumentValue::Text(text.clone()),
            _ => {
                tracker.append(Severity::Error, ORIGIN, path, section.range.clone(), "expected a text argument");
                ArgumentValue::Missing
            }
        },
        ArgumentSchema::ArgumentText => match section.arguments.first() {
            Some(phase4::Argument::ArgumentText(text, _)) => ArgumentValue::ArgumentText(text.clone()),
            _ => {
                tracker.append(Severity::Error, ORIGIN, path, section.range.clone(), "expected an argument-text argument");
                ArgumentValue::Missing
            }
        },
        ArgumentSchema::Id => match section.arguments.first() {
            Some(phase4::Argument::Id(text, _)) => ArgumentValue::Id(text.clone()),
            _ => {
                tracker.append(Severity::Error, ORIGIN, path, section.range.clone(), "expected an id argument");
                ArgumentValue::Missing
            }
        },
        ArgumentSchema::SubGroupList => ArgumentValue::SubGroupList(
            section
                .arguments
                .iter()
                .filter_map(|arg| match arg {
                    phase4::Argument::Group(g) => Some(build_node(g, path, tracker, keygen)),
                    _ => {
                        tracker.append(Severity::Error, ORIGIN, path, arg.range().clone(), "expected a nested group");
                        None
                    }
                })
                .collect(),
        ),
    };
    BoundSection { name: section.name.clone(), range: section.range.clone(), argument }
}

/// Builds a section with no schema binding by inferring its shape from its own contents, so a
/// stray or unrecognised section still yields a usable (if unverified) node.
fn best_effort_section(section: &phase4::Section, path: &str, tracker: &mut DiagnosticTracker, keygen: &mut KeyGenerator) -> BoundSection {
    let argument = if section.arguments.iter().all(|a| matches!(a, phase4::Argument::Group(_))) && !section.arguments.is_empty() {
        ArgumentValue::ClauseList(section.arguments.iter().map(|arg| build_clause(arg, path, tracker, keygen)).collect())
    } else {
        match section.arguments.first() {
            Some(phase4::Argument::Formulation(text, range)) => {
                let (node, _) = formulation::parse(text, range.clone(), keygen);
                ArgumentValue::Formulation(node)
            }
            Some(phase4::Argument::Text(text, _)) => ArgumentValue::Text(text.clone()),
            Some(phase4::Argument::ArgumentText(text, _)) => ArgumentValue::ArgumentText(text.clone()),
            Some(phase4::Argument::Id(text, _)) => ArgumentValue::Id(text.clone()),
            Some(phase4::Argument::Group(g)) => ArgumentValue::Clause(Box::new(Clause::Node(build_node(g, path, tracker, keygen)))),
            None => ArgumentValue::Missing,
        }
    };
    BoundSection { name: section.name.clone(), range: section.range.clone(), argument }
}

fn build_clause(arg: &phase4::Argument, path: &str, tracker: &mut DiagnosticTracker, keygen: &mut KeyGenerator) -> Clause {
    match arg {
        phase4::Argument::Group(g) => Clause::Node(build_node(g, path, tracker, keygen)),
        phase4::Argument::Formulation(text, range) => {
            let (node, ok) = formulation::parse(text, range.clone(), keygen);
            if !ok {
                tracker.append(Severity::Warning, ORIGIN, path, range.clone(), "formulation did not fully parse");
            }
            Clause::Formulation(node)
        }
        phase4::Argument::Text(_, range) | phase4::Argument::ArgumentText(_, range) | phase4::Argument::Id(_, range) => {
            tracker.append(Severity::Error, ORIGIN, path, range.clone(), "expected a clause, found a text argument");
            Clause::Formulation(FormulaNode::Atom { text: String::new(), key: keygen.next_key(), range: range.clone() })
        }
    }
}

/// Implement this trait to walk a [`Document`]. Default implementations are empty, so only the
/// node kinds a caller cares about need overriding.
pub trait Visitor {
    fn visit_text_block(&mut self, _block: &phase4::TextBlock) {}
    fn visit_node(&mut self, _node: &Node) {}
    fn visit_clause(&mut self, _clause: &Clause) {}
    fn visit_formulation(&mut self, _formulation: &FormulaNode) {}
}

pub fn for_each(document: &Document, visitor: &mut dyn Visitor) {
    for item in &document.items {
        match item {
            TopLevelItem::TextBlock(tb) => visitor.visit_text_block(tb),
            TopLevelItem::Node(node) => visit_node(node, visitor),
        }
    }
}

fn visit_node(node: &Node, visitor: &mut dyn Visitor) {
    visitor.visit_node(node);
    for section in &node.sections {
        visit_argument(&section.argument, visitor);
    }
}

fn visit_argument(value: &ArgumentValue, visitor: &mut dyn Visitor) {
    match value {
        ArgumentValue::Clause(clause) => visit_clause(clause, visitor),
        ArgumentValue::ClauseList(clauses) => {
            for clause in clauses {
                visit_clause(clause, visitor);
            }
        }
        ArgumentValue::Formulation(node) => visitor.visit_formulation(node),
        ArgumentValue::SubGroupList(nodes) => {
            for node in nodes {
                visit_node(node, visitor);
            }
        }
        ArgumentValue::Text(_) | ArgumentValue::ArgumentText(_) | ArgumentValue::Id(_) | ArgumentValue::Missing => {}
    }
}

fn visit_clause(clause: &Clause, visitor: &mut dyn Visitor) {
    visitor.visit_clause(clause);
    match clause {
        Clause::Node(node) => visit_node(node, visitor),
        Clause::Formulation(node) => visitor.visit_formulation(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticTracker;

    fn typed(source: &str) -> (Document, bool, DiagnosticTracker) {
        let mut tracker = DiagnosticTracker::new();
        let mut keygen = KeyGenerator::new();
        let p1 = crate::phase1::lex(source, "<test>", &mut tracker);
        let p2 = crate::phase2::lex(&p1, "<test>", &mut tracker);
        let p3 = crate::phase3::lex(&p2, "<test>", &mut tracker);
        let root = phase4::parse(&p3, "<test>", &mut tracker);
        let (document, success) = build(&root, "<test>", &mut tracker, &mut keygen);
        (document, success, tracker)
    }

    #[test]
    fn axiom_group_builds_a_clause_list() {
        let (document, success, tracker) = typed("Axiom:\n. `x = x`\nthen:\n. `x = x`\n");
        assert!(success);
        assert!(!tracker.has_errors());
        match &document.items[0] {
            TopLevelItem::Node(node) => {
                assert_eq!(node.kind, Some(GroupKind::Axiom));
                assert_eq!(node.sections.len(), 2);
            }
            _ => panic!("expected a node"),
        }
    }

    #[test]
    fn missing_required_section_is_flagged() {
        let (_document, success, tracker) = typed("Axiom:\n. `x = x`\n");
        assert!(!success);
        assert!(tracker.has_errors());
    }

    #[test]
    fn unrecognised_first_section_yields_no_kind() {
        let (document, success, _tracker) = typed("notASection:\n. 'x'\n");
        assert!(!success);
        match &document.items[0] {
            TopLevelItem::Node(node) => assert_eq!(node.kind, None),
            _ => panic!("expected a node"),
        }
    }

    #[test]
    fn defines_group_binds_a_bare_id_argument() {
        let (document, success, tracker) = typed("Defines: f(x)\nmeans:\n. `x + 1`\n");
        assert!(success);
        assert!(!tracker.has_errors());
        match &document.items[0] {
            TopLevelItem::Node(node) => {
                assert_eq!(node.kind, Some(GroupKind::Defines));
                match &node.sections[0].argument {
                    ArgumentValue::Id(text) => assert_eq!(text, "f(x)"),
                    other => panic!("expected an id argument, got {other:?}"),
                }
            }
            _ => panic!("expected a node"),
        }
    }

    #[test]
    fn visitor_counts_nodes_and_formulations() {
        let (document, _success, _tracker) = typed("Axiom:\n. `x = x`\nthen:\n. `x = x`\n");

        struct Counter {
            nodes: usize,
            formulations: usize,
        }
        impl Visitor for Counter {
            fn visit_node(&mut self, _node: &Node) {
                self.nodes += 1;
            }
            fn visit_formulation(&mut self, _formulation: &FormulaNode) {
                self.formulations += 1;
            }
        }

        let mut counter = Counter { nodes: 0, formulations: 0 };
        for_each(&document, &mut counter);
        assert_eq!(counter.nodes, 1);
        assert_eq!(counter.formulations, 2);
    }
}
