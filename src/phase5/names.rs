//! Section and group name constants.
//!
//! Transcribed from the original Go `internal/ast/names.go` constant block: every reserved
//! section/group keyword, including the `?`-suffixed optional variants. The trailing `?` is a
//! naming *convention* signalling "this section is optional" — [`schema`](super::schema)
//! decides optionality from the schema row, not from this suffix (see DESIGN.md's Open
//! Question decisions).

// --- top-level group names ---
pub const UPPER_DEFINES_NAME: &str = "Defines";
pub const UPPER_DESCRIBES_NAME: &str = "Describes";
pub const UPPER_STATES_NAME: &str = "States";
pub const LOWER_STATES_NAME: &str = "states";
pub const UPPER_AXIOM_NAME: &str = "Axiom";
pub const UPPER_CONJECTURE_NAME: &str = "Conjecture";
pub const UPPER_THEOREM_NAME: &str = "Theorem";
pub const UPPER_COROLLARY_NAME: &str = "Corollary";
pub const UPPER_LEMMA_NAME: &str = "Lemma";
pub const UPPER_SPECIFY_NAME: &str = "Specify";
pub const UPPER_PERSON_NAME: &str = "Person";
pub const UPPER_RESOURCE_NAME: &str = "Resource";

// --- Defines/Describes/States shared optional sections ---
pub const LOWER_WITH_QUESTION: &str = "with?";
pub const LOWER_USING_QUESTION: &str = "using?";
pub const LOWER_WHEN_QUESTION: &str = "when?";
pub const LOWER_SUCH_THAT_QUESTION: &str = "suchThat?";
pub const LOWER_EXTENDS_QUESTION: &str = "extends?";
pub const LOWER_SATISFIES_QUESTION: &str = "satisfies?";
pub const LOWER_MEANS_QUESTION: &str = "means?";
pub const LOWER_SPECIFIES_QUESTION: &str = "specifies?";
pub const LOWER_EXPRESSES_QUESTION: &str = "expresses?";
pub const UPPER_PROVIDING_QUESTION: &str = "Providing?";
pub const UPPER_USING_QUESTION: &str = "Using?";
pub const UPPER_CODIFIED_QUESTION: &str = "Codified?";
pub const UPPER_DOCUMENTED_QUESTION: &str = "Documented?";
pub const UPPER_REFERENCES_QUESTION: &str = "References?";
pub const UPPER_ALIASES_QUESTION: &str = "Aliases?";
pub const UPPER_ID_QUESTION: &str = "Id?";

// --- axiom/conjecture/theorem/corollary/lemma shared sections ---
pub const LOWER_THEN: &str = "then";
pub const UPPER_PROOF_QUESTION: &str = "Proof?";

// --- clause group names ---
pub const UPPER_ALL_OF: &str = "allOf";
pub const UPPER_ANY_OF: &str = "anyOf";
pub const UPPER_ONE_OF: &str = "oneOf";
pub const LOWER_NOT: &str = "not";
pub const LOWER_EXISTS: &str = "exists";
pub const LOWER_EXISTS_UNIQUE: &str = "existsUnique";
pub const LOWER_FOR_ALL: &str = "forAll";
pub const LOWER_IF: &str = "if";
pub const LOWER_IFF: &str = "iff";
pub const LOWER_PIECEWISE: &str = "piecewise";
pub const LOWER_WHEN: &str = "when";
pub const LOWER_THEN_CLAUSE: &str = "then";

// `states` (lower) names the same semantic slot as `States` (upper) — see DESIGN.md.
pub fn is_states_name(name: &str) -> bool {
    name == UPPER_STATES_NAME || name == LOWER_STATES_NAME
}

/// Strips a trailing `?` for display/comparison purposes that need the bare keyword, without
/// treating the `?` as authoritative for optionality (schema rows decide that).
pub fn bare(name: &str) -> &str {
    name.strip_suffix('?').unwrap_or(name)
}
