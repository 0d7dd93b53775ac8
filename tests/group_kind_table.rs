//! Table-driven coverage of the schema registry's top-level group kinds, in the teacher's
//! `#[rstest(param => [...])]` inline-list style (see `verbatim_dual.rs`).

use mathlingua::phase5::schema::GroupKind;
use mathlingua::phase5::TopLevelItem;
use rstest::rstest;

#[rstest]
#[case("Axiom:\n. `x = x`\nthen:\n. `x = x`\n", GroupKind::Axiom)]
#[case("Conjecture:\n. `x = x`\nthen:\n. `x = x`\n", GroupKind::Conjecture)]
#[case("Specify:\n. `x = x`\n", GroupKind::Specify)]
#[case("allOf:\n. `x = x`\n", GroupKind::AllOf)]
#[case("not:\n. `x = x`\n", GroupKind::Not)]
#[case("if:\n. `x = x`\nthen:\n. `y = y`\n", GroupKind::If)]
fn minimal_group_builds_with_the_expected_kind(#[case] source: &str, #[case] expected_kind: GroupKind) {
    let (document, diagnostics) = mathlingua::parse(source, "<test>");
    assert!(diagnostics.is_empty(), "unexpected diagnostics for {source:?}: {diagnostics:?}");
    match &document.items[0] {
        TopLevelItem::Node(node) => assert_eq!(node.kind, Some(expected_kind)),
        other => panic!("expected a node, got {other:?}"),
    }
}
