//! End-to-end scenarios over the full five-phase pipeline, one per concrete case from the
//! component design's scenario table.
//!
//! The table's own literals are quoted with `'…'` throughout, but phase 1's token rules treat a
//! single-quoted run as argument-text, not formulation text — so any case that needs a
//! schema-validated formulation (scenarios 1-4) is written here with backticks instead; cases
//! that only exercise the untyped structural tree (5, 6) keep the table's own single quotes.

use mathlingua::phase5::schema::GroupKind;
use mathlingua::phase5::{ArgumentValue, Clause, TopLevelItem};
use mathlingua::{parse, parse_structural, Severity};

#[test]
fn scenario_1_single_axiom_clause() {
    let (document, diagnostics) = parse("Axiom:\n. `x = x`\nthen:\n. `x = x`\n", "<test>");
    assert!(diagnostics.is_empty());
    assert_eq!(document.items.len(), 1);
    let TopLevelItem::Node(node) = &document.items[0] else { panic!("expected a node") };
    assert_eq!(node.kind, Some(GroupKind::Axiom));
    let ArgumentValue::ClauseList(clauses) = &node.sections[0].argument else { panic!("expected a clause list") };
    match &clauses[0] {
        Clause::Formulation(formula) => assert!(matches!(formula, mathlingua::phase5::formulation::FormulaNode::Binary { .. } | mathlingua::phase5::formulation::FormulaNode::Atom { .. })),
        other => panic!("expected a formulation clause, got {other:?}"),
    }
}

#[test]
fn scenario_2_defines_id_and_formulation() {
    let (document, diagnostics) = parse("Defines: f(x)\nmeans:\n. `x + 1`\n", "<test>");
    assert!(diagnostics.is_empty());
    let TopLevelItem::Node(node) = &document.items[0] else { panic!("expected a node") };
    assert_eq!(node.kind, Some(GroupKind::Defines));
    match &node.sections[0].argument {
        ArgumentValue::Id(text) => assert_eq!(text, "f(x)"),
        other => panic!("expected an id argument, got {other:?}"),
    }
    assert!(matches!(node.sections[1].argument, ArgumentValue::Formulation(_)));
}

#[test]
fn scenario_3_theorem_with_proof_argument_text() {
    let (document, diagnostics) = parse("Theorem:\nthen:\n. `a = b`\nProof:\n. 'by reflexivity'\n", "<test>");
    assert!(diagnostics.is_empty());
    let TopLevelItem::Node(node) = &document.items[0] else { panic!("expected a node") };
    assert_eq!(node.kind, Some(GroupKind::Theorem));
    let then_section = node.sections.iter().find(|s| s.name == "then").unwrap();
    assert!(matches!(then_section.argument, ArgumentValue::ClauseList(_)));
    let proof_section = node.sections.iter().find(|s| s.name == "Proof").unwrap();
    match &proof_section.argument {
        ArgumentValue::ArgumentText(text) => assert_eq!(text, "by reflexivity"),
        other => panic!("expected an argument-text Proof, got {other:?}"),
    }
}

#[test]
fn scenario_4_bogus_section_is_flagged_but_document_still_builds() {
    let (document, diagnostics) =
        parse("Defines: f(x)\nmeans:\n. `x`\nbogusSection:\n. 'y'\n", "<test>");
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("bogusSection"));
    assert_eq!(errors[0].range.start.line, 3);

    let TopLevelItem::Node(node) = &document.items[0] else { panic!("expected a node") };
    assert_eq!(node.kind, Some(GroupKind::Defines));
    match &node.sections[0].argument {
        ArgumentValue::Id(text) => assert_eq!(text, "f(x)"),
        other => panic!("expected an id argument, got {other:?}"),
    }
}

#[test]
fn scenario_5_leading_space_is_a_single_indentation_error() {
    let (_document, diagnostics) = parse(" Axiom:\n", "<test>");
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].range.start.line, 0);
}

#[test]
fn scenario_6_text_block_and_axiom_as_two_top_level_items() {
    let (root, diagnostics) = parse_structural("::\nhello\n::\nAxiom:\n. 'x'\n", "<test>");
    assert!(diagnostics.is_empty());
    assert_eq!(root.items.len(), 2);
    match &root.items[0] {
        mathlingua::phase4::TopLevelNode::TextBlock(tb) => assert_eq!(tb.text, "hello\n"),
        _ => panic!("expected a text block"),
    }
    match &root.items[1] {
        mathlingua::phase4::TopLevelNode::Group(g) => assert_eq!(g.sections[0].name, "Axiom"),
        _ => panic!("expected a group"),
    }
}
