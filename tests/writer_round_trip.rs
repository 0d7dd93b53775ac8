//! Round-trip laws for the phase-4 code writer (§8, property 3 and law R1).
//!
//! Deliberately uses plain `assert_eq!` over literal expected strings rather than
//! `insta::assert_debug_snapshot!` — a snapshot test needs a pre-recorded `.snap` file next to
//! it, and there is no way to record one here without running the output through the writer once
//! first. A literal expectation is exactly as precise and does not need that step.

use mathlingua::phase4::writer::{write_root, TextCodeWriter};
use mathlingua::parse_structural;

fn text_round_trip(source: &str) -> String {
    let (root, diagnostics) = parse_structural(source, "<test>");
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    write_root(&root, Box::new(TextCodeWriter::new()))
}

#[test]
fn single_section_round_trips() {
    let output = text_round_trip("Axiom:\n. 'x = x'\n");
    assert_eq!(output, "Axiom:\n'x = x'\n");
}

#[test]
fn formulation_argument_keeps_its_backticks() {
    let output = text_round_trip("Axiom:\n. `x = x`\n");
    assert_eq!(output, "Axiom:\n`x = x`\n");
}

#[test]
fn re_running_the_writer_output_through_parse_structural_is_a_fixed_point() {
    // (R1) structural(text) -> code writer -> structural(.) yields the same structural tree.
    let (first_root, diagnostics) = parse_structural("Axiom:\n. 'x = x'\nthen:\n. 'x = x'\n", "<test>");
    assert!(diagnostics.is_empty());
    let rendered = write_root(&first_root, Box::new(TextCodeWriter::new()));

    let (second_root, second_diagnostics) = parse_structural(&rendered, "<test>");
    assert!(second_diagnostics.is_empty());
    assert_eq!(first_root.items.len(), second_root.items.len());
}

#[test]
fn diagnostics_are_stable_across_re_parsing() {
    // (R2) parse(text) diagnostics list is stable under re-parsing.
    let source = "Defines: f(x)\nmeans:\n. `x`\nbogusSection:\n. 'y'\n";
    let (_document, first) = mathlingua::parse(source, "<test>");
    let (_document, second) = mathlingua::parse(source, "<test>");
    assert_eq!(first, second);
}
