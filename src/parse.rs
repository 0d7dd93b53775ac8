//! The complete processing pipeline from source text to typed document: phase 1 (character
//! lexer) through phase 5 (typed parser), behind one shared [`DiagnosticTracker`] and
//! [`KeyGenerator`].
//!
//! Mirrors the teacher's own `process_full`/`parse_document` entry points: one function per
//! granularity of result the caller might want (the full typed document, or just the untyped
//! structural tree for tooling that only needs source-preserving round-trips, e.g. `mlg doc`).

use crate::diagnostics::{Diagnostic, DiagnosticTracker};
use crate::keygen::KeyGenerator;
use crate::phase4::StructuralRoot;
use crate::phase5::Document;
use crate::{phase1, phase2, phase3, phase4, phase5};

/// Runs phases 1 through 3, returning the bracketed token stream phase 4 consumes. Exposed for
/// callers (and tests) that want to inspect the lexer pipeline without building a tree.
pub fn lex(source: &str, path: &str) -> (Vec<crate::token::Token>, Vec<Diagnostic>) {
    let mut tracker = DiagnosticTracker::new();
    let p1 = phase1::lex(source, path, &mut tracker);
    let p2 = phase2::lex(&p1, path, &mut tracker);
    let p3 = phase3::lex(&p2, path, &mut tracker);
    (p3, tracker.into_diagnostics())
}

/// Runs phases 1 through 4, returning the untyped structural tree. Used by `mlg doc` and the
/// code writers, which only need source structure, not schema-validated types.
pub fn parse_structural(source: &str, path: &str) -> (StructuralRoot, Vec<Diagnostic>) {
    let mut tracker = DiagnosticTracker::new();
    let p1 = phase1::lex(source, path, &mut tracker);
    let p2 = phase2::lex(&p1, path, &mut tracker);
    let p3 = phase3::lex(&p2, path, &mut tracker);
    let root = phase4::parse(&p3, path, &mut tracker);
    (root, tracker.into_diagnostics())
}

/// Runs the complete pipeline, phases 1 through 5, returning the typed document. This is the
/// primary entry point used by `mlg check` and `mlg view`.
pub fn parse(source: &str, path: &str) -> (Document, Vec<Diagnostic>) {
    let mut tracker = DiagnosticTracker::new();
    let mut keygen = KeyGenerator::new();
    let p1 = phase1::lex(source, path, &mut tracker);
    let p2 = phase2::lex(&p1, path, &mut tracker);
    let p3 = phase3::lex(&p2, path, &mut tracker);
    let root = phase4::parse(&p3, path, &mut tracker);
    let (document, _success) = phase5::build(&root, path, &mut tracker, &mut keygen);
    (document, tracker.into_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    #[test]
    fn parse_empty_input_has_no_diagnostics() {
        let (document, diagnostics) = parse("", "<test>");
        assert!(document.items.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_single_axiom_is_clean() {
        let (document, diagnostics) = parse("Axiom:\n. `x = x`\nthen:\n. `x = x`\n", "<test>");
        assert_eq!(document.items.len(), 1);
        assert!(diagnostics.iter().all(|d| d.severity != Severity::Error));
    }

    #[test]
    fn parse_structural_preserves_section_names_without_schema_checks() {
        let (root, diagnostics) = parse_structural("bogusSection:\n. 'x'\n", "<test>");
        assert_eq!(root.items.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_reports_leading_space_error() {
        let (_document, diagnostics) = parse(" Axiom:\n. 'x'\n", "<test>");
        assert!(diagnostics.iter().any(|d| d.severity == Severity::Error));
    }
}
