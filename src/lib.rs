//! # mathlingua
//!
//!     A front-end compiler for MathLingua, a domain-specific language for expressing
//!     mathematical knowledge (definitions, theorems, axioms, proofs, resources) in a
//!     structured, indentation-driven textual form.
//!
//! Parser Architecture
//!
//!     The front-end is a strict pipeline of five phases, each a lazy re-shaping of the
//!     previous phase's token stream:
//!
//!     1. **Phase 1 — Character lexer** — raw lexical tokens from UTF-8 source text.
//!     2. **Phase 2 — Layout lexer** — indentation turned into `Indent`/`UnIndent`/
//!        `SameIndent`/`LineBreak`/`DotSpace` markers.
//!     3. **Phase 3 — Bracketing lexer** — explicit `BeginX`/`EndX` pairs so phase 4 is a
//!        pure matched-bracket parser.
//!     4. **Phase 4 — Structural parser** — an untyped tree of `Group`/`Section`/`Argument`.
//!     5. **Phase 5 — Typed parser** — a schema-matched typed AST, built by walking each group's
//!        sections against a data-driven schema registry rather than one parser per group kind.
//!
//!     Two cross-cutting facilities are threaded through every phase: the [`diagnostics`]
//!     tracker (positioned warnings/errors, never aborting) and the [`keygen`] monotonic key
//!     generator (unique identity for AST nodes).
//!
//! Getting Started
//!
//!     - For the two public entry points, see [`parse`] and [`parse_structural`].
//!     - For source positions, see [`position`].
//!     - For the typed AST, see [`phase5`].

#![allow(rustdoc::invalid_html_tags)]

pub mod diagnostics;
pub mod keygen;
pub mod parse;
pub mod phase1;
pub mod phase2;
pub mod phase3;
pub mod phase4;
pub mod phase5;
pub mod position;
pub mod token;

pub use diagnostics::{Diagnostic, DiagnosticTracker, Severity};
pub use keygen::{Key, KeyGenerator};
pub use parse::{parse, parse_structural};
pub use position::{Position, Range, SourceLocation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_input_has_no_diagnostics() {
        let (doc, diagnostics) = parse("", "<test>");
        assert!(doc.items.is_empty());
        assert!(diagnostics.is_empty());
    }
}
