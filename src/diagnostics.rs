//! The diagnostic tracker — a mutable sink threaded by reference through every phase.
//!
//! Diagnostics never abort parsing. Each phase appends positioned messages and continues with
//! partial output; positions always point at the exact offending token, never at the start of
//! the enclosing construct.

use crate::position::Range;
use std::fmt;

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The source violates the grammar; parsing continues with a synthesised placeholder.
    Error,
    /// The source is accepted but suspect.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single positioned diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The phase that reported this diagnostic, e.g. `"phase1"`, `"phase5"`.
    pub origin: &'static str,
    pub path: String,
    pub range: Range,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}:{}: {}", self.severity, self.origin, self.path, self.range.start, self.message)
    }
}

/// Collects diagnostics in insertion order across all phases of one parse.
#[derive(Debug, Default)]
pub struct DiagnosticTracker {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, severity: Severity, origin: &'static str, path: &str, range: Range, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity,
            origin,
            path: path.to_string(),
            range,
            message: message.into(),
        };
        match diagnostic.severity {
            Severity::Error => log::error!("{diagnostic}"),
            Severity::Warning => log::warn!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}
