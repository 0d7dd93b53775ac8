//! Phase 2 — the layout lexer.
//!
//! Consumes the phase-1 token stream and produces a cleaned stream with layout markers:
//! `Indent`/`UnIndent`/`SameIndent` for indentation changes, `LineBreak` for blank lines, and
//! `DotSpace` for the `. ` argument-bullet marker. Pure `Space` runs not at the start of a line
//! are dropped entirely.
//!
//! Grounded in the teacher's `sem_indentation` transform: find each line's start, count its
//! leading indentation, compare against the previous line's depth, and emit the appropriate
//! marker — adapted from the teacher's arbitrary-width `Indentation` token counting to this
//! spec's fixed two-space unit, and extended with dot-space argument detection, which the
//! teacher's transform has no equivalent of.

use crate::diagnostics::{DiagnosticTracker, Severity};
use crate::token::{Token, TokenKind};

const ORIGIN: &str = "phase2";
const INDENT_UNIT: usize = 2;

/// Finds the start index (into `tokens`) of the line containing `pos`.
fn find_line_start(tokens: &[Token], mut pos: usize) -> usize {
    while pos > 0 {
        pos -= 1;
        if tokens[pos].kind == TokenKind::Newline {
            return pos + 1;
        }
    }
    0
}

fn is_line_blank(tokens: &[Token], line_start: usize) -> bool {
    let mut i = line_start;
    if i < tokens.len() && tokens[i].kind == TokenKind::Space {
        i += 1;
    }
    i >= tokens.len() || tokens[i].kind == TokenKind::Newline
}

/// Counts this line's indentation depth in indent-units, given its leading `Space` run (if
/// any). Mixed tabs/spaces are an error handled by the caller via `has_tab`.
fn count_line_indent_steps(tokens: &[Token], line_start: usize, path: &str, tracker: &mut DiagnosticTracker) -> usize {
    if line_start >= tokens.len() || tokens[line_start].kind != TokenKind::Space {
        return 0;
    }
    let space_text = &tokens[line_start].text;
    if space_text.contains('\t') {
        tracker.append(
            Severity::Error,
            ORIGIN,
            path,
            tokens[line_start].range.clone(),
            "mixed tabs and spaces in indentation",
        );
    }
    let width = space_text.chars().count();
    if width % INDENT_UNIT != 0 {
        tracker.append(
            Severity::Error,
            ORIGIN,
            path,
            tokens[line_start].range.clone(),
            format!("indentation of {width} spaces is not a multiple of {INDENT_UNIT}"),
        );
    }
    width / INDENT_UNIT
}

fn starts_with_dot_space(tokens: &[Token], mut i: usize) -> bool {
    if i < tokens.len() && tokens[i].kind == TokenKind::Space {
        i += 1;
    }
    tokens.get(i).map(|t| t.kind) == Some(TokenKind::Dot)
        && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Space)
}

/// Runs phase 2 over the phase-1 token stream.
pub fn lex(tokens: &[Token], path: &str, tracker: &mut DiagnosticTracker) -> Vec<Token> {
    let mut result = Vec::new();
    let mut current_depth = 0usize;
    let mut i = 0usize;

    while i < tokens.len() {
        let line_start = find_line_start(tokens, i);

        if is_line_blank(tokens, line_start) {
            let mut j = line_start;
            if j < tokens.len() && tokens[j].kind == TokenKind::Space {
                j += 1;
            }
            if current_depth == 0 {
                if result.last().map(|t: &Token| t.kind) != Some(TokenKind::LineBreak) {
                    let range = tokens.get(j).map(|t| t.range.clone()).unwrap_or_default();
                    result.push(Token::new(TokenKind::LineBreak, "\n", range));
                }
            }
            i = if j < tokens.len() && tokens[j].kind == TokenKind::Newline { j + 1 } else { j };
            continue;
        }

        let target_depth = count_line_indent_steps(tokens, line_start, path, tracker);
        let marker_range = tokens[line_start].range.clone();

        match target_depth.cmp(&current_depth) {
            std::cmp::Ordering::Greater => {
                for _ in 0..(target_depth - current_depth) {
                    result.push(Token::new(TokenKind::Indent, "", marker_range.clone()));
                }
            }
            std::cmp::Ordering::Less => {
                for _ in 0..(current_depth - target_depth) {
                    result.push(Token::new(TokenKind::UnIndent, "", marker_range.clone()));
                }
            }
            std::cmp::Ordering::Equal => {
                result.push(Token::new(TokenKind::SameIndent, "", marker_range.clone()));
            }
        }
        current_depth = target_depth;

        let mut j = line_start;
        if j < tokens.len() && tokens[j].kind == TokenKind::Space {
            j += 1;
        }

        while j < tokens.len() && tokens[j].kind != TokenKind::Newline {
            if starts_with_dot_space(tokens, j) {
                if tokens[j].kind == TokenKind::Space {
                    j += 1;
                }
                result.push(Token::new(TokenKind::DotSpace, ". ", tokens[j].range.clone()));
                j += 2; // the Dot and the single Space following it
                continue;
            }
            if tokens[j].kind != TokenKind::Space {
                result.push(tokens[j].clone());
            }
            j += 1;
        }

        if j < tokens.len() && tokens[j].kind == TokenKind::Newline {
            j += 1;
        }
        i = j;
    }

    for _ in 0..current_depth {
        let range = tokens.last().map(|t| t.range.clone()).unwrap_or_default();
        result.push(Token::new(TokenKind::UnIndent, "", range));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticTracker;

    fn layout(source: &str) -> Vec<TokenKind> {
        let mut tracker = DiagnosticTracker::new();
        let p1 = crate::phase1::lex(source, "<test>", &mut tracker);
        lex(&p1, "<test>", &mut tracker).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn flat_section_has_same_indent_markers() {
        let kinds = layout("Axiom:\nthen:\n");
        assert!(kinds.contains(&TokenKind::SameIndent));
        assert!(!kinds.contains(&TokenKind::Indent));
    }

    #[test]
    fn nested_block_emits_indent_then_unindent() {
        let kinds = layout("Axiom:\n  then:\n");
        assert!(kinds.contains(&TokenKind::Indent));
        assert!(kinds.contains(&TokenKind::UnIndent));
    }

    #[test]
    fn dot_space_argument_is_recognised() {
        let kinds = layout("Axiom:\n. 'x = x'\n");
        assert!(kinds.contains(&TokenKind::DotSpace));
    }

    #[test]
    fn blank_lines_collapse_to_one_line_break() {
        let kinds = layout("Axiom:\n\n\nthen:\n");
        let count = kinds.iter().filter(|k| **k == TokenKind::LineBreak).count();
        assert!(count <= 1);
    }

    #[test]
    fn single_leading_space_is_an_error() {
        let mut tracker = DiagnosticTracker::new();
        let p1 = crate::phase1::lex(" Axiom:", "<test>", &mut tracker);
        let _ = lex(&p1, "<test>", &mut tracker);
        assert!(tracker.has_errors());
    }
}
