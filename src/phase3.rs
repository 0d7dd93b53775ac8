//! Phase 3 — the bracketing lexer.
//!
//! Converts `Indent`/`UnIndent`/`SameIndent`/`DotSpace`/`LineBreak` markers and `Name`-then-
//! `Colon` pairs into explicit `BeginSection`/`EndSection`, `BeginGroup`/`EndGroup`,
//! `BeginDotSpaceArgument`/`EndDotSpaceArgument`, `BeginInlineArgument`/`EndInlineArgument`
//! pairs, so that phase 4 is a pure matched-bracket parser.
//!
//! No single teacher phase maps onto this one; it follows the teacher's general habit (seen in
//! `sem_indentation.rs` and the phase-1 lexer) of a single function walking a token slice with
//! an explicit stack, rather than building a tree recursively at the lexer layer.

use crate::diagnostics::{DiagnosticTracker, Severity};
use crate::token::{Token, TokenKind};

const ORIGIN: &str = "phase3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// A section is open; arguments seen so far determine whether it is still accepting an
    /// inline argument on the header line.
    Section,
    /// A group (the nested indented block following a section whose content is itself
    /// `Name:`-shaped) is open.
    Group,
    DotSpaceArgument,
    InlineArgument,
}

/// Runs phase 3 over the phase-2 token stream.
pub fn lex(tokens: &[Token], path: &str, tracker: &mut DiagnosticTracker) -> Vec<Token> {
    let mut out = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = 0usize;

    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::Name if is_section_header(tokens, i) => {
                close_open_section_if_any(&mut stack, &mut out, tok);
                out.push(Token::new(TokenKind::BeginSection, "", tok.range.clone()));
                stack.push(Frame::Section);
                out.push(tok.clone());
                i += 1; // the Name
                out.push(tokens[i].clone()); // the Colon
                i += 1;

                if let Some(next) = tokens.get(i) {
                    if next.kind != TokenKind::Newline
                        && next.kind != TokenKind::Indent
                        && next.kind != TokenKind::UnIndent
                        && next.kind != TokenKind::SameIndent
                        && next.kind != TokenKind::LineBreak
                        && next.kind != TokenKind::DotSpace
                    {
                        out.push(Token::new(TokenKind::BeginInlineArgument, "", next.range.clone()));
                        stack.push(Frame::InlineArgument);
                    }
                }
            }
            TokenKind::Indent => {
                if matches!(stack.last(), Some(Frame::InlineArgument)) {
                    close_frame(&mut stack, &mut out, tok);
                }
                if starts_group(tokens, i) {
                    out.push(Token::new(TokenKind::BeginGroup, "", tok.range.clone()));
                    stack.push(Frame::Group);
                }
                i += 1;
                continue;
            }
            TokenKind::UnIndent => {
                while matches!(stack.last(), Some(Frame::InlineArgument) | Some(Frame::DotSpaceArgument)) {
                    close_frame(&mut stack, &mut out, tok);
                }
                if matches!(stack.last(), Some(Frame::Section)) {
                    close_frame(&mut stack, &mut out, tok);
                }
                if matches!(stack.last(), Some(Frame::Group)) {
                    close_frame(&mut stack, &mut out, tok);
                    out.push(Token::new(TokenKind::EndGroup, "", tok.range.clone()));
                    stack.pop();
                }
                i += 1;
                continue;
            }
            TokenKind::DotSpace => {
                if matches!(stack.last(), Some(Frame::DotSpaceArgument)) {
                    close_frame(&mut stack, &mut out, tok);
                }
                out.push(Token::new(TokenKind::BeginDotSpaceArgument, "", tok.range.clone()));
                stack.push(Frame::DotSpaceArgument);
            }
            TokenKind::SameIndent | TokenKind::LineBreak => {
                // Layout noise with no bracketing significance once sections/arguments have
                // already been opened/closed by the surrounding Indent/UnIndent/DotSpace logic.
            }
            _ => {
                out.push(tok.clone());
            }
        }
        i += 1;
    }

    while let Some(frame) = stack.pop() {
        let range = tokens.last().map(|t| t.range.clone()).unwrap_or_default();
        match frame {
            Frame::InlineArgument => out.push(Token::new(TokenKind::EndInlineArgument, "", range)),
            Frame::DotSpaceArgument => out.push(Token::new(TokenKind::EndDotSpaceArgument, "", range)),
            Frame::Section => out.push(Token::new(TokenKind::EndSection, "", range)),
            Frame::Group => out.push(Token::new(TokenKind::EndGroup, "", range)),
        }
    }

    validate_balanced(&out, path, tracker);
    out
}

fn close_frame(stack: &mut Vec<Frame>, out: &mut Vec<Token>, at: &Token) {
    if let Some(frame) = stack.pop() {
        let kind = match frame {
            Frame::InlineArgument => TokenKind::EndInlineArgument,
            Frame::DotSpaceArgument => TokenKind::EndDotSpaceArgument,
            Frame::Section => TokenKind::EndSection,
            Frame::Group => TokenKind::EndGroup,
        };
        out.push(Token::new(kind, "", at.range.clone()));
    }
}

fn close_open_section_if_any(stack: &mut Vec<Frame>, out: &mut Vec<Token>, at: &Token) {
    while matches!(stack.last(), Some(Frame::InlineArgument) | Some(Frame::DotSpaceArgument)) {
        close_frame(stack, out, at);
    }
    if matches!(stack.last(), Some(Frame::Section)) {
        close_frame(stack, out, at);
    }
}

/// A `Name` opens a section header only when immediately followed by `Colon` (ignoring the
/// `Space` runs phase 2 has already stripped mid-line, since phase 2 never emits `Space` except
/// at a line's start, which is consumed separately).
fn is_section_header(tokens: &[Token], i: usize) -> bool {
    tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Colon)
}

/// A `Group` opens when the indented block's first significant line is itself `Name:`-shaped.
fn starts_group(tokens: &[Token], indent_idx: usize) -> bool {
    let mut j = indent_idx + 1;
    while let Some(tok) = tokens.get(j) {
        match tok.kind {
            TokenKind::SameIndent | TokenKind::LineBreak => j += 1,
            TokenKind::Name => return is_section_header(tokens, j),
            _ => return false,
        }
    }
    false
}

fn validate_balanced(tokens: &[Token], path: &str, tracker: &mut DiagnosticTracker) {
    let mut depth = 0i64;
    for tok in tokens {
        match tok.kind {
            TokenKind::BeginSection
            | TokenKind::BeginGroup
            | TokenKind::BeginDotSpaceArgument
            | TokenKind::BeginInlineArgument => depth += 1,
            TokenKind::EndSection
            | TokenKind::EndGroup
            | TokenKind::EndDotSpaceArgument
            | TokenKind::EndInlineArgument => {
                depth -= 1;
                if depth < 0 {
                    tracker.append(
                        Severity::Error,
                        ORIGIN,
                        path,
                        tok.range.clone(),
                        "unmatched closing bracketing marker",
                    );
                    depth = 0;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        let range = tokens.last().map(|t| t.range.clone()).unwrap_or_default();
        tracker.append(Severity::Error, ORIGIN, path, range, "unclosed bracketing marker at end of input");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticTracker;

    fn bracket(source: &str) -> Vec<TokenKind> {
        let mut tracker = DiagnosticTracker::new();
        let p1 = crate::phase1::lex(source, "<test>", &mut tracker);
        let p2 = crate::phase2::lex(&p1, "<test>", &mut tracker);
        lex(&p2, "<test>", &mut tracker).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn begin_section_end_section_balanced() {
        let kinds = bracket("Axiom:\n. 'x = x'\n");
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::BeginSection).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::EndSection).count(), 1);
    }

    #[test]
    fn dot_space_argument_is_bracketed() {
        let kinds = bracket("Axiom:\n. 'x = x'\n");
        assert!(kinds.contains(&TokenKind::BeginDotSpaceArgument));
        assert!(kinds.contains(&TokenKind::EndDotSpaceArgument));
    }

    #[test]
    fn inline_argument_on_header_line_is_bracketed() {
        let kinds = bracket("Defines: f(x)\nmeans:\n. 'x + 1'\n");
        assert!(kinds.contains(&TokenKind::BeginInlineArgument));
        assert!(kinds.contains(&TokenKind::EndInlineArgument));
    }

    #[test]
    fn nested_section_opens_a_group() {
        let kinds = bracket("Theorem:\nthen:\n. 'a = b'\nProof:\n. 'by reflexivity'\n");
        assert!(kinds.iter().filter(|k| **k == TokenKind::BeginSection).count() >= 2);
    }
}
