//! Phase 1 — the character lexer.
//!
//! Converts UTF-8 source text into the primitive [`Token`](crate::token::Token) stream: names,
//! punctuation, operators, text/formulation/argument-text literals, newlines, whitespace runs.
//! Comments are discarded here and never reach phase 2.
//!
//! Built on a `logos`-derived raw scanner (mirroring the teacher's own lexer, which is also
//! `logos`-based); literal and comment recognition that needs custom termination logic (text
//! blocks, unterminated-literal recovery) is implemented with logos callbacks that scan the
//! lexer's remainder directly rather than a single regex.

use crate::diagnostics::{DiagnosticTracker, Severity};
use crate::position::{Range, SourceLocation};
use crate::token::{Token, TokenKind};
use logos::{Lexer, Logos};

const ORIGIN: &str = "phase1";

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"--[^\n]*")]
pub(crate) enum Raw {
    #[regex(r"/\*", block_comment)]
    BlockCommentOpen,

    #[token("::")]
    TextBlockOrColonColon,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Text,
    #[regex(r"`[^`]*`")]
    Formulation,
    #[regex(r"'[^']*'")]
    ArgumentText,

    #[token("`(")]
    BacktickLParen,
    #[token(")`")]
    RParenBacktick,
    #[token("`[")]
    BacktickLSquare,
    #[token("]`")]
    RSquareBacktick,
    #[token("`{")]
    BacktickLCurly,
    #[token("}`")]
    RCurlyBacktick,
    #[token("(:")]
    LParenColon,
    #[token(":)")]
    ColonRParen,
    #[token("{:")]
    LCurlyColon,
    #[token(":}")]
    ColonRCurly,

    #[token(":=")]
    ColonEquals,
    #[token(":->")]
    ColonDashArrow,
    #[token(":=>")]
    ColonArrow,
    #[token("|->")]
    BarRightDashArrow,
    #[token("...")]
    DotDotDot,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LSquare,
    #[token("]")]
    RSquare,
    #[token("{")]
    LCurly,
    #[token("}")]
    RCurly,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("/")]
    Slash,
    #[token("\\")]
    BackSlash,
    #[token("|")]
    Bar,
    #[token("_")]
    Underscore,
    #[token("@")]
    At,
    #[token("?")]
    QuestionMark,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*\??")]
    NameOrKeyword,

    #[regex(r"[!#$%^&*=+<>~-]+")]
    OperatorRun,

    #[regex(r"[ \t]+")]
    Space,
    #[token("\n")]
    Newline,
    #[token("\r")]
    CarriageReturn,
}

/// Scans to the closing `*/`, leaving the lexer positioned just past it. Returns `false`
/// (filtering the token out, i.e. the comment is discarded) on success; on an unterminated
/// comment the whole remainder is consumed and the caller reports the error.
fn block_comment(lex: &mut Lexer<Raw>) -> logos::Skip {
    if let Some(end) = lex.remainder().find("*/") {
        lex.bump(end + 2);
    } else {
        lex.bump(lex.remainder().len());
    }
    logos::Skip
}

/// Text blocks are carved out of the source text before the `logos` pass runs, since the
/// `::`-at-column-0 rule depends on line position, which a single-token regex cannot express.
fn extract_text_blocks(source: &str) -> Vec<(std::ops::Range<usize>, String)> {
    let mut blocks = Vec::new();
    let mut search_from = 0usize;
    loop {
        let Some(open_rel) = find_colon_colon_at_line_start(&source[search_from..]) else {
            break;
        };
        let open = search_from + open_rel;
        let after_open = open + 2;
        let Some(close_rel) = find_colon_colon_at_line_start(&source[after_open..]) else {
            break;
        };
        let close = after_open + close_rel;
        let interior = source[after_open..close].trim_start_matches('\n').to_string();
        blocks.push((open..close + 2, interior));
        search_from = close + 2;
    }
    blocks
}

fn find_colon_colon_at_line_start(s: &str) -> Option<usize> {
    let mut at_line_start = true;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if at_line_start && s[i..].starts_with("::") {
            return Some(i);
        }
        at_line_start = bytes[i] == b'\n';
        i += 1;
    }
    None
}

/// Runs phase 1 over `source`, appending diagnostics for unterminated literals and unrecognised
/// characters to `tracker`. Returns the primitive token stream, with text blocks already carved
/// out as whole [`TokenKind::TextBlock`] tokens.
pub fn lex(source: &str, path: &str, tracker: &mut DiagnosticTracker) -> Vec<Token> {
    let locator = SourceLocation::new(source);
    let text_blocks = extract_text_blocks(source);
    let mut tokens = Vec::new();
    let mut cursor = 0usize;
    let mut block_iter = text_blocks.into_iter().peekable();

    loop {
        if let Some((span, _)) = block_iter.peek() {
            if span.start == cursor {
                let (span, interior) = block_iter.next().unwrap();
                let range = locator.byte_range_to_range(&span);
                tokens.push(Token::new(TokenKind::TextBlock, interior, range));
                cursor = span.end;
                continue;
            }
        }

        let segment_end = block_iter.peek().map(|(span, _)| span.start).unwrap_or(source.len());
        if cursor >= segment_end {
            if cursor >= source.len() {
                break;
            }
            cursor = segment_end;
            continue;
        }

        let segment = &source[cursor..segment_end];
        let mut lexer = Raw::lexer(segment);
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let abs_span = (cursor + span.start)..(cursor + span.end);
            let range = locator.byte_range_to_range(&abs_span);
            let text = lexer.slice();

            match result {
                Ok(raw) => {
                    if let Some(kind) = classify(raw, text, &range, path, tracker) {
                        tokens.push(Token::new(kind, text, range));
                    }
                }
                Err(_) => {
                    tracker.append(
                        Severity::Error,
                        ORIGIN,
                        path,
                        range,
                        format!("unrecognised character(s): {text:?}"),
                    );
                }
            }
        }
        cursor = segment_end;
    }

    tokens
}

fn classify(
    raw: Raw,
    text: &str,
    range: &Range,
    path: &str,
    tracker: &mut DiagnosticTracker,
) -> Option<TokenKind> {
    use Raw::*;
    Some(match raw {
        BlockCommentOpen => return None,
        // Any `::` reaching the raw lexer was not claimed by `extract_text_blocks`, so it is
        // being used as a plain operator (e.g. inside a formulation).
        TextBlockOrColonColon => TokenKind::Operator,
        Text => {
            if !text.ends_with('"') || text.len() < 2 {
                tracker.append(Severity::Error, ORIGIN, path, range.clone(), "unterminated text literal");
            }
            TokenKind::Text
        }
        Formulation => {
            if !text.ends_with('`') || text.len() < 2 {
                tracker.append(Severity::Error, ORIGIN, path, range.clone(), "unterminated formulation literal");
            }
            TokenKind::FormulationTokenType
        }
        ArgumentText => {
            if !text.ends_with('\'') || text.len() < 2 {
                tracker.append(Severity::Error, ORIGIN, path, range.clone(), "unterminated argument text");
            }
            TokenKind::ArgumentText
        }
        BacktickLParen => TokenKind::BacktickLParen,
        RParenBacktick => TokenKind::RParenBacktick,
        BacktickLSquare => TokenKind::BacktickLSquare,
        RSquareBacktick => TokenKind::RSquareBacktick,
        BacktickLCurly => TokenKind::BacktickLCurly,
        RCurlyBacktick => TokenKind::RCurlyBacktick,
        LParenColon => TokenKind::LParenColon,
        ColonRParen => TokenKind::ColonRParen,
        LCurlyColon => TokenKind::LCurlyColon,
        ColonRCurly => TokenKind::ColonRCurly,
        ColonEquals => TokenKind::ColonEquals,
        ColonDashArrow => TokenKind::ColonDashArrow,
        ColonArrow => TokenKind::ColonArrow,
        BarRightDashArrow => TokenKind::BarRightDashArrow,
        DotDotDot => TokenKind::DotDotDot,
        LParen => TokenKind::LParen,
        RParen => TokenKind::RParen,
        LSquare => TokenKind::LSquare,
        RSquare => TokenKind::RSquare,
        LCurly => TokenKind::LCurly,
        RCurly => TokenKind::RCurly,
        Comma => TokenKind::Comma,
        Colon => TokenKind::Colon,
        Semicolon => TokenKind::Semicolon,
        Dot => TokenKind::Dot,
        Slash => TokenKind::Slash,
        BackSlash => TokenKind::BackSlash,
        Bar => TokenKind::Bar,
        Underscore => TokenKind::Underscore,
        At => TokenKind::At,
        QuestionMark => TokenKind::QuestionMark,
        NameOrKeyword => match text {
            "is" => TokenKind::Is,
            "as" => TokenKind::As,
            "extends" => TokenKind::Extends,
            "satisfies" => TokenKind::Satisfies,
            _ => TokenKind::Name,
        },
        OperatorRun => TokenKind::Operator,
        Space => TokenKind::Space,
        Newline => TokenKind::Newline,
        CarriageReturn => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(source: &str) -> Vec<Token> {
        let mut tracker = DiagnosticTracker::new();
        let tokens = lex(source, "<test>", &mut tracker);
        assert!(!tracker.has_errors(), "unexpected errors: {:?}", tracker.diagnostics());
        tokens
    }

    #[test]
    fn lexes_simple_section_header() {
        let tokens = lex_ok("Axiom:\n");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Name, TokenKind::Colon, TokenKind::Newline]);
    }

    #[test]
    fn lexes_argument_text_literal() {
        let tokens = lex_ok("'x = x'");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::ArgumentText);
        assert_eq!(tokens[0].text, "'x = x'");
    }

    #[test]
    fn lexes_formulation_literal() {
        let tokens = lex_ok("`x + 1`");
        assert_eq!(tokens[0].kind, TokenKind::FormulationTokenType);
    }

    #[test]
    fn discards_line_comments() {
        let tokens = lex_ok("-- a comment\nAxiom:\n");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Name, TokenKind::Colon, TokenKind::Newline]);
    }

    #[test]
    fn extracts_text_block_verbatim() {
        let tokens = lex_ok("::\nhello\n::\n");
        assert_eq!(tokens[0].kind, TokenKind::TextBlock);
        assert_eq!(tokens[0].text, "hello\n");
    }

    #[test]
    fn reports_unterminated_text_literal() {
        let mut tracker = DiagnosticTracker::new();
        let _ = lex("\"unterminated", "<test>", &mut tracker);
        assert!(tracker.has_errors());
    }

    #[test]
    fn reports_unrecognised_character() {
        let mut tracker = DiagnosticTracker::new();
        let _ = lex("\u{0001}", "<test>", &mut tracker);
        assert!(tracker.has_errors());
    }
}
