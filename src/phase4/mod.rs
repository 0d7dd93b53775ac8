//! Phase 4 — the structural parser.
//!
//! Pure recursive-descent over the matched-bracket token stream from phase 3, producing the
//! untyped structural tree: [`StructuralRoot`] owns [`TopLevelNode`]s, each either a verbatim
//! text block or a [`Group`] of [`Section`]s, each holding zero or more [`Argument`]s. The
//! parser does not interpret section names, only records them; phase 5 does the interpreting.
//!
//! Never aborts: on unexpected input it records a diagnostic, consumes one token, and
//! continues — matching §4.4's recovery policy.

pub mod writer;

use crate::diagnostics::{DiagnosticTracker, Severity};
use crate::position::Range;
use crate::token::{Token, TokenKind};

const ORIGIN: &str = "phase4";

/// The root of the untyped structural tree for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralRoot {
    pub items: Vec<TopLevelNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelNode {
    TextBlock(TextBlock),
    Group(Group),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub range: Range,
}

/// An identifier attached to a group: either a `[…]` bracketed token run or a backtick
/// formulation serving as the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Id {
    pub text: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: Option<Id>,
    pub sections: Vec<Section>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// The section's name exactly as written, trailing `?` included when present.
    pub name: String,
    pub name_range: Range,
    pub arguments: Vec<Argument>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Group(Group),
    Text(String, Range),
    Formulation(String, Range),
    ArgumentText(String, Range),
    /// A bare, unquoted token run such as `f(x)` — an identifier serving directly as an
    /// argument, as opposed to one of the three quoted literal kinds above.
    Id(String, Range),
}

impl Argument {
    pub fn range(&self) -> &Range {
        match self {
            Argument::Group(g) => &g.range,
            Argument::Text(_, r) | Argument::Formulation(_, r) | Argument::ArgumentText(_, r) | Argument::Id(_, r) => r,
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    path: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn current_range(&self) -> Range {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.range.clone())
            .unwrap_or_default()
    }
}

/// Parses the phase-3 token stream into the untyped structural tree.
pub fn parse(tokens: &[Token], path: &str, tracker: &mut DiagnosticTracker) -> StructuralRoot {
    let mut parser = Parser { tokens, pos: 0, path };
    let mut items = Vec::new();

    while parser.peek().is_some() {
        match parser.peek_kind() {
            Some(TokenKind::TextBlock) => {
                let tok = parser.advance().unwrap();
                items.push(TopLevelNode::TextBlock(TextBlock { text: tok.text.clone(), range: tok.range.clone() }));
            }
            Some(TokenKind::BeginGroup) | Some(TokenKind::BeginSection) | Some(TokenKind::LSquare) | Some(TokenKind::FormulationTokenType) => {
                if let Some(group) = parse_group(&mut parser, tracker) {
                    items.push(TopLevelNode::Group(group));
                }
            }
            _ => {
                let range = parser.current_range();
                tracker.append(Severity::Error, ORIGIN, path, range, "stray token at top level");
                parser.advance();
            }
        }
    }

    StructuralRoot { items }
}

/// `Group := Id? Section+`
fn parse_group(parser: &mut Parser, tracker: &mut DiagnosticTracker) -> Option<Group> {
    let start_range = parser.current_range();
    let wrapped = parser.peek_kind() == Some(TokenKind::BeginGroup);
    if wrapped {
        parser.advance();
    }

    let id = parse_id(parser);

    let mut sections = Vec::new();
    while parser.peek_kind() == Some(TokenKind::BeginSection) {
        if let Some(section) = parse_section(parser, tracker) {
            sections.push(section);
        }
    }

    if sections.is_empty() {
        tracker.append(
            Severity::Error,
            ORIGIN,
            parser.path,
            start_range.clone(),
            "group has no sections",
        );
    }

    if wrapped {
        if parser.peek_kind() == Some(TokenKind::EndGroup) {
            parser.advance();
        } else {
            tracker.append(
                Severity::Error,
                ORIGIN,
                parser.path,
                parser.current_range(),
                "unclosed group (synthesised EndGroup)",
            );
        }
    }

    let end_range = sections.last().map(|s| s.range.clone()).unwrap_or_else(|| start_range.clone());
    let range = Range::bounding_box([start_range, end_range].iter()).unwrap_or_default();
    Some(Group { id, sections, range })
}

fn parse_id(parser: &mut Parser) -> Option<Id> {
    match parser.peek_kind() {
        Some(TokenKind::LSquare) => {
            let start = parser.advance().unwrap().range.clone();
            let mut text = String::from("[");
            while let Some(tok) = parser.peek() {
                if tok.kind == TokenKind::RSquare {
                    let end = parser.advance().unwrap().range.clone();
                    text.push(']');
                    let range = Range::bounding_box([start, end].iter()).unwrap_or_default();
                    return Some(Id { text, range });
                }
                text.push_str(&tok.text);
                parser.advance();
            }
            Some(Id { text, range: start })
        }
        Some(TokenKind::FormulationTokenType) => {
            let tok = parser.advance().unwrap();
            Some(Id { text: tok.text.clone(), range: tok.range.clone() })
        }
        _ => None,
    }
}

/// `Section := BeginSection Name Colon Argument* EndSection`
fn parse_section(parser: &mut Parser, tracker: &mut DiagnosticTracker) -> Option<Section> {
    let begin_range = parser.advance().unwrap().range.clone(); // BeginSection

    let name_tok = match parser.peek_kind() {
        Some(TokenKind::Name) => parser.advance().unwrap(),
        _ => {
            tracker.append(
                Severity::Error,
                ORIGIN,
                parser.path,
                begin_range.clone(),
                "expected section name after BeginSection",
            );
            return recover_to_boundary(parser);
        }
    };
    let name = name_tok.text.clone();
    let name_range = name_tok.range.clone();

    if parser.peek_kind() == Some(TokenKind::Colon) {
        parser.advance();
    } else {
        tracker.append(
            Severity::Error,
            ORIGIN,
            parser.path,
            name_range.clone(),
            format!("missing colon after section name '{name}'"),
        );
    }

    let mut arguments = Vec::new();
    loop {
        match parser.peek_kind() {
            Some(TokenKind::EndSection) => {
                parser.advance();
                break;
            }
            Some(TokenKind::BeginInlineArgument) | Some(TokenKind::BeginDotSpaceArgument) => {
                if let Some(arg) = parse_argument(parser, tracker) {
                    arguments.push(arg);
                }
            }
            Some(TokenKind::BeginGroup) => {
                if let Some(group) = parse_group(parser, tracker) {
                    arguments.push(Argument::Group(group));
                }
            }
            None => {
                tracker.append(
                    Severity::Error,
                    ORIGIN,
                    parser.path,
                    parser.current_range(),
                    "unclosed section at end of input",
                );
                break;
            }
            _ => {
                tracker.append(
                    Severity::Error,
                    ORIGIN,
                    parser.path,
                    parser.current_range(),
                    "stray token inside section",
                );
                parser.advance();
            }
        }
    }

    let end_range = arguments.last().map(|a| a.range().clone()).unwrap_or_else(|| name_range.clone());
    let range = Range::bounding_box([begin_range, end_range].iter()).unwrap_or_default();
    Some(Section { name, name_range, arguments, range })
}

fn parse_argument(parser: &mut Parser, tracker: &mut DiagnosticTracker) -> Option<Argument> {
    let dot_space = parser.peek_kind() == Some(TokenKind::BeginDotSpaceArgument);
    let begin = parser.advance().unwrap().range.clone(); // Begin{Inline,DotSpace}Argument
    let end_kind = if dot_space { TokenKind::EndDotSpaceArgument } else { TokenKind::EndInlineArgument };

    let payload = match parser.peek_kind() {
        Some(TokenKind::BeginGroup) => return parse_group(parser, tracker).map(Argument::Group),
        Some(TokenKind::Text) => {
            let tok = parser.advance().unwrap();
            Argument::Text(unquote(&tok.text), tok.range.clone())
        }
        Some(TokenKind::FormulationTokenType) => {
            let tok = parser.advance().unwrap();
            Argument::Formulation(unquote(&tok.text), tok.range.clone())
        }
        Some(TokenKind::ArgumentText) => {
            let tok = parser.advance().unwrap();
            Argument::ArgumentText(unquote(&tok.text), tok.range.clone())
        }
        Some(kind) if kind != end_kind => parse_id_run(parser, begin.clone(), end_kind),
        _ => {
            tracker.append(Severity::Error, ORIGIN, parser.path, begin.clone(), "expected an argument value");
            Argument::Text(String::new(), begin.clone())
        }
    };

    if parser.peek_kind() == Some(end_kind) {
        parser.advance();
    }
    Some(payload)
}

/// Consumes a bare, unquoted token run (e.g. `f(x)`) up to but not including `end_kind`,
/// concatenating each token's text verbatim. Used where a section's argument is a raw
/// identifier rather than one of the three quoted literal kinds.
fn parse_id_run(parser: &mut Parser, begin: Range, end_kind: TokenKind) -> Argument {
    let mut text = String::new();
    let mut last_range = begin.clone();
    while let Some(tok) = parser.peek() {
        if tok.kind == end_kind {
            break;
        }
        text.push_str(&tok.text);
        last_range = tok.range.clone();
        parser.advance();
    }
    let range = Range::bounding_box([begin, last_range].iter()).unwrap_or_default();
    Argument::Id(text, range)
}

/// Strips the delimiting quote/backtick character from both ends, per the literal's kind.
fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// Recovery: drop tokens until the next `BeginSection` or `EndGroup`, per §7.
fn recover_to_boundary(parser: &mut Parser) -> Option<Section> {
    while let Some(kind) = parser.peek_kind() {
        if kind == TokenKind::BeginSection || kind == TokenKind::EndGroup {
            break;
        }
        parser.advance();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticTracker;

    fn structural(source: &str) -> (StructuralRoot, DiagnosticTracker) {
        let mut tracker = DiagnosticTracker::new();
        let p1 = crate::phase1::lex(source, "<test>", &mut tracker);
        let p2 = crate::phase2::lex(&p1, "<test>", &mut tracker);
        let p3 = crate::phase3::lex(&p2, "<test>", &mut tracker);
        let root = parse(&p3, "<test>", &mut tracker);
        (root, tracker)
    }

    #[test]
    fn single_axiom_group_zero_diagnostics() {
        let (root, tracker) = structural("Axiom:\n. 'x = x'\n");
        assert_eq!(root.items.len(), 1);
        assert!(!tracker.has_errors());
        match &root.items[0] {
            TopLevelNode::Group(g) => {
                assert_eq!(g.sections.len(), 1);
                assert_eq!(g.sections[0].name, "Axiom");
            }
            _ => panic!("expected a group"),
        }
    }

    #[test]
    fn inline_id_argument_is_captured() {
        let (root, tracker) = structural("Defines: f(x)\nmeans:\n. `x + 1`\n");
        assert!(!tracker.has_errors());
        match &root.items[0] {
            TopLevelNode::Group(g) => {
                assert_eq!(g.sections[0].name, "Defines");
                assert_eq!(g.sections.len(), 2);
                match &g.sections[0].arguments[..] {
                    [Argument::Id(text, _)] => assert_eq!(text, "f(x)"),
                    other => panic!("expected a single id argument, got {other:?}"),
                }
            }
            _ => panic!("expected a group"),
        }
    }

    #[test]
    fn text_block_becomes_top_level_item() {
        let (root, tracker) = structural("::\nhello\n::\nAxiom:\n. 'x'\n");
        assert!(!tracker.has_errors());
        assert_eq!(root.items.len(), 2);
        match &root.items[0] {
            TopLevelNode::TextBlock(tb) => assert_eq!(tb.text, "hello\n"),
            _ => panic!("expected a text block"),
        }
    }
}
