//! The formulation sub-parser: a `chumsky` combinator parser over the interior of a backtick
//! formulation literal, producing a formula-expression AST.
//!
//! Grounded in the teacher's `reference/document.rs` combinator style (functions returning
//! `impl Parser<...>`, composed with `.then()`/`.or()`/`recursive()`). This parser must be
//! total — every input yields either a node or a diagnostic-backed placeholder — and every
//! node it produces carries the formulation's range and a key, same as every other AST node
//! (§4.5).
//!
//! Precedence, low to high: `iff`/`if`/`when` keywords > `piecewise` > additive operators >
//! multiplicative operators > unary operators > application/atoms. This mirrors a classic
//! precedence-climbing ("Pratt") layering; `chumsky` 0.9 has no built-in Pratt combinator, so
//! each precedence level is its own `recursive`-composed layer, as the teacher's own combinator
//! parsers do for comparable layered grammars.

use chumsky::prelude::*;

use crate::keygen::{Key, KeyGenerator};
use crate::position::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum FormulaNode {
    Atom { text: String, key: Key, range: Range },
    Unary { op: String, operand: Box<FormulaNode>, key: Key, range: Range },
    Binary { op: String, lhs: Box<FormulaNode>, rhs: Box<FormulaNode>, key: Key, range: Range },
    Application { function: String, args: Vec<FormulaNode>, key: Key, range: Range },
    Tuple { items: Vec<FormulaNode>, key: Key, range: Range },
    Set { items: Vec<FormulaNode>, key: Key, range: Range },
    Sequence { items: Vec<FormulaNode>, key: Key, range: Range },
    Piecewise { arms: Vec<(FormulaNode, FormulaNode)>, key: Key, range: Range },
    Placeholder { key: Key, range: Range },
}

impl FormulaNode {
    pub fn range(&self) -> &Range {
        match self {
            FormulaNode::Atom { range, .. }
            | FormulaNode::Unary { range, .. }
            | FormulaNode::Binary { range, .. }
            | FormulaNode::Application { range, .. }
            | FormulaNode::Tuple { range, .. }
            | FormulaNode::Set { range, .. }
            | FormulaNode::Sequence { range, .. }
            | FormulaNode::Piecewise { range, .. }
            | FormulaNode::Placeholder { range, .. } => range,
        }
    }

    pub fn key(&self) -> Key {
        match self {
            FormulaNode::Atom { key, .. }
            | FormulaNode::Unary { key, .. }
            | FormulaNode::Binary { key, .. }
            | FormulaNode::Application { key, .. }
            | FormulaNode::Tuple { key, .. }
            | FormulaNode::Set { key, .. }
            | FormulaNode::Sequence { key, .. }
            | FormulaNode::Piecewise { key, .. }
            | FormulaNode::Placeholder { key, .. } => *key,
        }
    }
}

/// An untyped intermediate tree shape, before `Key`s and a shared `Range` are stamped onto it.
enum Shape {
    Atom(String),
    Unary(String, Box<Shape>),
    Binary(String, Box<Shape>, Box<Shape>),
    Application(String, Vec<Shape>),
    Tuple(Vec<Shape>),
    Set(Vec<Shape>),
    Sequence(Vec<Shape>),
    Piecewise(Vec<(Shape, Shape)>),
}

fn ident() -> impl Parser<char, String, Error = Simple<char>> {
    text::ident().padded()
}

/// An identifier that must spell exactly `kw`, consumed as a unit so that e.g. `iff` is never
/// mistaken for a prefix match against `if`.
fn keyword(kw: &'static str) -> impl Parser<char, (), Error = Simple<char>> + Clone {
    text::ident()
        .try_map(move |found: String, span| {
            if found == kw {
                Ok(())
            } else {
                Err(Simple::custom(span, format!("expected keyword `{kw}`")))
            }
        })
        .padded()
}

fn parser() -> impl Parser<char, Shape, Error = Simple<char>> {
    recursive(|expr| {
        let args = expr
            .clone()
            .separated_by(just(',').padded())
            .allow_trailing();

        let tuple = args.clone().delimited_by(just('(').padded(), just(')').padded()).map(Shape::Tuple);
        let set = args.clone().delimited_by(just('{').padded(), just('}').padded()).map(Shape::Set);
        let sequence = args.clone().delimited_by(just('[').padded(), just(']').padded()).map(Shape::Sequence);

        let application = ident()
            .then(args.delimited_by(just('(').padded(), just(')').padded()))
            .map(|(name, args)| Shape::Application(name, args));

        let atom = ident().map(Shape::Atom);

        let primary = application.or(tuple).or(set).or(sequence).or(atom).padded();

        let unary = just('-')
            .padded()
            .repeated()
            .then(primary)
            .foldr(|_, operand| Shape::Unary("-".to_string(), Box::new(operand)));

        let product_op = just('*').to("*".to_string()).or(just('/').to("/".to_string()));
        let product = unary
            .clone()
            .then(product_op.padded().then(unary).repeated())
            .foldl(|lhs, (op, rhs)| Shape::Binary(op, Box::new(lhs), Box::new(rhs)));

        let sum_op = just('+').to("+".to_string()).or(just('-').to("-".to_string()));
        let sum = product
            .clone()
            .then(sum_op.padded().then(product).repeated())
            .foldl(|lhs, (op, rhs)| Shape::Binary(op, Box::new(lhs), Box::new(rhs)));

        let equality = sum
            .clone()
            .then(just('=').padded().then(sum).repeated())
            .foldl(|lhs, (_, rhs)| Shape::Binary("=".to_string(), Box::new(lhs), Box::new(rhs)));

        let piecewise_arm = equality
            .clone()
            .then_ignore(just("=>").padded())
            .then(equality.clone());
        let piecewise = keyword("piecewise")
            .ignore_then(
                piecewise_arm
                    .separated_by(just(',').padded())
                    .allow_trailing()
                    .delimited_by(just('(').padded(), just(')').padded()),
            )
            .map(Shape::Piecewise)
            .or(equality);

        let keyword_op = keyword("iff")
            .to("iff".to_string())
            .or(keyword("if").to("if".to_string()))
            .or(keyword("when").to("when".to_string()));

        piecewise
            .clone()
            .then(keyword_op.then(piecewise).repeated())
            .foldl(|lhs, (op, rhs)| Shape::Binary(op, Box::new(lhs), Box::new(rhs)))
    })
}

/// Parses the interior text of a formulation literal; never fails — on a syntax error the
/// partial input is wrapped as a single [`FormulaNode::Atom`] carrying the raw text, matching
/// the "every input produces either a node or a diagnostic" totality requirement, with the
/// diagnostic itself appended by the caller (`phase5::parse_group`).
pub fn parse(text: &str, range: Range, keygen: &mut KeyGenerator) -> (FormulaNode, bool) {
    match parser().then_ignore(end()).parse(text) {
        Ok(shape) => (stamp(shape, &range, keygen), true),
        Err(_) => (FormulaNode::Atom { text: text.to_string(), key: keygen.next_key(), range }, false),
    }
}

fn stamp(shape: Shape, range: &Range, keygen: &mut KeyGenerator) -> FormulaNode {
    match shape {
        Shape::Atom(text) => FormulaNode::Atom { text, key: keygen.next_key(), range: range.clone() },
        Shape::Unary(op, operand) => FormulaNode::Unary {
            op,
            operand: Box::new(stamp(*operand, range, keygen)),
            key: keygen.next_key(),
            range: range.clone(),
        },
        Shape::Binary(op, lhs, rhs) => FormulaNode::Binary {
            op,
            lhs: Box::new(stamp(*lhs, range, keygen)),
            rhs: Box::new(stamp(*rhs, range, keygen)),
            key: keygen.next_key(),
            range: range.clone(),
        },
        Shape::Application(function, args) => FormulaNode::Application {
            function,
            args: args.into_iter().map(|a| stamp(a, range, keygen)).collect(),
            key: keygen.next_key(),
            range: range.clone(),
        },
        Shape::Tuple(items) => FormulaNode::Tuple {
            items: items.into_iter().map(|a| stamp(a, range, keygen)).collect(),
            key: keygen.next_key(),
            range: range.clone(),
        },
        Shape::Set(items) => FormulaNode::Set {
            items: items.into_iter().map(|a| stamp(a, range, keygen)).collect(),
            key: keygen.next_key(),
            range: range.clone(),
        },
        Shape::Sequence(items) => FormulaNode::Sequence {
            items: items.into_iter().map(|a| stamp(a, range, keygen)).collect(),
            key: keygen.next_key(),
            range: range.clone(),
        },
        Shape::Piecewise(arms) => FormulaNode::Piecewise {
            arms: arms
                .into_iter()
                .map(|(cond, value)| (stamp(cond, range, keygen), stamp(value, range, keygen)))
                .collect(),
            key: keygen.next_key(),
            range: range.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn range() -> Range {
        Range::new(0..0, Position::new(0, 0), Position::new(0, 0))
    }

    #[test]
    fn parses_simple_equality() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("x = x", range(), &mut keygen);
        assert!(ok);
        assert!(matches!(node, FormulaNode::Binary { ref op, .. } if op == "="));
    }

    #[test]
    fn parses_function_application() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("f(x)", range(), &mut keygen);
        assert!(ok);
        assert!(matches!(node, FormulaNode::Application { ref function, .. } if function == "f"));
    }

    #[test]
    fn parses_additive_chain() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("x + 1", range(), &mut keygen);
        assert!(ok);
        assert!(matches!(node, FormulaNode::Binary { ref op, .. } if op == "+"));
    }

    #[test]
    fn total_on_unparseable_input() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("@@@", range(), &mut keygen);
        assert!(!ok);
        assert!(matches!(node, FormulaNode::Atom { .. }));
    }

    #[test]
    fn parses_piecewise_arms() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("piecewise(x = x => x, x = y => y)", range(), &mut keygen);
        assert!(ok);
        assert!(matches!(node, FormulaNode::Piecewise { ref arms, .. } if arms.len() == 2));
    }

    #[test]
    fn parses_if_keyword_as_loosest_binary_operator() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("x = x if y = y", range(), &mut keygen);
        assert!(ok);
        assert!(matches!(node, FormulaNode::Binary { ref op, .. } if op == "if"));
    }

    #[test]
    fn iff_is_not_mistaken_for_if() {
        let mut keygen = KeyGenerator::new();
        let (node, ok) = parse("x = x iff y = y", range(), &mut keygen);
        assert!(ok);
        assert!(matches!(node, FormulaNode::Binary { ref op, .. } if op == "iff"));
    }
}
