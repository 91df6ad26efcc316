//! Expression parser
//!
//! Uses Chumsky for direct string parsing with good error recovery.
//!
//! Precedence, loosest to tightest: `+ -`, `* /`, `^` (right
//! associative), unary minus, atoms. Unary minus binds tighter than the
//! base of `^`, so `-2 ^ 2` parses as `(-2) ^ 2`.

use chumsky::prelude::*;

use crate::ast::{BinaryOp, Expr, UnaryOp};

/// Parse error type
pub type ParseError<'src> = Rich<'src, char>;

/// Parse expression source into an AST
pub fn parse(source: &str) -> (Option<Expr>, Vec<ParseError<'_>>) {
    expr()
        .then_ignore(end())
        .parse(source)
        .into_output_errors()
}

/// Parse an identifier (variable reference)
fn ident<'src>() -> impl Parser<'src, &'src str, String, extra::Err<ParseError<'src>>> + Clone {
    text::ascii::ident().map(|s: &str| s.to_string())
}

/// Parse an unsigned float; negation is handled by the unary layer
fn number<'src>() -> impl Parser<'src, &'src str, f64, extra::Err<ParseError<'src>>> + Clone {
    text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .then(
            one_of("eE")
                .then(one_of("+-").or_not())
                .then(text::digits(10))
                .or_not(),
        )
        .to_slice()
        .map(|s: &str| s.parse().unwrap_or(0.0))
}

fn expr<'src>() -> impl Parser<'src, &'src str, Expr, extra::Err<ParseError<'src>>> + Clone {
    recursive(|expr| {
        let atom = choice((
            number().map(Expr::Literal),
            ident().map(Expr::Var),
            expr.clone()
                .padded()
                .delimited_by(just('('), just(')')),
        ))
        .padded();

        // Unary negation
        let unary = just('-').padded().repeated().foldr(atom, |_, operand| {
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            }
        });

        // Exponentiation, right associative
        let power = unary
            .clone()
            .then_ignore(just('^').padded())
            .repeated()
            .foldr(unary, |left, right| Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(left),
                right: Box::new(right),
            });

        // Binary operators: * /
        let product = power.clone().foldl(
            choice((just('*').to(BinaryOp::Mul), just('/').to(BinaryOp::Div)))
                .padded()
                .then(power.clone())
                .repeated(),
            |left, (op, right)| Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        );

        // Binary operators: + -
        product.clone().foldl(
            choice((just('+').to(BinaryOp::Add), just('-').to(BinaryOp::Sub)))
                .padded()
                .then(product.clone())
                .repeated(),
            |left, (op, right)| Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    })
}
