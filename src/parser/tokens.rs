use std::fmt;

use crate::error::Span;

/// Binary and unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// Left binding power of the infix form
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }

    /// Binding power used for the right operand.
    /// Power is right-associative, so it re-admits operators of equal strength.
    pub(crate) fn right_precedence(self) -> u8 {
        match self {
            Operator::Pow => self.precedence(),
            _ => self.precedence() + 1,
        }
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "**",
        }
    }
}

/// Binding power of unary minus: tighter than `*` and `/`, looser than `**`
pub(crate) const UNARY_PRECEDENCE: u8 = 25;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

/// A token together with its byte range in the normalized input
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::Operator(op) => f.write_str(op.symbol()),
            TokenKind::LeftParen => f.write_str("("),
            TokenKind::RightParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
        }
    }
}
