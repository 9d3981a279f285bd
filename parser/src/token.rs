//! Tokens produced by the lexer.

use core::fmt;

use crate::{alloc::String, spans::escape_string, Literal, Spanned};

/// Kind of a [`Token`] together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    /// End of input.
    Eof,
    /// Operator, either symbolic (`+`, `<=`, `?`) or named (`and`, `sin`).
    /// Multiplication glyphs `∙` and `•` are normalized to `*`.
    Operator(&'a str),
    /// Number literal or numeric constant.
    Number(f64),
    /// String literal (with escape sequences resolved) or string constant.
    Str(String),
    /// Opening parenthesis.
    LeftParen,
    /// Closing parenthesis.
    RightParen,
    /// Comma.
    Comma,
    /// Variable or function name.
    Name(&'a str),
}

impl TokenKind<'_> {
    /// Checks whether this token is the specified operator.
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Self::Operator(this_op) if *this_op == op)
    }

    /// Checks whether this token is one of the specified operators.
    pub fn is_any_operator(&self, ops: &[&str]) -> bool {
        matches!(self, Self::Operator(this_op) if ops.contains(this_op))
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => formatter.write_str("end of input"),
            Self::Operator(op) => write!(formatter, "operator `{}`", op),
            Self::Number(value) => write!(formatter, "number {}", value),
            Self::Str(value) => write!(formatter, "string {}", escape_string(value)),
            Self::LeftParen => formatter.write_str("`(`"),
            Self::RightParen => formatter.write_str("`)`"),
            Self::Comma => formatter.write_str("`,`"),
            Self::Name(name) => write!(formatter, "name `{}`", name),
        }
    }
}

/// Positioned token.
pub type Token<'a> = Spanned<'a, TokenKind<'a>>;

impl From<Literal> for TokenKind<'_> {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(number) => Self::Number(number),
            Literal::Str(string) => Self::Str(string),
        }
    }
}
