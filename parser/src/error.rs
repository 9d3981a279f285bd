//! Error handling.

use nom::error::{ErrorKind as NomErrorKind, ParseError};

use core::fmt;

use crate::{alloc::String, InputSpan, Location, Spanned};

/// Construct expected by the parser at a certain position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Expected {
    /// Closing parenthesis `)`.
    RightParen,
    /// Comma `,` or closing parenthesis `)` in a function call.
    CommaOrRightParen,
    /// `:` separating branches of a conditional expression.
    Colon,
    /// Field name after `.` in a member access.
    FieldName,
    /// End of input.
    End,
}

impl fmt::Display for Expected {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::RightParen => "`)`",
            Self::CommaOrRightParen => "`,` or `)`",
            Self::Colon => "`:`",
            Self::FieldName => "field name",
            Self::End => "end of input",
        })
    }
}

/// Parsing error kind.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No token rules were expecting this character. This includes operators switched off
    /// in [`ParseOptions`](crate::grammars::ParseOptions).
    UnknownChar(char),
    /// String literal without the closing quote.
    UnterminatedString,
    /// Unknown escape sequence in a string literal, e.g., `\q`.
    InvalidEscape(char),
    /// `\u` escape not followed by exactly 4 hex digits.
    InvalidUnicodeEscape(String),

    /// Parser expected a specific construct, but encountered something else.
    Expected(Expected),
    /// Token cannot start an expression.
    UnexpectedToken(String),
    /// Input has ended where an expression was expected.
    UnexpectedEnd,
    /// Member access (`.`) is switched off in the parsing options.
    MemberAccessDisabled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownChar(c) => write!(formatter, "Unknown character `{}`", c.escape_debug()),
            Self::UnterminatedString => formatter.write_str("Unterminated string literal"),
            Self::InvalidEscape(c) => {
                write!(formatter, "Illegal escape sequence: `\\{}`", c.escape_debug())
            }
            Self::InvalidUnicodeEscape(code) => {
                write!(formatter, "Illegal escape sequence: `\\u{}`", code)
            }
            Self::Expected(expected) => write!(formatter, "Expected {}", expected),
            Self::UnexpectedToken(token) => write!(formatter, "Unexpected {}", token),
            Self::UnexpectedEnd => formatter.write_str("Unexpected end of input"),
            Self::MemberAccessDisabled => {
                formatter.write_str("Unexpected `.`, member access is not permitted")
            }
        }
    }
}

impl ErrorKind {
    /// Checks whether this error is raised by the lexer, as opposed to the parser.
    pub fn is_lex_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownChar(_)
                | Self::UnterminatedString
                | Self::InvalidEscape(_)
                | Self::InvalidUnicodeEscape(_)
        )
    }

    pub(crate) fn with_span<T>(self, span: &Spanned<'_, T>) -> Error {
        Error {
            kind: self,
            location: span.location(),
            len: span.fragment().len(),
        }
    }
}

/// Lexing or parsing error together with its location in the code.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    location: Location,
    len: usize,
}

impl Error {
    pub(crate) fn new(span: InputSpan<'_>, kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location::from_span(&span),
            len: span.fragment().len(),
        }
    }

    pub(crate) fn at(span: InputSpan<'_>, len: usize, kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location::from_span(&span),
            len: len.min(span.fragment().len()),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the location of the error start.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the byte offset of the error start in the parsed code.
    pub fn offset(&self) -> usize {
        self.location.offset()
    }

    /// Returns the byte range of the code fragment the error relates to.
    pub fn range(&self) -> core::ops::Range<usize> {
        let start = self.location.offset();
        start..(start + self.len)
    }

    /// Checks whether this error is raised by the lexer, as opposed to the parser.
    pub fn is_lex_error(&self) -> bool {
        self.kind.is_lex_error()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}:{}: {}",
            self.location.line(),
            self.location.column(),
            self.kind
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl<'a> ParseError<InputSpan<'a>> for Error {
    fn from_error_kind(input: InputSpan<'a>, _kind: NomErrorKind) -> Self {
        let kind = match input.fragment().chars().next() {
            Some(c) => ErrorKind::UnknownChar(c),
            None => ErrorKind::UnexpectedEnd,
        };
        let len = input.fragment().chars().next().map_or(0, char::len_utf8);
        Self::at(input, len, kind)
    }

    fn append(_: InputSpan<'a>, _: NomErrorKind, other: Self) -> Self {
        other
    }
}
