//! Types related to spanning parsed code.

use crate::{alloc::String, Error};

/// Code span.
pub type InputSpan<'a> = nom_locate::LocatedSpan<&'a str, ()>;
/// Parsing outcome generalized by the type returned on success.
pub type NomResult<'a, T> = nom::IResult<InputSpan<'a>, T, Error>;

/// Location of a code fragment: its byte offset together with the 1-based line and column.
///
/// Columns are counted in chars rather than bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    offset: usize,
    line: u32,
    column: usize,
}

impl Location {
    /// Computes the location of the specified offset in `code`. Offsets beyond the code length
    /// are clamped to the code end.
    pub fn from_offset(code: &str, offset: usize) -> Self {
        let mut offset = offset.min(code.len());
        while !code.is_char_boundary(offset) {
            offset -= 1;
        }
        let preceding = &code[..offset];
        let line_start = preceding.rfind('\n').map_or(0, |pos| pos + 1);
        let newlines = preceding.matches('\n').count();
        Self {
            offset,
            line: u32::try_from(newlines + 1).unwrap_or(u32::MAX),
            column: preceding[line_start..].chars().count() + 1,
        }
    }

    pub(crate) fn from_span(span: &InputSpan<'_>) -> Self {
        Self {
            offset: span.location_offset(),
            line: span.location_line(),
            column: span.get_utf8_column(),
        }
    }

    /// The offset represents the position of the fragment relatively to the input of the parser.
    /// It starts at offset 0.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The line number of the fragment relatively to the input of the parser. It starts at line 1.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The column of the fragment start. It starts at column 1.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Value together with the code fragment that has produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<'a, T = ()> {
    location: Location,
    fragment: &'a str,

    /// Extra information attached to the span.
    pub extra: T,
}

impl<'a, T> Spanned<'a, T> {
    pub(crate) fn new(span: InputSpan<'a>, extra: T) -> Self {
        Self {
            location: Location::from_span(&span),
            fragment: span.fragment(),
            extra,
        }
    }

    /// Returns the location of the fragment start.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The byte offset of the fragment in the parsed code.
    pub fn location_offset(&self) -> usize {
        self.location.offset
    }

    /// The fragment that is spanned.
    pub fn fragment(&self) -> &'a str {
        self.fragment
    }

    /// Maps the `extra` field of this span using the provided closure.
    pub fn map_extra<U>(self, map_fn: impl FnOnce(T) -> U) -> Spanned<'a, U> {
        Spanned {
            location: self.location,
            fragment: self.fragment,
            extra: map_fn(self.extra),
        }
    }

    /// Copies this span with the provided `extra` field.
    pub fn copy_with_extra<U>(&self, value: U) -> Spanned<'a, U> {
        Spanned {
            location: self.location,
            fragment: self.fragment,
            extra: value,
        }
    }
}

/// Wrapper around parsers allowing to capture both their output and the relevant span.
pub(crate) fn with_span<'a, O>(
    mut parser: impl FnMut(InputSpan<'a>) -> NomResult<'a, O>,
) -> impl FnMut(InputSpan<'a>) -> NomResult<'a, Spanned<'a, O>> {
    move |input: InputSpan<'a>| {
        parser(input).map(|(rest, output)| {
            let len = rest.location_offset() - input.location_offset();
            let spanned = Spanned {
                location: Location::from_span(&input),
                fragment: &input.fragment()[..len],
                extra: output,
            };
            (rest, spanned)
        })
    }
}

/// Escapes `value` so that it can be embedded into a double-quoted string literal.
pub(crate) fn escape_string(value: &str) -> String {
    use core::fmt::Write as _;

    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            c if c.is_control() => {
                let mut units = [0_u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(escaped, "\\u{:04x}", unit).ok();
                }
            }
            c => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}
