//! Pull-based lexer.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while, take_while1},
    character::complete::{anychar, char as tag_char, digit0, digit1, hex_digit1, one_of, satisfy},
    combinator::{map, opt, recognize, rest, value},
    error::{ErrorKind as NomErrorKind, ParseError},
    multi::many0_count,
    sequence::{pair, preceded, terminated, tuple},
    Err as NomErr, Parser as _, Slice,
};

use core::fmt;

use crate::{
    alloc::String,
    spans::{with_span, NomResult},
    Error, ErrorKind, Grammar, InputSpan, ParseOptions, Spanned, Token, TokenKind,
};

#[cfg(test)]
mod tests;

/// Whitespace and `/* .. */` comments. An unterminated comment spans to the end of input.
fn ws(input: InputSpan<'_>) -> NomResult<'_, InputSpan<'_>> {
    let narrow_ws = take_while1(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'));
    let long_comment = preceded(
        tag("/*"),
        alt((terminated(take_until("*/"), tag("*/")), rest)),
    );
    recognize(many0_count(alt((narrow_ws, long_comment)))).parse(input)
}

fn fold_digits(digits: &str, radix: u32) -> f64 {
    digits.chars().fold(0.0, |acc, c| {
        acc * f64::from(radix) + c.to_digit(radix).map_or(0.0, f64::from)
    })
}

/// Hexadecimal (`0x1F`) or binary (`0b101`) integer.
fn radix_integer(input: InputSpan<'_>) -> NomResult<'_, f64> {
    let hex = preceded(tag("0x"), hex_digit1);
    let binary = preceded(tag("0b"), take_while1(|c: char| c == '0' || c == '1'));
    alt((
        map(hex, |digits: InputSpan<'_>| fold_digits(digits.fragment(), 16)),
        map(binary, |digits: InputSpan<'_>| fold_digits(digits.fragment(), 2)),
    ))
    .parse(input)
}

/// Decimal number with an optional exponent. An exponent without digits (e.g., in `1e`)
/// is not consumed.
fn decimal(input: InputSpan<'_>) -> NomResult<'_, f64> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(tag_char('.'), digit0)))),
        recognize(pair(tag_char('.'), digit1)),
    ));
    let exponent = recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)));
    map(
        recognize(pair(mantissa, opt(exponent))),
        |number: InputSpan<'_>| number.fragment().parse::<f64>().unwrap_or(f64::NAN),
    )
    .parse(input)
}

/// Symbolic operator. Returns the normalized operator text.
fn symbolic_op<'a>(input: InputSpan<'a>) -> NomResult<'a, &'a str> {
    let multi_char = alt((tag("<="), tag(">="), tag("=="), tag("!="), tag("||")));
    let single_char = recognize(one_of("+-*/%^?:.<>!"));
    alt((
        map(alt((multi_char, single_char)), |op: InputSpan<'a>| *op.fragment()),
        map(one_of("∙•"), |_| "*"),
    ))
    .parse(input)
}

/// String literal delimited by single or double quotes.
fn string_literal(input: InputSpan<'_>) -> NomResult<'_, String> {
    let (rest, quote) = one_of("'\"")(input)?;
    let stop_chars = if quote == '"' { "\"\\" } else { "'\\" };
    let mut body = recognize(many0_count(alt((
        is_not(stop_chars),
        recognize(pair(tag_char('\\'), anychar)),
    ))));
    let (rest, raw) = body.parse(rest)?;
    let (rest, _) = tag_char(quote)(rest).map_err(|_: NomErr<Error>| {
        NomErr::Failure(Error::new(input, ErrorKind::UnterminatedString))
    })?;
    let unescaped = unescape(raw).map_err(NomErr::Failure)?;
    Ok((rest, unescaped))
}

fn hex4(code: &str, start: usize) -> Option<u16> {
    let hex = code.get(start..start + 4)?;
    if hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

/// Resolves escape sequences in the string literal body.
fn unescape(raw: InputSpan<'_>) -> Result<String, Error> {
    let code = *raw.fragment();
    let mut unescaped = String::with_capacity(code.len());
    let mut chars = code.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        // `body` only accepts backslashes followed by a char.
        let (_, escaped) = chars.next().unwrap_or((pos, '\\'));
        let resolved = match escaped {
            '\\' | '\'' | '"' | '/' => escaped,
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let (decoded, consumed) = unescape_unicode(code, pos).ok_or_else(|| {
                    let hex: String = code[pos + 2..].chars().take(4).collect();
                    let len = 2 + hex.len();
                    Error::at(raw.slice(pos..), len, ErrorKind::InvalidUnicodeEscape(hex))
                })?;
                unescaped.push_str(&decoded);
                // Escapes consist of ASCII chars only, so bytes and chars coincide.
                for _ in 2..consumed {
                    chars.next();
                }
                continue;
            }
            other => {
                let len = 1 + other.len_utf8();
                return Err(Error::at(raw.slice(pos..), len, ErrorKind::InvalidEscape(other)));
            }
        };
        unescaped.push(resolved);
    }
    Ok(unescaped)
}

/// Decodes a `\uXXXX` escape starting at `pos`, combining surrogate pairs. Unpaired surrogates
/// are replaced with U+FFFD. Returns the decoded string and the number of consumed bytes.
fn unescape_unicode(code: &str, pos: usize) -> Option<(String, usize)> {
    let high = hex4(code, pos + 2)?;
    let mut units = [high, 0];
    let mut len = 1;
    if (0xd800..0xdc00).contains(&high) && code.get(pos + 6..pos + 8) == Some("\\u") {
        if let Some(low) = hex4(code, pos + 8) {
            units[1] = low;
            len = 2;
        }
    }
    let decoded = char::decode_utf16(units[..len].iter().copied())
        .map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    Some((decoded, 6 * len))
}

/// Letter followed by letters, ASCII digits or underscores; with `allow_dots`, dots
/// are accepted after the first char as well.
fn identifier_run<'a>(
    allow_dots: bool,
) -> impl FnMut(InputSpan<'a>) -> NomResult<'a, InputSpan<'a>> {
    recognize(pair(
        satisfy(char::is_alphabetic),
        take_while(move |c: char| {
            c.is_alphabetic() || c.is_ascii_digit() || c == '_' || (allow_dots && c == '.')
        }),
    ))
}

/// Generic name. May start with a single `$` or `_`, which must be followed by a letter.
fn name(input: InputSpan<'_>) -> NomResult<'_, InputSpan<'_>> {
    recognize(pair(opt(one_of("$_")), identifier_run(false))).parse(input)
}

fn reject<T>(input: InputSpan<'_>) -> NomResult<'_, T> {
    Err(NomErr::Error(Error::from_error_kind(input, NomErrorKind::Verify)))
}

/// Checks whether the provided string is a valid variable name.
pub fn is_valid_variable_name(name_str: &str) -> bool {
    matches!(
        name(InputSpan::new(name_str)),
        Ok((rest, _)) if rest.fragment().is_empty()
    )
}

/// Lexer state saved by [`Lexer::checkpoint()`]. Restoring the checkpoint
/// makes the lexer produce the same tokens again.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint<'a> {
    input: InputSpan<'a>,
}

/// Pull-based lexer producing [`Token`]s one at a time.
///
/// The lexer consults a [`Grammar`] to recognize named operators and constants,
/// and [`ParseOptions`] to filter out disabled operators. Disabled symbolic operators
/// lead to a lexing error, while disabled named operators are treated as ordinary names.
///
/// # Examples
///
/// ```
/// # use formula_parser::{grammars::{ParseOptions, Standard}, Lexer, TokenKind};
/// let options = ParseOptions::default();
/// let lexer = Lexer::new("sin(x) <= 0x10", &Standard, &options);
/// let tokens: Vec<_> = lexer.map(|token| token.unwrap().extra).collect();
/// assert_eq!(
///     tokens,
///     [
///         TokenKind::Operator("sin"),
///         TokenKind::LeftParen,
///         TokenKind::Name("x"),
///         TokenKind::RightParen,
///         TokenKind::Operator("<="),
///         TokenKind::Number(16.0),
///     ]
/// );
/// ```
pub struct Lexer<'a, 'g> {
    input: InputSpan<'a>,
    grammar: &'g dyn Grammar,
    options: &'g ParseOptions,
}

impl fmt::Debug for Lexer<'_, '_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Lexer")
            .field("input", &self.input)
            .field("options", self.options)
            .finish_non_exhaustive()
    }
}

impl<'a, 'g> Lexer<'a, 'g> {
    /// Creates a lexer for the specified code.
    pub fn new(code: &'a str, grammar: &'g dyn Grammar, options: &'g ParseOptions) -> Self {
        Self {
            input: InputSpan::new(code),
            grammar,
            options,
        }
    }

    /// Saves the current lexer state.
    pub fn checkpoint(&self) -> Checkpoint<'a> {
        Checkpoint { input: self.input }
    }

    /// Restores the state previously saved with [`Self::checkpoint()`].
    pub fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        self.input = checkpoint.input;
    }

    /// Produces the next token. Once the input is exhausted, this method keeps returning
    /// [`TokenKind::Eof`] tokens.
    pub fn next_token(&mut self) -> Result<Token<'a>, Error> {
        let (input, _) = ws(self.input).map_err(Self::unwrap_nom_error)?;
        self.input = input;
        if input.fragment().is_empty() {
            return Ok(Spanned::new(input, TokenKind::Eof));
        }

        match self.token_kind(input) {
            Ok((rest, token)) => {
                self.input = rest;
                Ok(token)
            }
            Err(NomErr::Error(_)) => {
                let unknown = input.fragment().chars().next().unwrap_or('\0');
                let err = Error::at(input, unknown.len_utf8(), ErrorKind::UnknownChar(unknown));
                Err(err)
            }
            Err(err) => Err(Self::unwrap_nom_error(err)),
        }
    }

    fn unwrap_nom_error(err: NomErr<Error>) -> Error {
        match err {
            NomErr::Error(err) | NomErr::Failure(err) => err,
            NomErr::Incomplete(_) => unreachable!("complete parsers never return `Incomplete`"),
        }
    }

    fn token_kind(&self, input: InputSpan<'a>) -> NomResult<'a, Token<'a>> {
        let grammar = self.grammar;
        let options = self.options;

        let enabled_op = move |input: InputSpan<'a>| -> NomResult<'a, TokenKind<'a>> {
            let (rest, op) = symbolic_op(input)?;
            if options.is_operator_enabled(op) {
                Ok((rest, TokenKind::Operator(op)))
            } else {
                reject(input)
            }
        };
        let named_op = move |input: InputSpan<'a>| -> NomResult<'a, TokenKind<'a>> {
            let (rest, run) = identifier_run(false)(input)?;
            let op = *run.fragment();
            if grammar.is_op(op) && options.is_operator_enabled(op) {
                Ok((rest, TokenKind::Operator(op)))
            } else {
                reject(input)
            }
        };
        let constant = move |input: InputSpan<'a>| -> NomResult<'a, TokenKind<'a>> {
            let (rest, run) = identifier_run(true)(input)?;
            match grammar.constant(run.fragment()) {
                Some(literal) => Ok((rest, literal.into())),
                None => reject(input),
            }
        };

        let token = alt((
            map(radix_integer, TokenKind::Number),
            map(decimal, TokenKind::Number),
            enabled_op,
            map(string_literal, TokenKind::Str),
            value(TokenKind::LeftParen, tag_char('(')),
            value(TokenKind::RightParen, tag_char(')')),
            value(TokenKind::Comma, tag_char(',')),
            named_op,
            constant,
            map(name, |name: InputSpan<'a>| TokenKind::Name(*name.fragment())),
        ));
        with_span(token)(input)
    }
}

impl<'a> Iterator for Lexer<'a, '_> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.extra == TokenKind::Eof => None,
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                // Stop iteration after the first error.
                self.input = self.input.slice(self.input.fragment().len()..);
                Some(Err(err))
            }
        }
    }
}
