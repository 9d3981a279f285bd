//! Tests for the lexer.

use assert_matches::assert_matches;
use nom::Slice;

use super::*;
use crate::{alloc::Vec, grammars::Standard};

fn tokenize(code: &str) -> Result<Vec<TokenKind<'_>>, Error> {
    tokenize_with_options(code, &ParseOptions::default())
}

fn tokenize_with_options<'a>(
    code: &'a str,
    options: &ParseOptions,
) -> Result<Vec<TokenKind<'a>>, Error> {
    let mut lexer = Lexer::new(code, &Standard, options);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if token.extra == TokenKind::Eof {
            break;
        }
        tokens.push(token.extra);
    }
    Ok(tokens)
}

fn lex_error(code: &str) -> Error {
    tokenize(code).unwrap_err()
}

#[test]
fn whitespace_can_include_comments() {
    let input = InputSpan::new("x");
    assert_eq!(ws(input).unwrap().0, input);

    let input = InputSpan::new(" \t\r\nx");
    assert_eq!(ws(input).unwrap().0, input.slice(4..));

    let input = InputSpan::new("/* comment */ x");
    assert_eq!(ws(input).unwrap().0, input.slice(14..));

    let input = InputSpan::new("  /* unterminated");
    assert!(ws(input).unwrap().0.fragment().is_empty());
}

#[test]
fn is_valid_variable_name_works() {
    for valid_name in ["a", "abc", "abc_", "camelCase", "_dash", "$x", "a12", "é"] {
        assert!(
            is_valid_variable_name(valid_name),
            "failed at valid name: {valid_name}"
        );
    }
    for invalid_name in ["", "1abc", "_", "$", "_1", "$_a", "__a", "xy+", "a-b"] {
        assert!(
            !is_valid_variable_name(invalid_name),
            "failed at invalid name: {invalid_name}"
        );
    }
}

#[test]
fn radix_integers() {
    assert_eq!(tokenize("0x1F").unwrap(), [TokenKind::Number(31.0)]);
    assert_eq!(tokenize("0xff").unwrap(), [TokenKind::Number(255.0)]);
    assert_eq!(tokenize("0b101").unwrap(), [TokenKind::Number(5.0)]);
    // `0b2` is not a binary literal.
    assert_eq!(
        tokenize("0b2").unwrap(),
        [TokenKind::Number(0.0), TokenKind::Name("b2")]
    );
}

#[test]
fn decimal_numbers() {
    let cases = [
        ("1", 1.0),
        ("12.5", 12.5),
        (".5", 0.5),
        ("3.", 3.0),
        ("1e3", 1_000.0),
        ("2.5E-2", 0.025),
        ("1e+2", 100.0),
    ];
    for (code, expected) in cases {
        assert_eq!(tokenize(code).unwrap(), [TokenKind::Number(expected)], "{code}");
    }
}

#[test]
fn invalid_exponent_is_not_consumed() {
    assert_eq!(
        tokenize("1e").unwrap(),
        [TokenKind::Number(1.0), TokenKind::Name("e")]
    );
    assert_eq!(
        tokenize("2e+x").unwrap(),
        [
            TokenKind::Number(2.0),
            TokenKind::Name("e"),
            TokenKind::Operator("+"),
            TokenKind::Name("x"),
        ]
    );
}

#[test]
fn bare_dot_is_an_operator() {
    assert_eq!(
        tokenize("a.b").unwrap(),
        [
            TokenKind::Name("a"),
            TokenKind::Operator("."),
            TokenKind::Name("b"),
        ]
    );
}

#[test]
fn operators() {
    let tokens = tokenize("a <= b >= c == d != e || f < g > h ! ? : % ^").unwrap();
    let ops: Vec<_> = tokens
        .iter()
        .filter_map(|token| match token {
            TokenKind::Operator(op) => Some(*op),
            _ => None,
        })
        .collect();
    assert_eq!(
        ops,
        ["<=", ">=", "==", "!=", "||", "<", ">", "!", "?", ":", "%", "^"]
    );
}

#[test]
fn multiplication_glyphs_are_normalized() {
    let tokens = tokenize("2 ∙ 3 • 4").unwrap();
    assert_eq!(tokens[1], TokenKind::Operator("*"));
    assert_eq!(tokens[3], TokenKind::Operator("*"));

    let options = ParseOptions::default();
    let mut lexer = Lexer::new("2∙3", &Standard, &options);
    lexer.next_token().unwrap();
    let op = lexer.next_token().unwrap();
    assert_eq!(op.fragment(), "∙");
    assert_eq!(op.extra, TokenKind::Operator("*"));
}

#[test]
fn incomplete_operators_are_errors() {
    let err = lex_error("a = b");
    assert_eq!(*err.kind(), ErrorKind::UnknownChar('='));
    assert_eq!(err.offset(), 2);

    let err = lex_error("a | b");
    assert_eq!(*err.kind(), ErrorKind::UnknownChar('|'));
}

#[test]
fn named_operators_and_constants() {
    assert_eq!(
        tokenize("not x and sinx or sin(PI)").unwrap(),
        [
            TokenKind::Operator("not"),
            TokenKind::Name("x"),
            TokenKind::Operator("and"),
            TokenKind::Name("sinx"),
            TokenKind::Operator("or"),
            TokenKind::Operator("sin"),
            TokenKind::LeftParen,
            TokenKind::Number(core::f64::consts::PI),
            TokenKind::RightParen,
        ]
    );
    assert_eq!(tokenize("true").unwrap(), [TokenKind::Number(1.0)]);
}

#[test]
fn in_operator_is_opt_in() {
    assert_eq!(
        tokenize("a in b").unwrap(),
        [TokenKind::Name("a"), TokenKind::Name("in"), TokenKind::Name("b")]
    );

    let options = ParseOptions::default().with_operator("in", true);
    assert_eq!(
        tokenize_with_options("a in b", &options).unwrap(),
        [
            TokenKind::Name("a"),
            TokenKind::Operator("in"),
            TokenKind::Name("b"),
        ]
    );
}

#[test]
fn disabled_operators() {
    let mut options = ParseOptions::default();
    options
        .set_operator("add", false)
        .set_operator("sqrt", false)
        .set_operator("comparison", false);

    let err = tokenize_with_options("1 + 2", &options).unwrap_err();
    assert_eq!(*err.kind(), ErrorKind::UnknownChar('+'));
    assert_eq!(err.offset(), 2);
    assert!(err.is_lex_error());

    let err = tokenize_with_options("1 <= 2", &options).unwrap_err();
    assert_eq!(*err.kind(), ErrorKind::UnknownChar('<'));

    assert_eq!(
        tokenize_with_options("sqrt x", &options).unwrap(),
        [TokenKind::Name("sqrt"), TokenKind::Name("x")]
    );
}

#[test]
fn string_literals() {
    assert_eq!(
        tokenize(r#""abc" 'd"e'"#).unwrap(),
        [TokenKind::Str("abc".into()), TokenKind::Str("d\"e".into())]
    );
    assert_eq!(
        tokenize(r#""a\"b\\c\/\n\té""#).unwrap(),
        [TokenKind::Str("a\"b\\c/\n\té".into())]
    );
    assert_eq!(
        tokenize(r#"'😀'"#).unwrap(),
        [TokenKind::Str("\u{1f600}".into())]
    );
    assert_eq!(
        tokenize(r#""\uD83D\uDE00 \u0041""#).unwrap(),
        [TokenKind::Str("\u{1f600} A".into())]
    );
    assert_eq!(tokenize("''").unwrap(), [TokenKind::Str(String::new())]);
}

#[test]
fn unpaired_surrogates_are_replaced() {
    assert_eq!(
        tokenize(r#""\uD800""#).unwrap(),
        [TokenKind::Str("\u{fffd}".into())]
    );
    assert_eq!(
        tokenize(r#"'\uDE00x'"#).unwrap(),
        [TokenKind::Str("\u{fffd}x".into())]
    );
    assert_eq!(
        tokenize(r#""\uD83D\u0041""#).unwrap(),
        [TokenKind::Str("\u{fffd}A".into())]
    );
}

#[test]
fn string_literal_errors() {
    let err = lex_error(r#"1 + "abc"#);
    assert_eq!(*err.kind(), ErrorKind::UnterminatedString);
    assert_eq!(err.offset(), 4);

    let err = lex_error(r#""abc\""#);
    assert_eq!(*err.kind(), ErrorKind::UnterminatedString);

    let err = lex_error(r#""ab\qc""#);
    assert_eq!(*err.kind(), ErrorKind::InvalidEscape('q'));
    assert_eq!(err.range(), 3..5);

    let err = lex_error(r#""\u12g4""#);
    assert_matches!(err.kind(), ErrorKind::InvalidUnicodeEscape(code) if code == "12g4");
    assert_eq!(err.offset(), 1);

    let err = lex_error(r#""\u12""#);
    assert_matches!(err.kind(), ErrorKind::InvalidUnicodeEscape(code) if code == "12");
}

#[test]
fn unknown_chars() {
    let err = lex_error("2 # 3");
    assert_eq!(*err.kind(), ErrorKind::UnknownChar('#'));
    assert_eq!((err.location().line(), err.location().column()), (1, 3));

    let err = lex_error("x +\n $1");
    assert_eq!(*err.kind(), ErrorKind::UnknownChar('$'));
    assert_eq!((err.location().line(), err.location().column()), (2, 2));
}

#[test]
fn token_spans() {
    let options = ParseOptions::default();
    let mut lexer = Lexer::new("foo(1.5, 'x')", &Standard, &options);
    let tokens: Vec<_> = lexer.by_ref().map(Result::unwrap).collect();
    let fragments: Vec<_> = tokens.iter().map(Spanned::fragment).collect();
    assert_eq!(fragments, ["foo", "(", "1.5", ",", "'x'", ")"]);
    assert_eq!(tokens[4].location_offset(), 9);
    assert_matches!(lexer.next_token().unwrap().extra, TokenKind::Eof);
}

#[test]
fn checkpoints() {
    let options = ParseOptions::default();
    let mut lexer = Lexer::new("sin (x)", &Standard, &options);
    assert_eq!(lexer.next_token().unwrap().extra, TokenKind::Operator("sin"));
    let checkpoint = lexer.checkpoint();
    assert_eq!(lexer.next_token().unwrap().extra, TokenKind::LeftParen);
    assert_eq!(lexer.next_token().unwrap().extra, TokenKind::Name("x"));
    lexer.restore(checkpoint);
    assert_eq!(lexer.next_token().unwrap().extra, TokenKind::LeftParen);
}

#[test]
fn iteration_stops_after_error() {
    let options = ParseOptions::default();
    let lexer = Lexer::new("1 @ 2", &Standard, &options);
    let tokens: Vec<_> = lexer.collect();
    assert_eq!(tokens.len(), 2);
    assert_matches!(tokens[1], Err(ref err) if err.offset() == 2);
}
