//! Tests for expression transformations: simplification, substitution, rendering and compilation.

use formula_parser::{ParseOptions, SymbolOptions};

use super::*;

#[test]
fn simplifying_expressions() {
    let env = Environment::standard();
    let no_vars = Bindings::new();

    let expr = Expression::parse("x + 2 * 3", &env).unwrap();
    assert_eq!(expr.simplify(&no_vars).to_string(), "x + 6");
    let expr = Expression::parse("2 * 3", &env).unwrap();
    assert_eq!(expr.simplify(&no_vars).to_string(), "6");

    let expr = Expression::parse("x * (y + z) / 2", &env).unwrap();
    let known = Bindings::new().with("y", 1.0).with("z", 3.0);
    let simplified = expr.simplify(&known);
    assert_eq!(simplified.to_string(), "x * 4 / 2");
    let vars = Bindings::new().with("x", 5.0);
    assert_eq!(simplified.evaluate(&vars).unwrap(), Value::Number(10.0));
}

#[test]
fn simplifying_preserves_semantics() {
    let env = Environment::standard();
    let samples = [
        "x * 2 + y ^ 2 - 1",
        "x > y ? x - y : y - x",
        "x and y or not x",
        "'x = ' || x || ', y = ' || y",
        "max(x, 2 * y) + sqrt(abs(x))",
    ];
    let known = Bindings::new().with("y", 3.0);
    let all = Bindings::new().with("x", -2.0).with("y", 3.0);

    for code in samples {
        let expr = Expression::parse(code, &env).unwrap();
        let expected = expr.evaluate(&all).unwrap();
        let simplified = expr.simplify(&known);
        assert_eq!(simplified.evaluate(&all).unwrap(), expected, "{code} -> {simplified}");
        assert!(
            simplified.variables(SymbolOptions::default()) == ["x"],
            "{code} -> {simplified}"
        );
    }
}

#[test]
fn substituting_expressions() {
    let env = Environment::standard();
    let expr = Expression::parse("x * 2 + 1", &env).unwrap();
    let replacement = Expression::parse("y + 2", &env).unwrap();
    let substituted = expr.substitute("x", &replacement);
    assert_eq!(substituted.to_string(), "(y + 2) * 2 + 1");

    let value = substituted.evaluate(&Bindings::new().with("y", 3.0)).unwrap();
    assert_eq!(value, Value::Number(11.0));
    // The original expression is not changed.
    assert_eq!(expr.to_string(), "x * 2 + 1");
}

#[test]
fn substituting_into_branches_and_members() {
    let env = Environment::standard();
    let expr = Expression::parse("x.a > 0 ? f(x) : x.b", &env).unwrap();
    let substituted = expr.substitute_str("x", "data.inner").unwrap();
    assert_eq!(
        substituted.to_string(),
        "data.inner.a > 0 ? f(data.inner) : data.inner.b"
    );
    assert_eq!(
        substituted.variables(SymbolOptions::default()),
        ["data", "f"]
    );
}

#[test]
fn collecting_variables() {
    let env = Environment::standard();
    let expr = Expression::parse("x * max(y, z.w) + sin(x) + PI", &env).unwrap();
    assert_eq!(expr.symbols(SymbolOptions::default()), ["x", "max", "y", "z"]);
    assert_eq!(expr.variables(SymbolOptions::default()), ["x", "y", "z"]);
    assert_eq!(
        expr.variables(SymbolOptions::default().with_members(true)),
        ["x", "y", "z.w"]
    );
}

#[test]
fn rendered_expressions_are_reparsed_identically() {
    let env = Environment::standard();
    let samples = [
        "2 + 3 * 4",
        "-(x + 1) ^ 2 / y!",
        "a ? b ? 1 : 2 : c or d and not e",
        "max(1, x, -y)(z)",
        "p.x * p.y == 'str\\n' || \"q\"",
        "sin x ^ 2 + cos(x) ^ 2",
        "f(0.5, 1e-7, 123456789)",
    ];
    for code in samples {
        let expr = Expression::parse(code, &env).unwrap();
        let rendered = expr.render();
        let reparsed = Expression::parse(&rendered, &env).unwrap();
        assert_eq!(reparsed, expr, "{code} -> {rendered}");
    }
}

#[test]
fn compiled_functions() {
    let env = Environment::standard();
    let expr = Expression::parse("a * x ^ 2 + b * x + c", &env).unwrap();
    let bindings = Bindings::new().with("a", 1.0).with("b", -3.0);
    let function = expr.compile(&["x", "c"], &bindings).unwrap();
    assert_eq!(function.code(), "1 * x ^ 2 + -3 * x + c");

    let value = function.call(&[Value::Number(2.0), Value::Number(2.0)]).unwrap();
    assert_eq!(value, Value::Number(0.0));
    let err = function.call(&[]).unwrap_err();
    assert_matches!(err, EvalError::ArgsLenMismatch { actual: 0, .. });
}

#[test]
fn compiled_functions_keep_parsing_options() {
    let env = Environment::standard();
    let options = ParseOptions::default()
        .with_operator("in", true)
        .with_operator("subtract", false);
    let code = "needle in haystack ? x * k : 0";
    let expr = Expression::parse_with_options(code, &env, &options).unwrap();

    let haystack = Value::record([("a", 1.0), ("b", 2.0)]);
    let bindings = Bindings::new().with("haystack", haystack).with("k", -2.0);
    let function = expr.compile(&["needle", "x"], &bindings).unwrap();
    // `-2` cannot be rendered without `-`, and records have no literal form.
    assert_eq!(function.code(), code);

    let value = function.call(&[Value::Number(2.0), Value::Number(5.0)]).unwrap();
    assert_eq!(value, Value::Number(-10.0));
    let value = function.call(&[Value::Number(3.0), Value::Number(5.0)]).unwrap();
    assert_eq!(value, Value::Number(0.0));

    let vars = Bindings::new()
        .with("needle", 1.0)
        .with("x", 4.0)
        .with("haystack", Value::record([("a", 1.0)]))
        .with("k", -2.0);
    let expected = expr.evaluate(&vars).unwrap();
    let value = function.call(&[Value::Number(1.0), Value::Number(4.0)]).unwrap();
    assert_eq!(value, expected);
}
