//! Integration tests for the `formula-eval` crate.

use assert_matches::assert_matches;

use formula_eval::{
    error::OpKind, Arity, Bindings, Environment, EvalError, Expression, ExpressionError, Function,
    Value,
};
use formula_parser::ErrorKind;

mod custom;
mod lazy;
mod transform;

fn evaluate(code: &str) -> Value {
    try_evaluate(code, &Bindings::new()).unwrap()
}

fn try_evaluate(code: &str, vars: &Bindings) -> Result<Value, ExpressionError> {
    Environment::standard().evaluate(code, vars)
}

fn expect_eval_error(code: &str, vars: &Bindings) -> EvalError {
    match try_evaluate(code, vars) {
        Err(ExpressionError::Eval(err)) => err,
        other => panic!("Unexpected result of evaluating `{code}`: {other:?}"),
    }
}

#[test]
fn operator_priorities() {
    assert_eq!(evaluate("2 + 3 * 4"), Value::Number(14.0));
    assert_eq!(evaluate("(2 + 3) * 4"), Value::Number(20.0));
    assert_eq!(evaluate("2 ^ 3 ^ 2"), Value::Number(512.0));
    assert_eq!(evaluate("-2 ^ 2"), Value::Number(-4.0));
    assert_eq!(evaluate("10 - 4 - 3"), Value::Number(3.0));
    assert_eq!(evaluate("2 * 3!"), Value::Number(12.0));
    assert_eq!(evaluate("1 + 2 > 2 and 3 < 2 or 4 == 4"), Value::Number(1.0));
}

#[test]
fn numeric_edge_cases() {
    assert_eq!(evaluate("1 / 0"), Value::Number(f64::INFINITY));
    assert_eq!(evaluate("-1 / 0").to_string(), "-Infinity");
    assert!(evaluate("0 / 0").to_number().is_nan());
    assert_eq!(evaluate("7 % 4"), Value::Number(3.0));
    assert_eq!(evaluate("0x1F + 0b11"), Value::Number(34.0));
    assert_eq!(evaluate("2.5e-1 * 4"), Value::Number(1.0));
}

#[test]
fn standard_functions() {
    assert_eq!(evaluate("max(1, 5, 3) - min(4, 2)"), Value::Number(3.0));
    assert_eq!(evaluate("hypot(3, 4)"), Value::Number(5.0));
    assert_eq!(evaluate("pyt(6, 8)"), Value::Number(10.0));
    assert_eq!(evaluate("pow(2, 10)"), Value::Number(1024.0));
    assert_eq!(evaluate("5!"), Value::Number(120.0));
    assert_eq!(evaluate("fac(4)"), Value::Number(24.0));
    assert_eq!(evaluate("roundTo(3.14159, 2)"), Value::Number(3.14));
    assert_eq!(evaluate("abs -3 + floor 2.7"), Value::Number(5.0));
    assert_eq!(evaluate("sqrt(16) + lg 100"), Value::Number(6.0));
    assert_eq!(evaluate("if(0, 1, 2)"), Value::Number(2.0));

    let value = evaluate("random(10)").to_number();
    assert!((0.0..10.0).contains(&value), "{value}");
}

#[test]
fn strings_and_comparisons() {
    assert_eq!(evaluate("'ab' || (1 + 2)"), Value::from("ab3"));
    assert_eq!(evaluate("length('héllo')"), Value::Number(5.0));
    assert_eq!(evaluate("'a' < 'b'"), Value::from(true));
    assert_eq!(evaluate("'1' == 1"), Value::from(false));
    assert_eq!(evaluate("'2' + 3"), Value::Number(5.0));
    assert_eq!(evaluate(r#""quote: \"" || 'aé'"#), Value::from("quote: \"aé"));
}

#[test]
fn constants_and_variables() {
    let vars = Bindings::new().with("x", 2.0).with("PI", 3.0);
    let value = try_evaluate("PI * x + E", &vars).unwrap();
    let expected = std::f64::consts::PI * 2.0 + std::f64::consts::E;
    assert_eq!(value, Value::Number(expected));
    assert_eq!(evaluate("true + true"), Value::Number(2.0));
}

#[test]
fn member_access() {
    let point = Value::record([("x", Value::Number(3.0)), ("name", Value::from("p"))]);
    let vars = Bindings::new().with("pt", point).with("n", 1.0);
    assert_eq!(try_evaluate("pt.x * 2", &vars).unwrap(), Value::Number(6.0));
    assert_eq!(try_evaluate("pt.name", &vars).unwrap(), Value::from("p"));
    assert_eq!(try_evaluate("pt.missing", &vars).unwrap(), Value::Void);
    assert_eq!(try_evaluate("n.x", &vars).unwrap(), Value::Void);
}

#[test]
fn undefined_variable_error() {
    let err = expect_eval_error("unknownVar + 1", &Bindings::new());
    assert_matches!(err, EvalError::Undefined(name) if name == "unknownVar");
    assert_eq!(err_message("unknownVar"), "Variable `unknownVar` is not defined");
}

fn err_message(code: &str) -> String {
    expect_eval_error(code, &Bindings::new()).to_string()
}

#[test]
fn call_errors() {
    let err = expect_eval_error("1(2)", &Bindings::new());
    assert_eq!(err, EvalError::CannotCall);

    let err = expect_eval_error("roundTo(1, 2, 3)", &Bindings::new());
    assert_matches!(
        err,
        EvalError::ArgsLenMismatch { expected, actual: 3 } if expected == Arity::range(1, 2)
    );
}

#[test]
fn syntax_error_location() {
    let err = try_evaluate("2+", &Bindings::new()).unwrap_err();
    let ExpressionError::Parse(err) = err else {
        panic!("Unexpected error: {err:?}");
    };
    assert_eq!(*err.kind(), ErrorKind::UnexpectedEnd);
    assert_eq!(err.offset(), 2);
}

#[test]
fn disabled_operators() {
    let mut env = Environment::standard();
    env.set_operator("sin", false).set_operator("power", false);

    assert!(env.evaluate("2 ^ 3", &Bindings::new()).is_err());
    // `sin` is now an ordinary name.
    let err = env.evaluate("sin(0)", &Bindings::new()).unwrap_err();
    assert_matches!(err, ExpressionError::Eval(EvalError::Undefined(name)) if name == "sin");
    let sin = Function::unary(|x| Ok(Value::Number(x.to_number().sin() * 2.0)));
    let vars = Bindings::new().with("sin", sin);
    assert_eq!(env.evaluate("sin(0)", &vars).unwrap(), Value::Number(0.0));
}

#[test]
fn unknown_operator_error() {
    let env = Environment::new();
    let expr = Expression::parse("1 + 2", &env).unwrap();
    let err = expr.evaluate(&Bindings::new()).unwrap_err();
    assert_eq!(
        err,
        EvalError::UnknownOp {
            kind: OpKind::Binary,
            name: "+".to_owned(),
        }
    );
}
