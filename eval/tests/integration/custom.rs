//! Tests for custom environments.

use formula_parser::{Instruction, Literal, ParseOptions};

use super::*;

fn custom_env() -> Environment {
    let mut env = Environment::new();
    env.insert_binary_op(
        "+",
        Function::binary(|x, y| Ok(Value::Number(x.to_number() + y.to_number()))),
    )
    .insert_binary_op(
        "*",
        Function::binary(|x, y| Ok(Value::Number(x.to_number() * y.to_number()))),
    )
    .insert_unary_op(
        "double",
        Function::unary(|x| Ok(Value::Number(x.to_number() * 2.0))),
    )
    .insert_fn(
        "sum",
        Function::new(Arity::at_least(1), |args| {
            Ok(Value::Number(args.iter().map(Value::to_number).sum()))
        }),
    )
    .insert_constant("TAU", std::f64::consts::TAU)
    .insert_constant("GREETING", "hello");
    env
}

#[test]
fn custom_operators_and_functions() {
    let env = custom_env();
    let vars = Bindings::new().with("x", 3.0);
    assert_eq!(env.evaluate("double x + 1", &vars).unwrap(), Value::Number(7.0));
    assert_eq!(env.evaluate("double(x) * 2", &vars).unwrap(), Value::Number(12.0));
    assert_eq!(env.evaluate("sum(1, x, 2 * x)", &vars).unwrap(), Value::Number(10.0));
    assert_eq!(env.evaluate("GREETING", &vars).unwrap(), Value::from("hello"));

    let err = env.evaluate("sum()", &vars).unwrap_err();
    assert_matches!(
        err,
        ExpressionError::Eval(EvalError::ArgsLenMismatch { actual: 0, .. })
    );
    // Operators missing from the environment.
    let err = env.evaluate("x - 1", &vars).unwrap_err();
    assert_matches!(
        err,
        ExpressionError::Eval(EvalError::UnknownOp { kind: OpKind::Binary, .. })
    );
}

#[test]
fn constants_are_inlined_when_parsing() {
    let env = custom_env();
    let expr = Expression::parse("TAU * r", &env).unwrap();
    let tau = Instruction::from(Literal::Number(std::f64::consts::TAU));
    assert_eq!(expr.stream()[0], tau);
    assert_eq!(expr.variables(Default::default()), ["r"]);
}

#[test]
fn functions_as_values() {
    let mut env = custom_env();
    env.insert_fn(
        "apply",
        Function::binary(|f, x| match f {
            Value::Function(f) => f.call(vec![x]),
            _ => Err(EvalError::native("expected function")),
        }),
    );
    let value = env.evaluate("apply(sum, 21) * 2", &Bindings::new()).unwrap();
    assert_eq!(value, Value::Number(42.0));
    let err = env.evaluate("apply(1, 21)", &Bindings::new()).unwrap_err();
    assert_matches!(err, ExpressionError::Eval(EvalError::NativeCall(_)));
}

#[test]
fn membership_operator() {
    let env = Environment::standard()
        .with_options(ParseOptions::default().with_operator("in", true));
    let record = Value::record([("a", 1.0), ("b", 2.0)]);
    let vars = Bindings::new().with("rec", record).with("s", "haystack");

    assert_eq!(env.evaluate("2 in rec", &vars).unwrap(), Value::from(true));
    assert_eq!(env.evaluate("3 in rec", &vars).unwrap(), Value::from(false));
    assert_eq!(env.evaluate("'hay' in s", &vars).unwrap(), Value::from(true));
    assert_eq!(env.evaluate("'needle' in s", &vars).unwrap(), Value::from(false));
}

#[test]
fn native_errors_are_propagated() {
    let mut env = Environment::standard();
    env.insert_fn(
        "checked_sqrt",
        Function::unary(|x| {
            let x = x.to_number();
            if x < 0.0 {
                Err(EvalError::native(format!("negative argument: {x}")))
            } else {
                Ok(Value::Number(x.sqrt()))
            }
        }),
    );
    let expr = Expression::parse("checked_sqrt(x) + 1", &env).unwrap();
    assert_eq!(
        expr.evaluate(&Bindings::new().with("x", 9.0)).unwrap(),
        Value::Number(4.0)
    );
    let err = expr.evaluate(&Bindings::new().with("x", -4.0)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed executing native function: negative argument: -4"
    );
}
