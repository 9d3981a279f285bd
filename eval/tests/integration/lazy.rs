//! Tests for short-circuit evaluation.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use super::*;

fn env_with_crash() -> Environment {
    let mut env = Environment::standard();
    env.insert_fn(
        "crash",
        Function::new(Arity::any(), |_| Err(EvalError::native("crash() was called"))),
    );
    env
}

#[test]
fn conditional_evaluates_single_branch() {
    let env = env_with_crash();
    let vars = Bindings::new();
    assert_eq!(env.evaluate("1 == 1 ? 10 : crash()", &vars).unwrap(), Value::Number(10.0));
    assert_eq!(env.evaluate("1 == 2 ? crash() : 20", &vars).unwrap(), Value::Number(20.0));

    let err = env.evaluate("1 == 2 ? 10 : crash()", &vars).unwrap_err();
    assert_matches!(
        err,
        ExpressionError::Eval(EvalError::NativeCall(msg)) if msg.contains("crash()")
    );
}

#[test]
fn nested_conditionals() {
    let env = env_with_crash();
    let code = "x < 0 ? 'negative' : x == 0 ? 'zero' : x > 100 ? crash() : 'positive'";
    let expr = Expression::parse(code, &env).unwrap();
    for (x, expected) in [(-1.0, "negative"), (0.0, "zero"), (5.0, "positive")] {
        let value = expr.evaluate(&Bindings::new().with("x", x)).unwrap();
        assert_eq!(value, Value::from(expected));
    }
    assert!(expr.evaluate(&Bindings::new().with("x", 500.0)).is_err());
}

#[test]
fn logical_operators_short_circuit() {
    let env = env_with_crash();
    let vars = Bindings::new();
    assert_eq!(env.evaluate("false and crash()", &vars).unwrap(), Value::from(false));
    assert_eq!(env.evaluate("true or crash()", &vars).unwrap(), Value::from(true));
    assert_eq!(env.evaluate("'' or 0 and crash()", &vars).unwrap(), Value::from(false));
    assert!(env.evaluate("crash() and false", &vars).is_err());
    assert!(env.evaluate("true and crash()", &vars).is_err());
}

#[test]
fn logical_operators_produce_numbers() {
    let env = Environment::standard();
    let vars = Bindings::new();
    assert_eq!(env.evaluate("'str' and 5", &vars).unwrap(), Value::Number(1.0));
    assert_eq!(env.evaluate("0 or ''", &vars).unwrap(), Value::Number(0.0));
    assert_eq!(env.evaluate("not 'str'", &vars).unwrap(), Value::Number(0.0));
}

#[test]
fn eager_if_function_evaluates_all_args() {
    let env = env_with_crash();
    let err = env.evaluate("if(1, 10, crash())", &Bindings::new()).unwrap_err();
    assert_matches!(err, ExpressionError::Eval(EvalError::NativeCall(_)));
}

#[test]
fn lazy_branches_are_evaluated_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_ = Arc::clone(&counter);
    let mut env = Environment::standard();
    env.insert_fn(
        "tick",
        Function::new(Arity::exact(0), move |_| {
            let count = counter_.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Value::Number(count as f64))
        }),
    );

    let expr = Expression::parse("x ? tick() + tick() : tick()", &env).unwrap();
    let value = expr.evaluate(&Bindings::new().with("x", 1.0)).unwrap();
    assert_eq!(value, Value::Number(3.0));
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    let value = expr.evaluate(&Bindings::new().with("x", 0.0)).unwrap();
    assert_eq!(value, Value::Number(3.0));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}
