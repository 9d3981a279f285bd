//! Standard operators, functions and constants.
//!
//! The contents of the standard library are exposed via [`Prelude`]; [`Environment::standard()`]
//! is the easiest way to use it.
//!
//! [`Environment::standard()`]: crate::Environment::standard()

use core::{
    cmp::Ordering,
    f64::consts::{E, PI},
};

use formula_parser::Literal;

use crate::{Arity, Function, Value};

pub mod math;
mod ops;

fn numeric_unary(function: fn(f64) -> f64) -> Function {
    Function::unary(move |x| Ok(Value::Number(function(x.to_number()))))
}

fn numeric_binary(function: fn(f64, f64) -> f64) -> Function {
    Function::binary(move |x, y| Ok(ops::numeric(&x, &y, function)))
}

fn value_binary(function: fn(&Value, &Value) -> Value) -> Function {
    Function::binary(move |x, y| Ok(function(&x, &y)))
}

fn comparison(matches: fn(Ordering) -> bool) -> Function {
    Function::binary(move |x, y| Ok(ops::compare_with(&x, &y, matches)))
}

fn condition() -> Function {
    Function::ternary(|cond, if_true, if_false| {
        Ok(if cond.is_truthy() { if_true } else { if_false })
    })
}

fn numeric_fold(args: &[Value], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    args.iter().map(Value::to_number).fold(init, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            pick(acc, x)
        }
    })
}

fn hypot() -> Function {
    Function::new(Arity::any(), |args: Vec<Value>| {
        let args: Vec<_> = args.iter().map(Value::to_number).collect();
        Ok(Value::Number(math::hypot(&args)))
    })
}

/// Standard operators, functions and constants.
///
/// # Contents
///
/// - **Unary operators:** `-`, `+` (numeric conversion), `!` (factorial), `not`,
///   trigonometric and hyperbolic functions with their inverses (`sin`, `acosh` etc.),
///   `sqrt`, `log` / `ln` (natural logarithm), `lg` / `log10`, `abs`, `ceil`, `floor`, `round`,
///   `trunc`, `exp`, `length` (number of chars in the string representation).
/// - **Binary operators:** `+`, `-`, `*`, `/`, `%`, `^`, `||` (string concatenation),
///   comparisons (`==`, `!=`, `>`, `<`, `>=`, `<=`), `and`, `or`, `in`.
/// - **Ternary operators:** `?` (condition).
/// - **Functions:** `random`, `fac`, `min`, `max`, `hypot` (aliased as `pyt`), `pow`, `atan2`,
///   `if` (eager condition), `gamma`, `roundTo`.
/// - **Constants:** `E`, `PI`, `true` (= 1) and `false` (= 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct Prelude;

impl Prelude {
    /// Returns unary operators together with their names.
    #[allow(clippy::cast_precision_loss)]
    pub fn unary_ops() -> impl Iterator<Item = (&'static str, Function)> {
        let length = Function::unary(|x| Ok(Value::Number(x.to_string().chars().count() as f64)));
        let not = Function::unary(|x| Ok(Value::from(!x.is_truthy())));

        [
            ("-", numeric_unary(|x| -x)),
            ("+", numeric_unary(|x| x)),
            ("!", numeric_unary(math::factorial)),
            ("not", not),
            ("sin", numeric_unary(f64::sin)),
            ("cos", numeric_unary(f64::cos)),
            ("tan", numeric_unary(f64::tan)),
            ("asin", numeric_unary(f64::asin)),
            ("acos", numeric_unary(f64::acos)),
            ("atan", numeric_unary(f64::atan)),
            ("sinh", numeric_unary(f64::sinh)),
            ("cosh", numeric_unary(f64::cosh)),
            ("tanh", numeric_unary(f64::tanh)),
            ("asinh", numeric_unary(f64::asinh)),
            ("acosh", numeric_unary(f64::acosh)),
            ("atanh", numeric_unary(f64::atanh)),
            ("sqrt", numeric_unary(f64::sqrt)),
            ("log", numeric_unary(f64::ln)),
            ("ln", numeric_unary(f64::ln)),
            ("lg", numeric_unary(f64::log10)),
            ("log10", numeric_unary(f64::log10)),
            ("abs", numeric_unary(f64::abs)),
            ("ceil", numeric_unary(f64::ceil)),
            ("floor", numeric_unary(f64::floor)),
            ("round", numeric_unary(math::round)),
            ("trunc", numeric_unary(f64::trunc)),
            ("exp", numeric_unary(f64::exp)),
            ("length", length),
        ]
        .into_iter()
    }

    /// Returns binary operators together with their names.
    pub fn binary_ops() -> impl Iterator<Item = (&'static str, Function)> {
        let and = Function::binary(|x, y| Ok(Value::from(x.is_truthy() && y.is_truthy())));
        let or = Function::binary(|x, y| Ok(Value::from(x.is_truthy() || y.is_truthy())));
        let contains = Function::binary(|x, y| Ok(Value::from(ops::contains(&x, &y))));

        [
            ("+", value_binary(ops::add)),
            ("-", numeric_binary(|x, y| x - y)),
            ("*", numeric_binary(|x, y| x * y)),
            ("/", numeric_binary(|x, y| x / y)),
            ("%", numeric_binary(|x, y| x % y)),
            ("^", numeric_binary(f64::powf)),
            ("||", value_binary(ops::concat)),
            ("==", value_binary(|x, y| Value::from(x == y))),
            ("!=", value_binary(|x, y| Value::from(x != y))),
            (">", comparison(Ordering::is_gt)),
            ("<", comparison(Ordering::is_lt)),
            (">=", comparison(Ordering::is_ge)),
            ("<=", comparison(Ordering::is_le)),
            ("and", and),
            ("or", or),
            ("in", contains),
        ]
        .into_iter()
    }

    /// Returns ternary operators together with their names.
    pub fn ternary_ops() -> impl Iterator<Item = (&'static str, Function)> {
        [("?", condition())].into_iter()
    }

    /// Returns functions together with their names.
    pub fn functions() -> impl Iterator<Item = (&'static str, Function)> {
        let random = Function::new(Arity::range(0, 1), |args: Vec<Value>| {
            let scale = match args.first() {
                Some(scale) if scale.is_truthy() => scale.to_number(),
                _ => 1.0,
            };
            Ok(Value::Number(rand::random::<f64>() * scale))
        });
        let min = Function::new(Arity::any(), |args: Vec<Value>| {
            Ok(Value::Number(numeric_fold(&args, f64::INFINITY, f64::min)))
        });
        let max = Function::new(Arity::any(), |args: Vec<Value>| {
            Ok(Value::Number(numeric_fold(&args, f64::NEG_INFINITY, f64::max)))
        });
        let round_to = Function::new(Arity::range(1, 2), |args: Vec<Value>| {
            let value = args.first().map_or(f64::NAN, Value::to_number);
            let digits = args.get(1).map_or(0.0, Value::to_number);
            Ok(Value::Number(math::round_to(value, digits)))
        });

        [
            ("random", random),
            ("fac", numeric_unary(math::factorial)),
            ("min", min),
            ("max", max),
            ("hypot", hypot()),
            ("pyt", hypot()),
            ("pow", numeric_binary(f64::powf)),
            ("atan2", numeric_binary(f64::atan2)),
            ("if", condition()),
            ("gamma", numeric_unary(math::gamma)),
            ("roundTo", round_to),
        ]
        .into_iter()
    }

    /// Returns constants together with their names.
    pub fn constants() -> impl Iterator<Item = (&'static str, Literal)> {
        [
            ("E", Literal::Number(E)),
            ("PI", Literal::Number(PI)),
            ("true", Literal::Number(1.0)),
            ("false", Literal::Number(0.0)),
        ]
        .into_iter()
    }
}
