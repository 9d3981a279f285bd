//! Evaluator, constant folder and compiled-function adapter for instruction streams produced
//! by [`formula-parser`].
//!
//! # How it works
//!
//! 1. An [`Environment`] defines *capability tables*: which unary, binary and ternary operators,
//!   functions and constants are available, together with the [`ParseOptions`] switching
//!   individual operators on or off. [`Environment::standard()`] provides the [`Prelude`].
//! 2. Code is parsed in the environment into an [`Expression`], which wraps a flat postfix
//!   instruction stream.
//! 3. The expression can then be evaluated with variable values provided by a [`VariableMap`]
//!   (e.g., [`Bindings`]), simplified, transformed via substitution, rendered back to the infix
//!   form, or [compiled](Expression::compile()) into a function of positional arguments.
//!
//! # Type system
//!
//! [`Value`]s have the following types:
//!
//! - **Numbers** (`f64`). There is no dedicated boolean type: comparisons and logical operators
//!   return `1` or `0`.
//! - **Strings**
//! - **Functions,** i.e., native callables implementing [`NativeFn`]
//! - **Records** with named fields, which can be accessed with the `.field` syntax
//! - **Void,** the result of accessing a missing field.
//!
//! # Semantics
//!
//! - Variables are resolved in the following order: functions from the environment, enabled
//!   named unary operators, variables, and constants. The parser never emits references
//!   to enabled operators (`sin` is always lexed as an operator and must have an operand),
//!   so the second step only applies to hand-built or transformed instruction streams.
//! - Branches of the conditional operator `?:` and right-hand operands of `and` / `or`
//!   are evaluated lazily. Other operands (including function arguments) are evaluated eagerly.
//! - `+` and other arithmetic operators coerce operands to numbers; strings are parsed
//!   as decimals, and unparsable values become NaN. String concatenation is performed with `||`.
//! - Equality is strict: values of different types are never equal, and functions are
//!   compared by identity.
//! - Simplification folds operators with fully determined operands. Function calls
//!   are never folded since functions may be impure (e.g., `random`).
//!
//! # Examples
//!
//! ```
//! use formula_eval::{Bindings, Environment, Expression, Function, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut env = Environment::standard();
//! env.insert_fn("double", Function::unary(|x| Ok(Value::Number(x.to_number() * 2.0))));
//!
//! let expr = Expression::parse("x > 0 ? double(x) + 1 : 'negative: ' || x", &env)?;
//! let value = expr.evaluate(&Bindings::new().with("x", 3.0))?;
//! assert_eq!(value, Value::Number(7.0));
//! let value = expr.evaluate(&Bindings::new().with("x", -1.0))?;
//! assert_eq!(value, Value::from("negative: -1"));
//!
//! // Records and member access.
//! let point = Value::record([("x", 3.0), ("y", 4.0)]);
//! let value = env.evaluate("hypot(pt.x, pt.y)", &Bindings::new().with("pt", point))?;
//! assert_eq!(value, Value::Number(5.0));
//! # Ok(())
//! # }
//! ```
//!
//! [`formula-parser`]: formula_parser
//! [`ParseOptions`]: formula_parser::ParseOptions

#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub use self::{
    compile::{CodegenBackend, CompiledFn, FnSource, GeneratedFn, ReparseBackend},
    env::{Bindings, Environment, VariableMap},
    error::{EvalError, EvalResult, ExpressionError},
    exec::evaluate,
    expr::Expression,
    fns::Prelude,
    simplify::simplify,
    values::{Arity, Function, NativeFn, Record, Value, ValueType},
};

mod compile;
mod env;
pub mod error;
mod exec;
mod expr;
pub mod fns;
mod simplify;
mod values;
