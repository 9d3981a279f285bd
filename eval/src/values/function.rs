//! `Function` and closely related types.

use std::{fmt, sync::Arc};

use crate::{EvalError, EvalResult, Value};

/// Number of arguments accepted by a [`Function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// Exactly `count` args.
    pub const fn exact(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    /// `min` args or more.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// From `min` to `max` args, inclusive.
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Any number of args.
    pub const fn any() -> Self {
        Self::at_least(0)
    }

    /// Checks whether a call with `count` args matches this arity.
    pub fn matches(self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(formatter, "{max}"),
            Some(max) => write!(formatter, "{}..={max}", self.min),
            None => write!(formatter, "at least {}", self.min),
        }
    }
}

/// Function on zero or more [`Value`]s defined in the Rust code.
///
/// The trait is implemented for all thread-safe closures with the matching signature.
pub trait NativeFn: Send + Sync {
    /// Executes the function on the specified arguments.
    fn evaluate(&self, args: Vec<Value>) -> EvalResult;
}

impl<F> NativeFn for F
where
    F: Fn(Vec<Value>) -> EvalResult + Send + Sync,
{
    fn evaluate(&self, args: Vec<Value>) -> EvalResult {
        self(args)
    }
}

/// Callable value: an operator implementation or a function from the environment.
///
/// Functions are cheap to clone. Two functions are equal only if they are clones
/// of the same instance.
#[derive(Clone)]
pub struct Function {
    inner: Arc<dyn NativeFn>,
    arity: Arity,
}

impl fmt::Debug for Function {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Function")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Function {
    /// Creates a function with the specified arity from a closure.
    pub fn new<F>(arity: Arity, function: F) -> Self
    where
        F: Fn(Vec<Value>) -> EvalResult + Send + Sync + 'static,
    {
        Self::from_native(arity, function)
    }

    /// Creates a function with the specified arity from a [`NativeFn`] implementation.
    pub fn from_native(arity: Arity, function: impl NativeFn + 'static) -> Self {
        Self {
            inner: Arc::new(function),
            arity,
        }
    }

    /// Creates a function accepting exactly one arg.
    pub fn unary<F>(function: F) -> Self
    where
        F: Fn(Value) -> EvalResult + Send + Sync + 'static,
    {
        Self::new(Arity::exact(1), move |args: Vec<Value>| {
            let [x] = unpack(args)?;
            function(x)
        })
    }

    /// Creates a function accepting exactly two args.
    pub fn binary<F>(function: F) -> Self
    where
        F: Fn(Value, Value) -> EvalResult + Send + Sync + 'static,
    {
        Self::new(Arity::exact(2), move |args: Vec<Value>| {
            let [x, y] = unpack(args)?;
            function(x, y)
        })
    }

    /// Creates a function accepting exactly three args.
    pub fn ternary<F>(function: F) -> Self
    where
        F: Fn(Value, Value, Value) -> EvalResult + Send + Sync + 'static,
    {
        Self::new(Arity::exact(3), move |args: Vec<Value>| {
            let [x, y, z] = unpack(args)?;
            function(x, y, z)
        })
    }

    /// Returns the arity of this function.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Calls this function, checking the number of args beforehand.
    pub fn call(&self, args: Vec<Value>) -> EvalResult {
        if !self.arity.matches(args.len()) {
            return Err(EvalError::ArgsLenMismatch {
                expected: self.arity,
                actual: args.len(),
            });
        }
        self.inner.evaluate(args)
    }
}

fn unpack<const N: usize>(args: Vec<Value>) -> Result<[Value; N], EvalError> {
    args.try_into()
        .map_err(|args: Vec<Value>| EvalError::ArgsLenMismatch {
            expected: Arity::exact(N),
            actual: args.len(),
        })
}
