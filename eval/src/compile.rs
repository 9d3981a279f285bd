//! Compiled-function adapter.

use core::fmt;

use formula_parser::ParseOptions;

use crate::{
    Arity, Bindings, Environment, EvalError, EvalResult, Expression, ExpressionError, Value,
};

/// Function produced by a [`CodegenBackend`]. Receives positional arguments in the order
/// of the parameters.
pub type GeneratedFn<'e> = Box<dyn Fn(&[Value]) -> EvalResult + 'e>;

/// Input of a [`CodegenBackend`].
///
/// The contract with the backend is as follows: `body` is an infix expression that, parsed
/// in `env` with `options` and evaluated with `params` bound to the arguments on top
/// of `captures`, yields the same result as evaluating the original expression.
#[derive(Debug)]
#[non_exhaustive]
pub struct FnSource<'a, 'e> {
    /// Rendered function body.
    pub body: &'a str,
    /// Parameter names, in the order of positional arguments.
    pub params: &'a [String],
    /// Environment of the compiled expression.
    pub env: &'e Environment,
    /// Options the compiled expression was parsed with.
    pub options: &'a ParseOptions,
    /// Bound variables that could not be folded into the body (e.g., records or functions).
    /// Parameters take precedence over captures.
    pub captures: &'a Bindings,
}

/// Backend turning a rendered expression into a callable.
pub trait CodegenBackend {
    /// Generates a function from the specified source.
    fn generate<'e>(
        &self,
        source: &FnSource<'_, 'e>,
    ) -> Result<GeneratedFn<'e>, ExpressionError>;
}

/// Default [`CodegenBackend`]: re-parses the rendered body in the same environment
/// and evaluates it on each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReparseBackend;

impl CodegenBackend for ReparseBackend {
    fn generate<'e>(
        &self,
        source: &FnSource<'_, 'e>,
    ) -> Result<GeneratedFn<'e>, ExpressionError> {
        let expr = Expression::parse_with_options(source.body, source.env, source.options)?;
        let params = source.params.to_vec();
        let captures = source.captures.clone();
        Ok(Box::new(move |args: &[Value]| {
            let mut vars = captures.clone();
            for (param, arg) in params.iter().zip(args) {
                vars.insert(param, arg.clone());
            }
            expr.evaluate(&vars)
        }))
    }
}

/// Expression compiled into a function of positional arguments.
///
/// # Examples
///
/// ```
/// use formula_eval::{Bindings, Environment, Expression, Value};
///
/// # fn main() -> anyhow::Result<()> {
/// let env = Environment::standard();
/// let expr = Expression::parse("k * x ^ 2 + y", &env)?;
/// let function = expr.compile(&["x", "y"], &Bindings::new().with("k", 3.0))?;
/// assert_eq!(function.code(), "3 * x ^ 2 + y");
///
/// let value = function.call(&[Value::Number(2.0), Value::Number(1.0)])?;
/// assert_eq!(value, Value::Number(13.0));
/// # Ok(())
/// # }
/// ```
pub struct CompiledFn<'e> {
    params: Vec<String>,
    code: String,
    function: GeneratedFn<'e>,
}

impl fmt::Debug for CompiledFn<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CompiledFn")
            .field("params", &self.params)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

impl<'e> CompiledFn<'e> {
    pub(crate) fn new(params: Vec<String>, code: String, function: GeneratedFn<'e>) -> Self {
        Self {
            params,
            code,
            function,
        }
    }

    /// Returns parameter names.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns the rendered body of the function.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Calls the function. The number of arguments must match the number of parameters.
    pub fn call(&self, args: &[Value]) -> EvalResult {
        if args.len() != self.params.len() {
            return Err(EvalError::ArgsLenMismatch {
                expected: Arity::exact(self.params.len()),
                actual: args.len(),
            });
        }
        (self.function)(args)
    }
}
