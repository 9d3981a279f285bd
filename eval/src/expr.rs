//! `Expression` façade.

use core::{fmt, ptr};

use formula_parser::{parse, Instruction, InstructionStream, Literal, ParseOptions, SymbolOptions};

use crate::{
    compile::{CodegenBackend, CompiledFn, FnSource, ReparseBackend},
    exec, simplify, Bindings, Environment, EvalResult, ExpressionError, VariableMap,
};

/// Parsed expression bound to the [`Environment`] and [`ParseOptions`] it was parsed with.
///
/// Expressions are immutable: transformations ([`simplify()`](Self::simplify()),
/// [`substitute()`](Self::substitute()) etc.) return new expressions.
///
/// # Examples
///
/// ```
/// use formula_eval::{Bindings, Environment, Expression, Value};
/// use formula_parser::SymbolOptions;
///
/// # fn main() -> anyhow::Result<()> {
/// let env = Environment::standard();
/// let expr = Expression::parse("x > 0 ? sqrt(x) : max(x, y)", &env)?;
/// assert_eq!(expr.variables(SymbolOptions::default()), ["x", "y"]);
///
/// let value = expr.evaluate(&Bindings::new().with("x", 16.0))?;
/// assert_eq!(value, Value::Number(4.0));
///
/// let expr = expr.substitute_str("x", "a - 2")?;
/// assert_eq!(expr.to_string(), "a - 2 > 0 ? sqrt(a - 2) : max(a - 2, y)");
/// // Function calls are not folded, so the conditional is retained.
/// let expr = expr.simplify(&Bindings::new().with("a", 6.0));
/// assert_eq!(expr.to_string(), "1 ? 2 : max(4, y)");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Expression<'e> {
    stream: InstructionStream,
    env: &'e Environment,
    options: ParseOptions,
}

impl<'e> Expression<'e> {
    /// Parses an expression using the options of the environment.
    pub fn parse(code: &str, env: &'e Environment) -> Result<Self, formula_parser::Error> {
        Self::parse_with_options(code, env, env.options())
    }

    /// Parses an expression with the specified parsing options.
    pub fn parse_with_options(
        code: &str,
        env: &'e Environment,
        options: &ParseOptions,
    ) -> Result<Self, formula_parser::Error> {
        let stream = parse(code, env, options)?;
        Ok(Self {
            stream,
            env,
            options: options.clone(),
        })
    }

    /// Wraps an existing instruction stream. The expression will use the options
    /// of the environment.
    pub fn from_stream(stream: InstructionStream, env: &'e Environment) -> Self {
        Self {
            stream,
            env,
            options: env.options().clone(),
        }
    }

    fn with_stream(&self, stream: InstructionStream) -> Self {
        Self {
            stream,
            env: self.env,
            options: self.options.clone(),
        }
    }

    /// Returns the instruction stream of this expression.
    pub fn stream(&self) -> &InstructionStream {
        &self.stream
    }

    /// Returns the environment of this expression.
    pub fn env(&self) -> &'e Environment {
        self.env
    }

    /// Returns the options this expression was parsed with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Unwraps the instruction stream of this expression.
    pub fn into_stream(self) -> InstructionStream {
        self.stream
    }

    /// Evaluates this expression with the specified variables.
    pub fn evaluate(&self, vars: &dyn VariableMap) -> EvalResult {
        exec::evaluate(&self.stream, self.env, vars)
    }

    /// Simplifies this expression by folding constant subexpressions. See [`simplify()`]
    /// for details.
    ///
    /// [`simplify()`]: crate::simplify()
    #[must_use]
    pub fn simplify(&self, known: &dyn VariableMap) -> Self {
        let stream = simplify::simplify_with_options(&self.stream, self.env, &self.options, known);
        log::trace!("simplified `{}` to `{stream}`", self.stream);
        self.with_stream(stream)
    }

    /// Replaces every reference to the variable `name` with `replacement`.
    ///
    /// Substitution is single-pass and does not avoid capturing: references to `name`
    /// in `replacement` are left as is.
    #[must_use]
    pub fn substitute(&self, name: &str, replacement: &Self) -> Self {
        self.with_stream(self.stream.substitute(name, &replacement.stream))
    }

    /// Replaces every reference to the variable `name` with the specified literal.
    #[must_use]
    pub fn substitute_literal(&self, name: &str, value: impl Into<Literal>) -> Self {
        let literal: Literal = value.into();
        let replacement = InstructionStream::from(vec![Instruction::from(literal)]);
        self.with_stream(self.stream.substitute(name, &replacement))
    }

    /// Parses `code` in the environment and with the options of this expression,
    /// and substitutes the result for the variable `name`.
    pub fn substitute_str(&self, name: &str, code: &str) -> Result<Self, formula_parser::Error> {
        let replacement = Self::parse_with_options(code, self.env, &self.options)?;
        Ok(self.substitute(name, &replacement))
    }

    /// Returns names referenced in this expression, in the order of their first occurrence.
    pub fn symbols(&self, options: SymbolOptions) -> Vec<String> {
        self.stream.symbols(options)
    }

    /// Returns free variables of this expression, i.e., [symbols](Self::symbols()) that are not
    /// functions in the environment.
    pub fn variables(&self, options: SymbolOptions) -> Vec<String> {
        let mut symbols = self.symbols(options);
        symbols.retain(|name| !self.env.is_function(name));
        symbols
    }

    /// Renders this expression in the infix form.
    pub fn render(&self) -> String {
        self.stream.render()
    }

    /// Compiles this expression into a function of `params` using the [default backend]
    /// that re-parses the rendered expression. `bindings` are folded into the function body;
    /// bound values without a literal representation (e.g., records) are captured
    /// by the function instead.
    ///
    /// [default backend]: ReparseBackend
    pub fn compile(
        &self,
        params: &[&str],
        bindings: &dyn VariableMap,
    ) -> Result<CompiledFn<'e>, ExpressionError> {
        self.compile_with(&ReparseBackend, params, bindings)
    }

    /// Compiles this expression into a function of `params` using the specified backend.
    pub fn compile_with<B: CodegenBackend>(
        &self,
        backend: &B,
        params: &[&str],
        bindings: &dyn VariableMap,
    ) -> Result<CompiledFn<'e>, ExpressionError> {
        let simplified = self.simplify(bindings);
        let body = simplified.render();
        let params: Vec<_> = params.iter().map(|&param| param.to_owned()).collect();
        let captures: Bindings = simplified
            .variables(SymbolOptions::default())
            .into_iter()
            .filter(|name| !params.contains(name))
            .filter_map(|name| {
                let value = bindings.get_variable(&name)?;
                Some((name, value))
            })
            .collect();
        log::trace!(
            "compiling `{body}` with params {params:?} and {} captured variable(s)",
            captures.len()
        );

        let source = FnSource {
            body: &body,
            params: &params,
            env: self.env,
            options: &self.options,
            captures: &captures,
        };
        let function = backend.generate(&source)?;
        Ok(CompiledFn::new(params, body, function))
    }
}

/// Expressions are equal if they have equal instruction streams and options,
/// and share the environment.
impl PartialEq for Expression<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.env, other.env)
            && self.options == other.options
            && self.stream == other.stream
    }
}

impl fmt::Display for Expression<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stream, formatter)
    }
}
