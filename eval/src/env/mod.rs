//! [`Environment`] and other types related to capability tables and variables.

use hashbrown::HashMap;

use formula_parser::{grammars::Grammar, Literal, ParseOptions};

mod variable_map;

pub use self::variable_map::{Bindings, VariableMap};

use crate::{
    error::{ExpressionError, OpKind},
    fns::Prelude,
    EvalError, Expression, Function, Value,
};

/// Capability tables: operators, functions and constants available to expressions,
/// together with the options used to parse expressions.
///
/// An environment is read-only once expressions are built against it; [`Expression`]s
/// borrow the environment they were parsed with.
///
/// # Examples
///
/// ```
/// use formula_eval::{Bindings, Environment, Function, Value};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut env = Environment::standard();
/// env.insert_fn("clamp", Function::ternary(|x, min, max| {
///     let x = x.to_number().max(min.to_number()).min(max.to_number());
///     Ok(Value::Number(x))
/// }));
/// env.insert_constant("ANSWER", 42.0);
/// env.set_operator("power", false);
///
/// let value = env.evaluate("clamp(ANSWER * x, 0, 100)", &Bindings::new().with("x", 3.0))?;
/// assert_eq!(value, Value::Number(100.0));
/// // The power operator is disabled.
/// assert!(env.evaluate("2 ^ 3", &Bindings::new()).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    unary_ops: HashMap<String, Function>,
    binary_ops: HashMap<String, Function>,
    ternary_ops: HashMap<String, Function>,
    functions: HashMap<String, Function>,
    constants: HashMap<String, Literal>,
    options: ParseOptions,
}

impl Environment {
    /// Creates an environment with no operators, functions or constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment with the [standard](Prelude) operators, functions and constants.
    pub fn standard() -> Self {
        let mut env = Self::new();
        env.unary_ops.extend(named(Prelude::unary_ops()));
        env.binary_ops.extend(named(Prelude::binary_ops()));
        env.ternary_ops.extend(named(Prelude::ternary_ops()));
        env.functions.extend(named(Prelude::functions()));
        env.constants.extend(named(Prelude::constants()));
        env
    }

    /// Returns parsing options used by this environment.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Sets parsing options.
    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables an operator capability. See [`ParseOptions::set_operator()`]
    /// for details.
    pub fn set_operator(&mut self, name: &str, enabled: bool) -> &mut Self {
        self.options.set_operator(name, enabled);
        self
    }

    /// Inserts a unary operator. Symbolic operators must be recognized by the lexer
    /// (e.g., `-` or `!`); named operators can be arbitrary identifiers.
    pub fn insert_unary_op(&mut self, name: &str, function: Function) -> &mut Self {
        self.unary_ops.insert(name.to_owned(), function);
        self
    }

    /// Inserts a binary operator.
    pub fn insert_binary_op(&mut self, name: &str, function: Function) -> &mut Self {
        self.binary_ops.insert(name.to_owned(), function);
        self
    }

    /// Inserts a ternary operator.
    pub fn insert_ternary_op(&mut self, name: &str, function: Function) -> &mut Self {
        self.ternary_ops.insert(name.to_owned(), function);
        self
    }

    /// Inserts a function.
    pub fn insert_fn(&mut self, name: &str, function: Function) -> &mut Self {
        self.functions.insert(name.to_owned(), function);
        self
    }

    /// Inserts a constant. Constants are substituted by the lexer, so inserting a constant
    /// only affects expressions parsed afterwards.
    pub fn insert_constant(&mut self, name: &str, value: impl Into<Literal>) -> &mut Self {
        self.constants.insert(name.to_owned(), value.into());
        self
    }

    /// Gets a function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Checks if this environment contains a function with the specified name.
    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Iterates over function names.
    pub fn function_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.functions.keys().map(String::as_str)
    }

    /// Gets a constant by name.
    pub fn constant_value(&self, name: &str) -> Option<&Literal> {
        self.constants.get(name)
    }

    /// Resolves an enabled unary operator.
    pub fn unary_op(&self, name: &str) -> Option<&Function> {
        self.unary_ops
            .get(name)
            .filter(|_| self.options.is_operator_enabled(name))
    }

    /// Resolves a binary operator.
    pub fn binary_op(&self, name: &str) -> Option<&Function> {
        self.binary_ops.get(name)
    }

    /// Resolves a ternary operator.
    pub fn ternary_op(&self, name: &str) -> Option<&Function> {
        self.ternary_ops.get(name)
    }

    pub(crate) fn resolve_op(&self, kind: OpKind, name: &str) -> Result<&Function, EvalError> {
        let op = match kind {
            OpKind::Unary => self.unary_ops.get(name),
            OpKind::Binary => self.binary_op(name),
            OpKind::Ternary => self.ternary_op(name),
        };
        op.ok_or_else(|| EvalError::unknown_op(kind, name))
    }

    /// Resolves a variable name that is not bound by the caller: functions and enabled
    /// unary operators take precedence over the variables, and constants are the fallback.
    pub(crate) fn resolve_name(&self, name: &str, vars: &dyn VariableMap) -> Option<Value> {
        if let Some(function) = self.functions.get(name) {
            return Some(Value::Function(function.clone()));
        }
        if let Some(op) = self.unary_op(name) {
            return Some(Value::Function(op.clone()));
        }
        vars.get_variable(name)
            .or_else(|| self.constants.get(name).cloned().map(Value::from))
    }

    /// Parses and evaluates `code` in this environment.
    pub fn evaluate(&self, code: &str, vars: &dyn VariableMap) -> Result<Value, ExpressionError> {
        let expr = Expression::parse(code, self)?;
        Ok(expr.evaluate(vars)?)
    }
}

fn named<T>(items: impl Iterator<Item = (&'static str, T)>) -> impl Iterator<Item = (String, T)> {
    items.map(|(name, item)| (name.to_owned(), item))
}

impl Grammar for Environment {
    fn is_unary_op(&self, name: &str) -> bool {
        self.unary_ops.contains_key(name)
    }

    fn is_binary_op(&self, name: &str) -> bool {
        self.binary_ops.contains_key(name)
    }

    fn is_ternary_op(&self, name: &str) -> bool {
        self.ternary_ops.contains_key(name)
    }

    fn constant(&self, name: &str) -> Option<Literal> {
        self.constants.get(name).cloned()
    }
}
