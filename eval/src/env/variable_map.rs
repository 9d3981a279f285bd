//! `VariableMap` trait and implementations.

use hashbrown::HashMap;

use std::{collections::HashMap as StdHashMap, hash::BuildHasher};

use crate::Value;

/// Encapsulates read access to named variables.
pub trait VariableMap {
    /// Returns value of the named variable, or `None` if it is not defined.
    fn get_variable(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher> VariableMap for HashMap<String, Value, S> {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<S: BuildHasher> VariableMap for StdHashMap<String, Value, S> {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl VariableMap for [(&str, Value)] {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.iter()
            .find_map(|(var_name, value)| (*var_name == name).then(|| value.clone()))
    }
}

impl<const N: usize> VariableMap for [(&str, Value); N] {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.as_slice().get_variable(name)
    }
}

impl<T: VariableMap + ?Sized> VariableMap for &T {
    fn get_variable(&self, name: &str) -> Option<Value> {
        (**self).get_variable(name)
    }
}

/// Named variable values.
///
/// # Examples
///
/// ```
/// use formula_eval::{Bindings, Environment, Expression, Value};
///
/// # fn main() -> anyhow::Result<()> {
/// let env = Environment::standard();
/// let expr = Expression::parse("x * y", &env)?;
/// let vars = Bindings::new().with("x", 3.0).with("y", 7.0);
/// assert_eq!(expr.evaluate(&vars)?, Value::Number(21.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    variables: HashMap<String, Value>,
}

impl Bindings {
    /// Creates empty bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable to these bindings.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a variable, replacing the previous value if any.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.variables.insert(name.to_owned(), value.into());
        self
    }

    /// Gets a variable by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Checks whether a variable with the specified name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Checks whether these bindings are empty.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterates over variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl VariableMap for Bindings {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<S, V> FromIterator<(S, V)> for Bindings
where
    S: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let variables = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()));
        Self {
            variables: variables.collect(),
        }
    }
}

impl<S, V> Extend<(S, V)> for Bindings
where
    S: Into<String>,
    V: Into<Value>,
{
    fn extend<I: IntoIterator<Item = (S, V)>>(&mut self, iter: I) {
        let variables = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()));
        self.variables.extend(variables);
    }
}
