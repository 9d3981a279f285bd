//! Values used by the evaluator.

use hashbrown::HashMap;

use core::fmt;

use formula_parser::Literal;

mod function;

pub use self::function::{Arity, Function, NativeFn};

/// Record value: a map of named fields.
pub type Record = HashMap<String, Value>;

/// Possible high-level types of [`Value`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueType {
    /// Number.
    Number,
    /// String.
    Str,
    /// Function.
    Function,
    /// Record with named fields.
    Record,
    /// Absent value.
    Void,
}

impl fmt::Display for ValueType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Number => "number",
            Self::Str => "string",
            Self::Function => "function",
            Self::Record => "record",
            Self::Void => "void",
        })
    }
}

/// Values produced by evaluating expressions.
///
/// Boolean values are represented as numbers: `1` for true and `0` for false.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Number.
    Number(f64),
    /// String.
    Str(String),
    /// Function.
    Function(Function),
    /// Record with named fields.
    Record(Record),
    /// Absent value, such as the result of accessing a missing record field.
    Void,
}

impl Value {
    /// Creates a value from a function on the specified number of args.
    pub fn native_fn(arity: Arity, function: impl NativeFn + 'static) -> Self {
        Self::Function(Function::from_native(arity, function))
    }

    /// Creates a record from the specified fields.
    pub fn record<S, V>(fields: impl IntoIterator<Item = (S, V)>) -> Self
    where
        S: Into<String>,
        V: Into<Self>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()));
        Self::Record(fields.collect())
    }

    /// Returns the type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Number(_) => ValueType::Number,
            Self::Str(_) => ValueType::Str,
            Self::Function(_) => ValueType::Function,
            Self::Record(_) => ValueType::Record,
            Self::Void => ValueType::Void,
        }
    }

    /// Converts this value to a number. Strings are parsed as decimal numbers
    /// (`Infinity` with an optional sign is accepted as well); empty or unparsable strings,
    /// as well as non-primitive values, are converted to NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Number(number) => *number,
            Self::Str(string) => parse_number(string),
            _ => f64::NAN,
        }
    }

    /// Checks whether this value is truthy. Zero, NaN, the empty string and [`Self::Void`]
    /// are falsy; all other values are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            Self::Str(string) => !string.is_empty(),
            Self::Function(_) | Self::Record(_) => true,
            Self::Void => false,
        }
    }

    /// Returns the field with the specified name, or [`Self::Void`] if this value is not a record
    /// or does not have such a field.
    pub fn field(&self, name: &str) -> Self {
        match self {
            Self::Record(fields) => fields.get(name).cloned().unwrap_or(Self::Void),
            _ => Self::Void,
        }
    }

    /// Converts this value into a literal if it has a literal representation.
    pub fn to_literal(&self) -> Option<Literal> {
        match self {
            Self::Number(number) => Some(Literal::Number(*number)),
            Self::Str(string) => Some(Literal::Str(string.clone())),
            _ => None,
        }
    }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // `f64::from_str()` also accepts `inf` and `nan`.
    if unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Number(if value { 1.0 } else { 0.0 })
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(number) => Self::Number(number),
            Literal::Str(string) => Self::Str(string),
        }
    }
}

fn format_number(number: f64, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
    if number.is_infinite() {
        let sign = if number < 0.0 { "-" } else { "" };
        write!(formatter, "{sign}Infinity")
    } else if number == 0.0 {
        // Prevents outputting `-0`.
        formatter.write_str("0")
    } else {
        write!(formatter, "{number}")
    }
}

/// Formats values in the form used in string concatenation: strings are output as is,
/// without quotes, and booleans are output as numbers.
impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => format_number(*number, formatter),
            Self::Str(string) => formatter.write_str(string),
            Self::Function(function) => write!(formatter, "[function/{}]", function.arity()),
            Self::Record(fields) => {
                let mut names: Vec<_> = fields.keys().collect();
                names.sort_unstable();
                formatter.write_str("{")?;
                for (i, name) in names.into_iter().enumerate() {
                    if i > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{name}: {}", fields[name])?;
                }
                formatter.write_str("}")
            }
            Self::Void => formatter.write_str("void"),
        }
    }
}
