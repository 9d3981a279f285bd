//! Evaluation errors.

use core::fmt;

use crate::{Arity, Value};

/// Kind of an operator, used in [`EvalError::UnknownOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Unary operator, such as `-` or `sin`.
    Unary,
    /// Binary operator, such as `+` or `and`.
    Binary,
    /// Ternary operator, such as `?`.
    Ternary,
}

impl fmt::Display for OpKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Unary => "unary",
            Self::Binary => "binary",
            Self::Ternary => "ternary",
        })
    }
}

/// Errors that can occur during evaluating an instruction stream.
///
/// An error is fatal to the evaluation call only; the evaluated expression can be re-evaluated
/// with other variable values.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvalError {
    /// Variable with the enclosed name is neither bound nor a constant or function.
    Undefined(String),
    /// Operator is missing from the environment or is disabled.
    UnknownOp {
        /// Operator kind.
        kind: OpKind,
        /// Operator name.
        name: String,
    },
    /// Value is not callable (i.e., is not a function).
    CannotCall,
    /// Mismatch between the number of arguments accepted by a function and its call.
    ArgsLenMismatch {
        /// Number of args accepted by the function.
        expected: Arity,
        /// Number of args at the function call.
        actual: usize,
    },
    /// Generic error during execution of a native function.
    NativeCall(String),
    /// Instruction stream is not stack-balanced. Streams produced by the parser
    /// and the provided transformations never lead to this error.
    InvalidStream(String),
}

impl EvalError {
    /// Creates a native error.
    pub fn native(message: impl Into<String>) -> Self {
        Self::NativeCall(message.into())
    }

    pub(crate) fn unknown_op(kind: OpKind, name: &str) -> Self {
        Self::UnknownOp {
            kind,
            name: name.to_owned(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined(name) => write!(formatter, "Variable `{name}` is not defined"),
            Self::UnknownOp { kind, name } => {
                write!(formatter, "Unknown {kind} operator `{name}`")
            }
            Self::CannotCall => formatter.write_str("Value is not callable"),
            Self::ArgsLenMismatch { expected, actual } => write!(
                formatter,
                "Mismatch between the number of arguments in the function definition and its call: \
                 definition requires {expected} arg(s), call has {actual}"
            ),
            Self::NativeCall(message) => {
                write!(formatter, "Failed executing native function: {message}")
            }
            Self::InvalidStream(detail) => write!(formatter, "Invalid instruction stream: {detail}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result of evaluating an expression or calling a function.
pub type EvalResult = Result<Value, EvalError>;

/// Error parsing or evaluating an [`Expression`](crate::Expression).
#[derive(Debug)]
#[non_exhaustive]
pub enum ExpressionError {
    /// Error parsing the expression code.
    Parse(formula_parser::Error),
    /// Error evaluating the expression.
    Eval(EvalError),
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(formatter, "Failed parsing expression: {err}"),
            Self::Eval(err) => write!(formatter, "Failed evaluating expression: {err}"),
        }
    }
}

impl std::error::Error for ExpressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Eval(err) => Some(err),
        }
    }
}

impl From<formula_parser::Error> for ExpressionError {
    fn from(err: formula_parser::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalError> for ExpressionError {
    fn from(err: EvalError) -> Self {
        Self::Eval(err)
    }
}
