//! Grammar lookups and parsing options.
//!
//! A [`Grammar`] tells the lexer which identifier-like runs are operators or constants;
//! [`ParseOptions`] switch individual operators and member access on or off. The lexer
//! consults both only to decide how to tokenize the input. Operator implementations
//! are irrelevant for parsing and are resolved by name when a stream is evaluated.

use bitflags::bitflags;

use crate::{
    alloc::{BTreeSet, String, ToOwned},
    Literal,
};

/// Lookup capability for operators and constants consulted by the lexer.
///
/// Implementations are expected to be cheap lookups in name tables. Symbolic operators
/// (`+`, `<=`, `?` etc.) are always recognized by the lexer; the grammar only needs to know
/// about named operators such as `sin` or `and`, although it may report symbolic ones as well.
pub trait Grammar {
    /// Checks whether `name` is a unary (prefix or postfix) operator.
    fn is_unary_op(&self, name: &str) -> bool;
    /// Checks whether `name` is a binary operator.
    fn is_binary_op(&self, name: &str) -> bool;
    /// Checks whether `name` is a ternary operator.
    fn is_ternary_op(&self, name: &str) -> bool;
    /// Returns the value of a constant with the specified name, or `None` if the name
    /// is not a constant.
    fn constant(&self, name: &str) -> Option<Literal>;

    /// Checks whether `name` is an operator of any arity.
    fn is_op(&self, name: &str) -> bool {
        self.is_unary_op(name) || self.is_binary_op(name) || self.is_ternary_op(name)
    }
}

impl<G: Grammar + ?Sized> Grammar for &G {
    fn is_unary_op(&self, name: &str) -> bool {
        (**self).is_unary_op(name)
    }

    fn is_binary_op(&self, name: &str) -> bool {
        (**self).is_binary_op(name)
    }

    fn is_ternary_op(&self, name: &str) -> bool {
        (**self).is_ternary_op(name)
    }

    fn constant(&self, name: &str) -> Option<Literal> {
        (**self).constant(name)
    }
}

/// Grammar with the standard set of operators and constants.
///
/// This grammar is useful to parse expressions without setting up an evaluation environment;
/// its tables match the default environment of the evaluation crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl Standard {
    /// Named and symbolic unary operators.
    pub const UNARY_OPS: &'static [&'static str] = &[
        "-", "+", "!", "not", "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh",
        "asinh", "acosh", "atanh", "sqrt", "log", "ln", "lg", "log10", "abs", "ceil", "floor",
        "round", "trunc", "exp", "length",
    ];
    /// Named and symbolic binary operators.
    pub const BINARY_OPS: &'static [&'static str] = &[
        "+", "-", "*", "/", "%", "^", "||", "==", "!=", ">", "<", ">=", "<=", "and", "or", "in",
    ];
    /// Ternary operators.
    pub const TERNARY_OPS: &'static [&'static str] = &["?"];
}

impl Grammar for Standard {
    fn is_unary_op(&self, name: &str) -> bool {
        Self::UNARY_OPS.contains(&name)
    }

    fn is_binary_op(&self, name: &str) -> bool {
        Self::BINARY_OPS.contains(&name)
    }

    fn is_ternary_op(&self, name: &str) -> bool {
        Self::TERNARY_OPS.contains(&name)
    }

    fn constant(&self, name: &str) -> Option<Literal> {
        Some(Literal::Number(match name {
            "E" => core::f64::consts::E,
            "PI" => core::f64::consts::PI,
            "true" => 1.0,
            "false" => 0.0,
            _ => return None,
        }))
    }
}

bitflags! {
    /// Operator capabilities and syntax features that can be switched on or off.
    ///
    /// Each flag corresponds to a capability name accepted by [`ParseOptions::set_operator()`];
    /// see [`Self::from_capability()`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u16 {
        /// Addition and unary plus (`+`).
        const ADD = 1;
        /// Subtraction and negation (`-`).
        const SUBTRACT = 2;
        /// Multiplication (`*`).
        const MULTIPLY = 4;
        /// Division (`/`).
        const DIVIDE = 8;
        /// Remainder (`%`).
        const REMAINDER = 16;
        /// Power (`^`).
        const POWER = 32;
        /// Postfix factorial (`!`).
        const FACTORIAL = 64;
        /// Comparisons: `==`, `!=`, `<`, `<=`, `>=`, `>`.
        const COMPARISON = 128;
        /// String concatenation (`||`).
        const CONCATENATE = 256;
        /// Logical operators: `and`, `or`, `not`.
        const LOGICAL = 512;
        /// Conditional operator (`? :`).
        const CONDITIONAL = 1_024;
        /// Membership test (`in`).
        const IN = 2_048;
        /// Member access (`.`).
        const MEMBER_ACCESS = 4_096;
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::all().difference(Self::IN)
    }
}

impl Features {
    /// Returns the flag for the specified capability name, such as `add` or `logical`.
    pub fn from_capability(name: &str) -> Option<Self> {
        Some(match name {
            "add" => Self::ADD,
            "subtract" => Self::SUBTRACT,
            "multiply" => Self::MULTIPLY,
            "divide" => Self::DIVIDE,
            "remainder" => Self::REMAINDER,
            "power" => Self::POWER,
            "factorial" => Self::FACTORIAL,
            "comparison" => Self::COMPARISON,
            "concatenate" => Self::CONCATENATE,
            "logical" => Self::LOGICAL,
            "conditional" => Self::CONDITIONAL,
            "in" => Self::IN,
            _ => return None,
        })
    }

    /// Returns the capability flag guarding the operator with the specified text. Operators
    /// without a fixed capability (e.g., `sin`) return `None`.
    pub fn for_operator(op: &str) -> Option<Self> {
        Some(match op {
            "+" => Self::ADD,
            "-" => Self::SUBTRACT,
            "*" => Self::MULTIPLY,
            "/" => Self::DIVIDE,
            "%" => Self::REMAINDER,
            "^" => Self::POWER,
            "!" => Self::FACTORIAL,
            "<" | ">" | "<=" | ">=" | "==" | "!=" => Self::COMPARISON,
            "||" => Self::CONCATENATE,
            "and" | "or" | "not" => Self::LOGICAL,
            "?" | ":" => Self::CONDITIONAL,
            "in" => Self::IN,
            _ => return None,
        })
    }
}

/// Options influencing tokenization and parsing.
///
/// By default, all operators except for `in` are enabled, and member access is allowed.
///
/// # Examples
///
/// ```
/// # use formula_parser::grammars::ParseOptions;
/// let mut options = ParseOptions::default().with_operator("in", true);
/// options.set_operator("sin", false).set_operator("comparison", false);
/// assert!(options.is_operator_enabled("in"));
/// assert!(!options.is_operator_enabled("sin"));
/// assert!(!options.is_operator_enabled("<="));
/// assert!(options.is_operator_enabled("cos"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    features: Features,
    disabled_ops: BTreeSet<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(Features::default())
    }
}

impl ParseOptions {
    /// Creates options with the specified features.
    pub fn new(features: Features) -> Self {
        Self {
            features,
            disabled_ops: BTreeSet::new(),
        }
    }

    /// Returns enabled features.
    pub fn features(&self) -> Features {
        self.features
    }

    /// Switches member access on or off.
    #[must_use]
    pub fn with_member_access(mut self, allow: bool) -> Self {
        self.features.set(Features::MEMBER_ACCESS, allow);
        self
    }

    /// Checks whether member access (`.`) is allowed.
    pub fn allows_member_access(&self) -> bool {
        self.features.contains(Features::MEMBER_ACCESS)
    }

    /// Enables or disables an operator capability. `name` is either one of capability
    /// names recognized by [`Features::from_capability()`], or the name of an operator.
    pub fn set_operator(&mut self, name: &str, enabled: bool) -> &mut Self {
        if let Some(feature) = Features::from_capability(name) {
            self.features.set(feature, enabled);
        } else if enabled {
            self.disabled_ops.remove(name);
        } else {
            self.disabled_ops.insert(name.to_owned());
        }
        self
    }

    /// Enables or disables an operator capability, consuming and returning the options.
    #[must_use]
    pub fn with_operator(mut self, name: &str, enabled: bool) -> Self {
        self.set_operator(name, enabled);
        self
    }

    /// Checks whether an operator with the specified text is enabled.
    pub fn is_operator_enabled(&self, op: &str) -> bool {
        let capability_enabled =
            Features::for_operator(op).map_or(true, |feature| self.features.contains(feature));
        capability_enabled && !self.disabled_ops.contains(op)
    }
}
