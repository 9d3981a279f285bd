//! Operation priorities.

/// Priority of an operation, from the lowest to the highest.
///
/// Priorities are used when rendering instruction streams back into infix form: an operand
/// is parenthesized if its priority is lower than the one required by the enclosing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum OpPriority {
    /// Conditional operator (`? :`).
    Conditional,
    /// Logical OR (`or`).
    Or,
    /// Logical AND (`and`).
    And,
    /// Comparisons: `==`, `!=`, `>`, `<`, `>=`, `<=`, and membership test `in`.
    Comparison,
    /// Addition, subtraction or concatenation: `+`, `-` or `||`.
    AddOrSub,
    /// Multiplication, division or remainder: `*`, `/` or `%`.
    MulOrDiv,
    /// Prefix operators, such as unary `-` or `not`.
    Prefix,
    /// Power (`^`).
    Power,
    /// Postfix factorial (`!`) and named unary operators applied with call syntax.
    Postfix,
    /// Function call.
    Call,
    /// Member access.
    Member,
    /// Atomic expressions: literals, variables and parenthesized expressions.
    Atom,
}

impl OpPriority {
    /// Returns the maximum priority.
    pub const fn max_priority() -> Self {
        Self::Atom
    }

    /// Returns the priority of a binary operator together with the minimum priorities
    /// of its left-hand and right-hand operands.
    pub(crate) fn for_binary_op(op: &str) -> (Self, Self, Self) {
        match op {
            "^" => (Self::Power, Self::Postfix, Self::Prefix),
            "*" | "/" | "%" => (Self::MulOrDiv, Self::MulOrDiv, Self::Prefix),
            "+" | "-" | "||" => (Self::AddOrSub, Self::AddOrSub, Self::MulOrDiv),
            "and" => (Self::And, Self::And, Self::Comparison),
            "or" => (Self::Or, Self::Or, Self::And),
            _ => (Self::Comparison, Self::Comparison, Self::AddOrSub),
        }
    }
}

/// Comparison operators.
pub(crate) const COMPARISON_OPS: &[&str] = &["==", "!=", "<", "<=", ">=", ">", "in"];
/// Additive operators.
pub(crate) const ADDITIVE_OPS: &[&str] = &["+", "-", "||"];
/// Multiplicative operators.
pub(crate) const MULTIPLICATIVE_OPS: &[&str] = &["*", "/", "%"];
