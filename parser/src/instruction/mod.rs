//! Instructions and instruction streams.

use core::{fmt, ops, slice};

use crate::{
    alloc::{String, Vec},
    ParseOptions,
};

mod render;
mod substitute;
mod symbols;

pub use self::symbols::SymbolOptions;

/// Literal value: a number or a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Number.
    Number(f64),
    /// String.
    Str(String),
}

impl Literal {
    /// Checks whether the rendered form of this literal can be parsed back with
    /// the specified options. Negative numbers are rendered with the prefix `-`,
    /// and NaN as `(0/0)`, so they require the corresponding operators.
    pub fn is_renderable(&self, options: &ParseOptions) -> bool {
        match self {
            Self::Number(number) if number.is_nan() => options.is_operator_enabled("/"),
            Self::Number(number) if number.is_sign_negative() => {
                options.is_operator_enabled("-")
            }
            Self::Number(_) | Self::Str(_) => true,
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<Literal> for Instruction {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(number) => Self::Number(number),
            Literal::Str(string) => Self::Str(string),
        }
    }
}

/// Single instruction in an [`InstructionStream`].
///
/// Operators are identified by their names; names are resolved to implementations
/// only when the stream is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Pushes a number.
    Number(f64),
    /// Pushes a string.
    Str(String),
    /// Pushes the value of a variable, constant or function.
    Variable(String),
    /// Pops a value and pushes the result of applying a unary operator to it.
    UnaryOp(String),
    /// Pops 2 values and pushes the result of applying a binary operator to them.
    /// For `and` / `or` operators, the right-hand operand is a [`Self::SubExpression`].
    BinaryOp(String),
    /// Pops 3 values and pushes the result of applying a ternary operator to them.
    /// For the conditional operator `?`, both branches are [`Self::SubExpression`]s.
    TernaryOp(String),
    /// Pops the specified number of arguments and then the called function, and pushes
    /// the call result.
    FunctionCall(usize),
    /// Pops a value and pushes its field with the specified name.
    MemberAccess(String),
    /// Pushes a lazily evaluated expression. Sub-expressions hold branches
    /// of the short-circuiting operators.
    SubExpression(InstructionStream),
}

impl Instruction {
    /// Returns the literal pushed by this instruction, if any.
    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            Self::Number(number) => Some(Literal::Number(*number)),
            Self::Str(string) => Some(Literal::Str(string.clone())),
            _ => None,
        }
    }
}

/// Sequence of [`Instruction`]s in the postfix (stack machine) order.
///
/// Streams produced by the parser are *stack-balanced*: each instruction finds
/// the necessary number of operands on the stack, and evaluating the stream leaves exactly
/// one value on the stack. The transformations provided by this type preserve this property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
}

impl InstructionStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction to the end of this stream.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Returns the literal value if this stream consists of a single literal.
    pub fn as_literal(&self) -> Option<Literal> {
        match self.instructions.as_slice() {
            [instruction] => instruction.as_literal(),
            _ => None,
        }
    }

    /// Replaces every reference to the variable `name` with a copy of `replacement`,
    /// including references in sub-expressions.
    ///
    /// Substitution is single-pass and does not avoid capturing: if `replacement` refers
    /// to `name` itself, these references are left as is.
    pub fn substitute(&self, name: &str, replacement: &Self) -> Self {
        substitute::substitute(self, name, replacement)
    }

    /// Collects names referenced in this stream, including the nested sub-expressions.
    /// The names are unique and are listed in the order of their first occurrence.
    pub fn symbols(&self, options: SymbolOptions) -> Vec<String> {
        let mut symbols = Vec::new();
        symbols::collect(self, options, &mut symbols);
        symbols
    }

    /// Renders this stream in the infix form. The output can be parsed back into an equivalent
    /// stream; parentheses are only inserted where they are necessary.
    pub fn render(&self) -> String {
        render::render(self)
    }

    /// Unwraps this stream into the underlying instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl ops::Deref for InstructionStream {
    type Target = [Instruction];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}

impl From<Vec<Instruction>> for InstructionStream {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl FromIterator<Instruction> for InstructionStream {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Instruction> for InstructionStream {
    fn extend<I: IntoIterator<Item = Instruction>>(&mut self, iter: I) {
        self.instructions.extend(iter);
    }
}

impl IntoIterator for InstructionStream {
    type Item = Instruction;
    type IntoIter = crate::alloc::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

impl<'a> IntoIterator for &'a InstructionStream {
    type Item = &'a Instruction;
    type IntoIter = slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl fmt::Display for InstructionStream {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.render())
    }
}
