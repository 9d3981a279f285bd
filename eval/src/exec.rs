//! Stack-based evaluation of instruction streams.

use formula_parser::{Instruction, InstructionStream};

use crate::{error::OpKind, Environment, EvalError, EvalResult, Value, VariableMap};

/// Evaluates an instruction stream in the specified environment.
///
/// Branches of the conditional operator and right-hand operands of `and` / `or` are evaluated
/// only if they are necessary to get the result. Accessing a missing field (or a field
/// of a non-record value) results in [`Value::Void`] rather than an error.
///
/// # Errors
///
/// Returns an error if a variable or operator cannot be resolved, a called value is not
/// a function, a native function fails, or the stream is not stack-balanced.
pub fn evaluate(
    stream: &InstructionStream,
    env: &Environment,
    vars: &dyn VariableMap,
) -> EvalResult {
    Evaluator { env, vars }.evaluate(stream)
}

pub(crate) fn apply_unary(env: &Environment, op: &str, operand: Value) -> EvalResult {
    env.resolve_op(OpKind::Unary, op)?.call(vec![operand])
}

pub(crate) fn apply_binary(env: &Environment, op: &str, lhs: Value, rhs: Value) -> EvalResult {
    match op {
        "and" => Ok(Value::from(lhs.is_truthy() && rhs.is_truthy())),
        "or" => Ok(Value::from(lhs.is_truthy() || rhs.is_truthy())),
        _ => env.resolve_op(OpKind::Binary, op)?.call(vec![lhs, rhs]),
    }
}

pub(crate) fn apply_ternary(
    env: &Environment,
    op: &str,
    first: Value,
    second: Value,
    third: Value,
) -> EvalResult {
    if op == "?" {
        Ok(if first.is_truthy() { second } else { third })
    } else {
        env.resolve_op(OpKind::Ternary, op)?
            .call(vec![first, second, third])
    }
}

pub(crate) fn call(callee: Value, args: Vec<Value>) -> EvalResult {
    match callee {
        Value::Function(function) => function.call(args),
        _ => Err(EvalError::CannotCall),
    }
}

/// Value on the evaluation stack.
#[derive(Debug)]
enum StackItem<'s> {
    Value(Value),
    /// Sub-expression that is evaluated only when its value is needed.
    Lazy(&'s InstructionStream),
}

#[derive(Clone, Copy)]
struct Evaluator<'r> {
    env: &'r Environment,
    vars: &'r dyn VariableMap,
}

impl Evaluator<'_> {
    fn evaluate(self, stream: &InstructionStream) -> EvalResult {
        let mut stack = Vec::new();
        for instruction in stream {
            self.execute(instruction, &mut stack)?;
        }

        let len = stack.len();
        match stack.pop() {
            Some(item) if len == 1 => self.resolve(item),
            _ => Err(EvalError::InvalidStream(format!(
                "evaluation should leave exactly 1 value on stack, but left {len}"
            ))),
        }
    }

    fn resolve(self, item: StackItem<'_>) -> EvalResult {
        match item {
            StackItem::Value(value) => Ok(value),
            StackItem::Lazy(stream) => self.evaluate(stream),
        }
    }

    fn pop<'s>(stack: &mut Vec<StackItem<'s>>) -> Result<StackItem<'s>, EvalError> {
        stack
            .pop()
            .ok_or_else(|| EvalError::InvalidStream("stack underflow".to_owned()))
    }

    fn pop_value(self, stack: &mut Vec<StackItem<'_>>) -> EvalResult {
        let item = Self::pop(stack)?;
        self.resolve(item)
    }

    fn execute<'s>(
        self,
        instruction: &'s Instruction,
        stack: &mut Vec<StackItem<'s>>,
    ) -> Result<(), EvalError> {
        let value = match instruction {
            Instruction::Number(number) => Value::Number(*number),
            Instruction::Str(string) => Value::Str(string.clone()),
            Instruction::Variable(name) => self
                .env
                .resolve_name(name, self.vars)
                .ok_or_else(|| EvalError::Undefined(name.clone()))?,

            Instruction::UnaryOp(op) => {
                let operand = self.pop_value(stack)?;
                apply_unary(self.env, op, operand)?
            }
            Instruction::BinaryOp(op) => {
                let rhs = Self::pop(stack)?;
                let lhs = self.pop_value(stack)?;
                match op.as_str() {
                    "and" if !lhs.is_truthy() => Value::from(false),
                    "or" if lhs.is_truthy() => Value::from(true),
                    "and" | "or" => Value::from(self.resolve(rhs)?.is_truthy()),
                    _ => apply_binary(self.env, op, lhs, self.resolve(rhs)?)?,
                }
            }
            Instruction::TernaryOp(op) => {
                let third = Self::pop(stack)?;
                let second = Self::pop(stack)?;
                let first = self.pop_value(stack)?;
                if op == "?" {
                    let branch = if first.is_truthy() { second } else { third };
                    self.resolve(branch)?
                } else {
                    let second = self.resolve(second)?;
                    let third = self.resolve(third)?;
                    apply_ternary(self.env, op, first, second, third)?
                }
            }

            Instruction::FunctionCall(arg_count) => {
                if stack.len() <= *arg_count {
                    return Err(EvalError::InvalidStream("stack underflow".to_owned()));
                }
                let args = stack.split_off(stack.len() - arg_count);
                let args = args
                    .into_iter()
                    .map(|arg| self.resolve(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let callee = self.pop_value(stack)?;
                call(callee, args)?
            }
            Instruction::MemberAccess(field) => self.pop_value(stack)?.field(field),

            Instruction::SubExpression(body) => {
                stack.push(StackItem::Lazy(body));
                return Ok(());
            }
        };

        stack.push(StackItem::Value(value));
        Ok(())
    }
}
