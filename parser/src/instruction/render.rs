//! Rendering instruction streams in the infix form.

use super::{Instruction, InstructionStream};
use crate::{
    alloc::{format, String, ToString, Vec},
    spans::escape_string,
    OpPriority,
};

/// Rendered operand together with its priority.
#[derive(Debug)]
struct Rendered {
    code: String,
    priority: OpPriority,
    // Non-negative number literals need parentheses before `.`, so that the dot
    // is not parsed as a decimal point.
    is_number: bool,
}

impl Rendered {
    fn new(code: String, priority: OpPriority) -> Self {
        Self {
            code,
            priority,
            is_number: false,
        }
    }

    fn atom(code: String) -> Self {
        Self::new(code, OpPriority::Atom)
    }

    fn number(value: f64) -> Self {
        if value.is_nan() {
            Self::atom("(0/0)".into())
        } else if value.is_infinite() {
            // `1e999` overflows to infinity when parsed.
            if value > 0.0 {
                Self {
                    code: "1e999".into(),
                    priority: OpPriority::Atom,
                    is_number: true,
                }
            } else {
                Self::new("-1e999".into(), OpPriority::Prefix)
            }
        } else if value.is_sign_negative() {
            Self::new(value.to_string(), OpPriority::Prefix)
        } else {
            Self {
                code: value.to_string(),
                priority: OpPriority::Atom,
                is_number: true,
            }
        }
    }

    fn with_min_priority(self, min_priority: OpPriority) -> String {
        if self.priority < min_priority {
            format!("({})", self.code)
        } else {
            self.code
        }
    }
}

fn pop(stack: &mut Vec<Rendered>) -> Rendered {
    // Malformed streams are rendered on the best-effort basis.
    stack.pop().unwrap_or_else(|| Rendered::atom(String::new()))
}

fn render_unary(op: &str, operand: Rendered) -> Rendered {
    match op {
        "-" | "+" => {
            let operand = operand.with_min_priority(OpPriority::Prefix);
            Rendered::new(format!("{}{}", op, operand), OpPriority::Prefix)
        }
        "!" => {
            let operand = operand.with_min_priority(OpPriority::Postfix);
            Rendered::new(format!("{}!", operand), OpPriority::Postfix)
        }
        _ => Rendered::new(format!("{}({})", op, operand.code), OpPriority::Postfix),
    }
}

fn render_binary(op: &str, lhs: Rendered, rhs: Rendered) -> Rendered {
    let (priority, lhs_priority, rhs_priority) = OpPriority::for_binary_op(op);
    let lhs = lhs.with_min_priority(lhs_priority);
    let rhs = rhs.with_min_priority(rhs_priority);
    Rendered::new(format!("{} {} {}", lhs, op, rhs), priority)
}

fn render_ternary(op: &str, first: Rendered, second: Rendered, third: Rendered) -> Rendered {
    if op == "?" {
        let condition = first.with_min_priority(OpPriority::Or);
        let code = format!("{} ? {} : {}", condition, second.code, third.code);
        Rendered::new(code, OpPriority::Conditional)
    } else {
        let code = format!("{}({}, {}, {})", op, first.code, second.code, third.code);
        Rendered::new(code, OpPriority::Call)
    }
}

fn render_entry(stream: &InstructionStream) -> Rendered {
    let mut stack = Vec::<Rendered>::new();
    for instruction in stream {
        let rendered = match instruction {
            Instruction::Number(value) => Rendered::number(*value),
            Instruction::Str(value) => Rendered::atom(escape_string(value)),
            Instruction::Variable(name) => Rendered::atom(name.clone()),
            Instruction::UnaryOp(op) => render_unary(op, pop(&mut stack)),
            Instruction::BinaryOp(op) => {
                let rhs = pop(&mut stack);
                let lhs = pop(&mut stack);
                render_binary(op, lhs, rhs)
            }
            Instruction::TernaryOp(op) => {
                let third = pop(&mut stack);
                let second = pop(&mut stack);
                let first = pop(&mut stack);
                render_ternary(op, first, second, third)
            }
            Instruction::FunctionCall(arg_count) => {
                let args = stack.split_off(stack.len().saturating_sub(*arg_count));
                let args: Vec<_> = args.into_iter().map(|arg| arg.code).collect();
                let callee = pop(&mut stack).with_min_priority(OpPriority::Call);
                Rendered::new(format!("{}({})", callee, args.join(", ")), OpPriority::Call)
            }
            Instruction::MemberAccess(field) => {
                let base = pop(&mut stack);
                let base = if base.is_number {
                    format!("({})", base.code)
                } else {
                    base.with_min_priority(OpPriority::Member)
                };
                Rendered::new(format!("{}.{}", base, field), OpPriority::Member)
            }
            Instruction::SubExpression(body) => render_entry(body),
        };
        stack.push(rendered);
    }

    if stack.len() > 1 {
        let parts: Vec<_> = stack.into_iter().map(|entry| entry.code).collect();
        Rendered::new(parts.join(", "), OpPriority::Conditional)
    } else {
        pop(&mut stack)
    }
}

pub(super) fn render(stream: &InstructionStream) -> String {
    render_entry(stream).code
}
