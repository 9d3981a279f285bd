//! Constant folding for instruction streams.

use core::iter;

use formula_parser::{Instruction, InstructionStream, ParseOptions};

use crate::{
    exec::{apply_binary, apply_ternary, apply_unary},
    Environment, EvalResult, Value, VariableMap,
};

/// Operand on the simulated stack: instructions computing it and its value if it is
/// fully determined by the known variables.
#[derive(Debug)]
struct Operand {
    instructions: Vec<Instruction>,
    value: Option<Value>,
}

impl Operand {
    fn unknown(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            value: None,
        }
    }

    /// Creates a determined operand. If the value has a literal representation that can be
    /// parsed back with `options`, it replaces the computing instructions; otherwise,
    /// the instructions are retained.
    fn known(value: Value, instructions: Vec<Instruction>, options: &ParseOptions) -> Self {
        let literal = value
            .to_literal()
            .filter(|literal| literal.is_renderable(options));
        let instructions = literal.map_or(instructions, |literal| vec![literal.into()]);
        Self {
            instructions,
            value: Some(value),
        }
    }
}

/// Simplifies an instruction stream by folding constant subexpressions.
///
/// Variables are resolved the same way as during evaluation, with `known` variables
/// playing the role of variable values. An operator is replaced with its result if all its
/// operands are determined; otherwise, the operator and its (possibly simplified) operands
/// are retained. Branches of short-circuiting operators are simplified separately, and
/// the operator itself is folded only if the condition and *all* branches are determined.
/// Function calls are never folded.
///
/// Simplification is idempotent, and simplifying a stream with all variables known produces
/// a single literal equal to the evaluation result (provided that the result is a number
/// or a string).
///
/// Folded values are kept reparsable with the environment options: e.g., if subtraction
/// is disabled, a negative value is not folded into a literal since it would be rendered
/// with the prefix `-`.
pub fn simplify(
    stream: &InstructionStream,
    env: &Environment,
    known: &dyn VariableMap,
) -> InstructionStream {
    simplify_with_options(stream, env, env.options(), known)
}

pub(crate) fn simplify_with_options(
    stream: &InstructionStream,
    env: &Environment,
    options: &ParseOptions,
    known: &dyn VariableMap,
) -> InstructionStream {
    Simplifier {
        env,
        options,
        known,
    }
    .simplify(stream)
}

#[derive(Clone, Copy)]
struct Simplifier<'r> {
    env: &'r Environment,
    options: &'r ParseOptions,
    known: &'r dyn VariableMap,
}

impl Simplifier<'_> {
    fn simplify(self, stream: &InstructionStream) -> InstructionStream {
        let mut stack = Vec::new();
        for instruction in stream {
            let operand = self.step(instruction, &mut stack);
            stack.push(operand);
        }
        stack
            .into_iter()
            .flat_map(|operand| operand.instructions)
            .collect()
    }

    fn step(self, instruction: &Instruction, stack: &mut Vec<Operand>) -> Operand {
        match instruction {
            Instruction::Number(number) => self.known(Value::Number(*number), instruction),
            Instruction::Str(string) => self.known(Value::Str(string.clone()), instruction),
            Instruction::Variable(name) => match self.env.resolve_name(name, self.known) {
                Some(value) => self.known(value, instruction),
                None => Operand::unknown(vec![instruction.clone()]),
            },

            Instruction::UnaryOp(op) => self.fold(stack, 1, instruction, |args| {
                let [x] = unpack(args);
                apply_unary(self.env, op, x)
            }),
            Instruction::BinaryOp(op) => self.fold(stack, 2, instruction, |args| {
                let [x, y] = unpack(args);
                apply_binary(self.env, op, x, y)
            }),
            Instruction::TernaryOp(op) => self.fold(stack, 3, instruction, |args| {
                let [x, y, z] = unpack(args);
                apply_ternary(self.env, op, x, y, z)
            }),
            Instruction::MemberAccess(field) => self.fold(stack, 1, instruction, |args| {
                let [x] = unpack(args);
                Ok(x.field(field))
            }),

            Instruction::FunctionCall(arg_count) => {
                let operands = stack.split_off(stack.len().saturating_sub(arg_count + 1));
                Operand::unknown(Self::concat(operands, instruction))
            }
            Instruction::SubExpression(body) => {
                let body = self.simplify(body);
                let value = body.as_literal().map(Value::from);
                Operand {
                    instructions: vec![Instruction::SubExpression(body)],
                    value,
                }
            }
        }
    }

    fn known(self, value: Value, instruction: &Instruction) -> Operand {
        Operand::known(value, vec![instruction.clone()], self.options)
    }

    fn concat(operands: Vec<Operand>, instruction: &Instruction) -> Vec<Instruction> {
        operands
            .into_iter()
            .flat_map(|operand| operand.instructions)
            .chain(iter::once(instruction.clone()))
            .collect()
    }

    fn fold(
        self,
        stack: &mut Vec<Operand>,
        arity: usize,
        instruction: &Instruction,
        apply: impl FnOnce(Vec<Value>) -> EvalResult,
    ) -> Operand {
        let operands = stack.split_off(stack.len().saturating_sub(arity));
        let values = if operands.len() == arity {
            operands.iter().map(|operand| operand.value.clone()).collect()
        } else {
            None
        };

        let Some(values) = values else {
            return Operand::unknown(Self::concat(operands, instruction));
        };
        match apply(values) {
            Ok(value) => Operand::known(value, Self::concat(operands, instruction), self.options),
            Err(err) => {
                log::debug!("cannot fold {instruction:?}, deferring it to evaluation: {err}");
                Operand::unknown(Self::concat(operands, instruction))
            }
        }
    }
}

/// Unpacks values for a fold; the number of values is checked by the caller.
fn unpack<const N: usize>(values: Vec<Value>) -> [Value; N] {
    let mut values = values.into_iter();
    [(); N].map(|()| values.next().unwrap_or(Value::Void))
}

#[cfg(test)]
mod tests {
    use formula_parser::parse;

    use super::*;
    use crate::Bindings;

    fn parse_std(code: &str, env: &Environment) -> InstructionStream {
        parse(code, env, env.options()).unwrap()
    }

    fn simplified(code: &str, known: &Bindings) -> String {
        let env = Environment::standard();
        simplify(&parse_std(code, &env), &env, known).to_string()
    }

    #[test]
    fn folding_constants() {
        let no_vars = Bindings::new();
        assert_eq!(simplified("x + 2 * 3", &no_vars), "x + 6");
        assert_eq!(simplified("2 * 3", &no_vars), "6");
        assert_eq!(simplified("-(1 + 2) * x ^ (4 / 2)", &no_vars), "-3 * x ^ 2");
        assert_eq!(simplified("'a' || (1 + 1) || x", &no_vars), "\"a2\" || x");
        assert_eq!(simplified("sin(PI / 2) + x", &no_vars), "1 + x");
        assert_eq!(simplified("x + 2 + 3", &no_vars), "x + 2 + 3");
    }

    #[test]
    fn folding_with_known_variables() {
        let known = Bindings::new().with("x", 3.0).with("s", "str");
        assert_eq!(simplified("x * y + x", &known), "3 * y + 3");
        assert_eq!(simplified("length(s) * x", &known), "9");
        assert_eq!(simplified("x > 2 ? y : 0", &known), "1 ? y : 0");
    }

    #[test]
    fn short_circuit_structure_is_preserved() {
        let known = Bindings::new().with("x", 1.0);
        assert_eq!(simplified("x ? 2 + 3 : y", &known), "1 ? 5 : y");
        assert_eq!(simplified("y ? 2 + 3 : x", &known), "y ? 5 : 1");
        assert_eq!(simplified("x ? 2 : 3 * x", &known), "2");
        assert_eq!(simplified("x and 0", &known), "0");
        assert_eq!(simplified("x or y", &known), "1 or y");
        assert_eq!(simplified("y and 1 + 1", &known), "y and 2");
    }

    #[test]
    fn function_calls_are_not_folded() {
        let no_vars = Bindings::new();
        assert_eq!(simplified("max(1, 2 + 3)", &no_vars), "max(1, 5)");
        assert_eq!(simplified("random() * (1 + 1)", &no_vars), "random() * 2");
    }

    #[test]
    fn folding_members() {
        let env = Environment::standard();
        let known = Bindings::new().with("point", Value::record([("x", 2.0), ("y", -1.0)]));
        let stream = parse_std("point.x * z + point.y + point.w", &env);
        let simplified = simplify(&stream, &env, &known);
        assert_eq!(simplified.to_string(), "2 * z + -1 + point.w");
    }

    #[test]
    fn folded_values_are_reparsable() {
        let options = ParseOptions::default()
            .with_operator("subtract", false)
            .with_operator("divide", false);
        let env = Environment::standard().with_options(options);
        let known = Bindings::new().with("y", -1.0);

        let stream = parse_std("x * y + 2 % 0", &env);
        let simplified = simplify(&stream, &env, &known);
        assert_eq!(simplified.to_string(), "x * y + 2 % 0");
        let simplified = simplify(&parse_std("y * y + 1", &env), &env, &known);
        assert_eq!(simplified.to_string(), "2");

        let env = Environment::standard();
        let stream = parse_std("x * y + 2 % 0", &env);
        let simplified = simplify(&stream, &env, &known);
        assert_eq!(simplified.to_string(), "x * -1 + (0/0)");
    }

    #[test]
    fn fold_failures_are_deferred() {
        let env = Environment::standard();
        let stream: InstructionStream = vec![
            Instruction::Number(1.0),
            Instruction::Number(2.0),
            Instruction::BinaryOp("**".into()),
            Instruction::Variable("x".into()),
            Instruction::BinaryOp("+".into()),
        ]
        .into();
        let simplified = simplify(&stream, &env, &Bindings::new());
        assert_eq!(simplified, stream);
    }

    #[test]
    fn simplification_is_idempotent() {
        let env = Environment::standard();
        let known = Bindings::new().with("a", 2.0);
        let samples = [
            "x + 2 * 3",
            "a * b + a ^ 2",
            "a > 1 ? b + 1 + 1 : c or d and 2 > 1",
            "f(a + 1, b.field) * (2 - a)",
            "not (a == 2) ? 'yes' : 'no'",
        ];
        for code in samples {
            let once = simplify(&parse_std(code, &env), &env, &known);
            let twice = simplify(&once, &env, &known);
            assert_eq!(once, twice, "{code}");
        }
    }

    #[test]
    fn full_simplification_matches_evaluation() {
        let env = Environment::standard();
        let vars = Bindings::new().with("x", 1.5).with("y", "str");
        let samples = [
            "x * 2 + 1",
            "x > 1 ? y || '!' : 0",
            "length(y) + round(x)",
            "y == 'str' and x < 2",
            "x!",
        ];
        for code in samples {
            let stream = parse_std(code, &env);
            let expected = crate::evaluate(&stream, &env, &vars).unwrap();
            let simplified = simplify(&stream, &env, &vars);
            assert_eq!(simplified.as_literal().map(Value::from), Some(expected), "{code}");
        }
    }
}
