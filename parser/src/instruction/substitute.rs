//! Variable substitution.

use super::{Instruction, InstructionStream};

pub(super) fn substitute(
    stream: &InstructionStream,
    name: &str,
    replacement: &InstructionStream,
) -> InstructionStream {
    let mut output = InstructionStream::new();
    for instruction in stream {
        match instruction {
            Instruction::Variable(var) if var == name => {
                output.extend(replacement.iter().cloned());
            }
            Instruction::SubExpression(body) => {
                let body = substitute(body, name, replacement);
                output.push(Instruction::SubExpression(body));
            }
            other => output.push(other.clone()),
        }
    }
    output
}
