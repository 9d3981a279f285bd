//! Symbol collection.

use super::{Instruction, InstructionStream};
use crate::alloc::{String, Vec};

/// Options for [`InstructionStream::symbols()`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolOptions {
    with_members: bool,
}

impl SymbolOptions {
    /// Specifies whether member access chains (e.g., `point.x`) should be reported as a single
    /// dotted name instead of the name of the base variable.
    #[must_use]
    pub fn with_members(mut self, with_members: bool) -> Self {
        self.with_members = with_members;
        self
    }
}

fn push_unique(symbols: &mut Vec<String>, name: String) {
    if !symbols.contains(&name) {
        symbols.push(name);
    }
}

pub(super) fn collect(
    stream: &InstructionStream,
    options: SymbolOptions,
    symbols: &mut Vec<String>,
) {
    // Variable possibly followed by a member access chain.
    let mut pending: Option<String> = None;

    for instruction in stream {
        match instruction {
            Instruction::Variable(name) if options.with_members => {
                if let Some(prev) = pending.replace(name.clone()) {
                    push_unique(symbols, prev);
                }
            }
            Instruction::Variable(name) => push_unique(symbols, name.clone()),
            Instruction::MemberAccess(field) => {
                if let Some(path) = &mut pending {
                    path.push('.');
                    path.push_str(field);
                }
            }
            Instruction::SubExpression(body) => {
                if let Some(prev) = pending.take() {
                    push_unique(symbols, prev);
                }
                collect(body, options, symbols);
            }
            _ => {
                if let Some(prev) = pending.take() {
                    push_unique(symbols, prev);
                }
            }
        }
    }
    if let Some(prev) = pending {
        push_unique(symbols, prev);
    }
}
