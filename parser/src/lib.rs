//! Lexer and parser for formula expressions producing a flat postfix instruction stream.
//!
//! The parsed language is a small expression language similar to spreadsheet formulas:
//! there are no statements, assignments or user-defined functions. An expression is compiled
//! into an [`InstructionStream`]: a sequence of [`Instruction`]s in the stack-machine order.
//! The only exception to the flat representation are the lazily evaluated branches
//! of conditional (`?:`), `and` and `or` expressions; each branch is stored as a nested stream
//! within a single [`Instruction::SubExpression`].
//!
//! # Supported syntax
//!
//! - **Literals.** Decimal numbers with an optional exponent (`1`, `.5`, `2.5e-3`),
//!   hexadecimal and binary integers (`0x1F`, `0b101`), and string literals delimited
//!   by `'` or `"` with JSON-like escapes (`"line\nbreak"`, `'é'`).
//! - **Variables** and **constants**. Constants are resolved by the lexer via the [`Grammar`].
//! - `/* .. */` **comments**.
//! - **Operators**, from the lowest priority to the highest: conditional `?:`, `or`, `and`,
//!   comparisons (`==`, `!=`, `<`, `<=`, `>=`, `>`, `in`), `+` / `-` / `||`, `*` / `/` / `%`,
//!   prefix operators (`-x`, `not x`, `sqrt x`), power `^` (right-associative),
//!   postfix factorial `!`.
//! - **Function calls** (`max(1, x)`, `f()()`) and **member access** (`point.x`).
//!
//! Named unary operators may be applied both with and without call syntax: `sin x` and `sin(x)`
//! are equivalent.
//!
//! Which operators and constants are recognized is defined by a [`Grammar`], while
//! [`ParseOptions`] switch individual operators and member access on or off.
//!
//! # Crate features
//!
//! - `std`. Enables support of types from `std`, such as the `Error` trait, and propagates
//!   to dependencies. Without this feature, the crate only requires `alloc`.
//!
//! # Examples
//!
//! ```
//! # use assert_matches::assert_matches;
//! use formula_parser::{grammars::{ParseOptions, Standard}, parse, Instruction};
//!
//! # fn main() -> anyhow::Result<()> {
//! let stream = parse("2 + x * 3", &Standard, &ParseOptions::default())?;
//! assert_eq!(stream.len(), 5);
//! assert_matches!(stream[1], Instruction::Variable(ref name) if name == "x");
//! assert_matches!(stream[4], Instruction::BinaryOp(ref op) if op == "+");
//! // Streams can be rendered back into a reparsable form.
//! assert_eq!(stream.to_string(), "2 + x * 3");
//!
//! // Short-circuiting branches are kept as nested streams.
//! let stream = parse("x > 0 ? x : -x", &Standard, &ParseOptions::default())?;
//! assert_matches!(stream[3], Instruction::SubExpression(_));
//! assert_matches!(stream[5], Instruction::TernaryOp(ref op) if op == "?");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

// Polyfill for `alloc` types.
mod alloc {
    #[cfg(not(feature = "std"))]
    extern crate alloc;

    #[cfg(not(feature = "std"))]
    pub use alloc::{
        borrow::ToOwned, collections::BTreeSet, format, string::String, string::ToString, vec,
        vec::Vec,
    };
    #[cfg(feature = "std")]
    pub use std::{
        borrow::ToOwned, collections::BTreeSet, format, string::String, string::ToString, vec,
        vec::Vec,
    };
}

pub use crate::{
    error::{Error, ErrorKind, Expected},
    grammars::{Grammar, ParseOptions},
    instruction::{Instruction, InstructionStream, Literal, SymbolOptions},
    lexer::{is_valid_variable_name, Checkpoint, Lexer},
    ops::OpPriority,
    parser::{parse, Parser},
    spans::{InputSpan, Location, NomResult, Spanned},
    token::{Token, TokenKind},
};

mod error;
pub mod grammars;
mod instruction;
mod lexer;
mod ops;
mod parser;
mod spans;
mod token;
