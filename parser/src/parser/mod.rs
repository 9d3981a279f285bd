//! Recursive descent parser producing instruction streams.

use core::{fmt, mem};

use crate::{
    alloc::{ToOwned, ToString},
    ops::{ADDITIVE_OPS, COMPARISON_OPS, MULTIPLICATIVE_OPS},
    Checkpoint, Error, ErrorKind, Expected, Grammar, Instruction, InstructionStream, Lexer,
    ParseOptions, Token, TokenKind,
};


/// Parses `code` into an instruction stream.
///
/// This is a shortcut for creating a [`Parser`] and calling [`Parser::parse()`].
pub fn parse(
    code: &str,
    grammar: &dyn Grammar,
    options: &ParseOptions,
) -> Result<InstructionStream, Error> {
    Parser::new(code, grammar, options)?.parse()
}

/// Parser state saved for backtracking.
#[derive(Debug, Clone)]
struct ParserCheckpoint<'a> {
    lexer: Checkpoint<'a>,
    next: Token<'a>,
}

/// Recursive descent parser with a single token of lookahead.
///
/// The operator priorities, from the lowest to the highest, are as follows: conditional `?:`
/// (right-associative), `or`, `and`, comparisons, `+` / `-` / `||`, `*` / `/` / `%`,
/// prefix operators, `^` (right-associative), postfix `!`, function calls and member access.
/// Operands of the short-circuiting operators (branches of `?:` and right-hand operands
/// of `and` / `or`) are emitted as [`Instruction::SubExpression`]s.
pub struct Parser<'a, 'g> {
    lexer: Lexer<'a, 'g>,
    grammar: &'g dyn Grammar,
    options: &'g ParseOptions,
    code: &'a str,
    next: Token<'a>,
}

impl fmt::Debug for Parser<'_, '_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Parser")
            .field("lexer", &self.lexer)
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl<'a, 'g> Parser<'a, 'g> {
    /// Creates a parser for the specified code. Fails if the first token cannot be lexed.
    pub fn new(
        code: &'a str,
        grammar: &'g dyn Grammar,
        options: &'g ParseOptions,
    ) -> Result<Self, Error> {
        let mut lexer = Lexer::new(code, grammar, options);
        let next = lexer.next_token()?;
        Ok(Self {
            lexer,
            grammar,
            options,
            code,
            next,
        })
    }

    /// Parses the entire code into an instruction stream.
    pub fn parse(mut self) -> Result<InstructionStream, Error> {
        let mut stream = InstructionStream::new();
        self.parse_expression(&mut stream)?;
        if self.next.extra != TokenKind::Eof {
            return Err(ErrorKind::Expected(Expected::End).with_span(&self.next));
        }
        log::trace!(
            "parsed `{}` into a stream of {} instructions",
            self.code,
            stream.len()
        );
        Ok(stream)
    }

    fn checkpoint(&self) -> ParserCheckpoint<'a> {
        ParserCheckpoint {
            lexer: self.lexer.checkpoint(),
            next: self.next.clone(),
        }
    }

    fn restore(&mut self, checkpoint: ParserCheckpoint<'a>) {
        self.lexer.restore(checkpoint.lexer);
        self.next = checkpoint.next;
    }

    /// Consumes the lookahead token and returns it.
    fn advance(&mut self) -> Result<Token<'a>, Error> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.next, next))
    }

    fn accept(&mut self, kind: &TokenKind<'_>) -> Result<bool, Error> {
        if self.next.extra == *kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn accept_op(&mut self, op: &str) -> Result<bool, Error> {
        self.accept(&TokenKind::Operator(op))
    }

    fn accept_any_op(&mut self, ops: &[&str]) -> Result<Option<&'a str>, Error> {
        match self.next.extra {
            TokenKind::Operator(op) if ops.contains(&op) => {
                self.advance()?;
                Ok(Some(op))
            }
            _ => Ok(None),
        }
    }

    fn expect(&mut self, kind: &TokenKind<'_>, expected: Expected) -> Result<(), Error> {
        if self.accept(kind)? {
            Ok(())
        } else {
            Err(ErrorKind::Expected(expected).with_span(&self.next))
        }
    }

    /// Returns the lookahead token if it is a prefix operator.
    fn next_prefix_op(&self) -> Option<&'a str> {
        match self.next.extra {
            TokenKind::Operator(op) if self.grammar.is_unary_op(op) => Some(op),
            _ => None,
        }
    }

    fn parse_expression(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_conditional(stream)
    }

    fn parse_conditional(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_or(stream)?;
        while self.accept_op("?")? {
            let mut true_branch = InstructionStream::new();
            let mut false_branch = InstructionStream::new();
            self.parse_conditional(&mut true_branch)?;
            self.expect(&TokenKind::Operator(":"), Expected::Colon)?;
            self.parse_conditional(&mut false_branch)?;
            stream.push(Instruction::SubExpression(true_branch));
            stream.push(Instruction::SubExpression(false_branch));
            stream.push(Instruction::TernaryOp("?".to_owned()));
        }
        Ok(())
    }

    fn parse_or(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_and(stream)?;
        while self.accept_op("or")? {
            let mut branch = InstructionStream::new();
            self.parse_and(&mut branch)?;
            stream.push(Instruction::SubExpression(branch));
            stream.push(Instruction::BinaryOp("or".to_owned()));
        }
        Ok(())
    }

    fn parse_and(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_comparison(stream)?;
        while self.accept_op("and")? {
            let mut branch = InstructionStream::new();
            self.parse_comparison(&mut branch)?;
            stream.push(Instruction::SubExpression(branch));
            stream.push(Instruction::BinaryOp("and".to_owned()));
        }
        Ok(())
    }

    fn parse_comparison(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_additive(stream)?;
        while let Some(op) = self.accept_any_op(COMPARISON_OPS)? {
            self.parse_additive(stream)?;
            stream.push(Instruction::BinaryOp(op.to_owned()));
        }
        Ok(())
    }

    fn parse_additive(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_term(stream)?;
        while let Some(op) = self.accept_any_op(ADDITIVE_OPS)? {
            self.parse_term(stream)?;
            stream.push(Instruction::BinaryOp(op.to_owned()));
        }
        Ok(())
    }

    fn parse_term(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_factor(stream)?;
        while let Some(op) = self.accept_any_op(MULTIPLICATIVE_OPS)? {
            self.parse_factor(stream)?;
            stream.push(Instruction::BinaryOp(op.to_owned()));
        }
        Ok(())
    }

    /// Parses a factor, i.e., an exponential expression optionally preceded by prefix operators.
    ///
    /// A prefix operator other than `+` / `-` immediately followed by `(` is parsed with
    /// the call syntax instead (e.g., `sin(x) ^ 2` means `(sin(x)) ^ 2`, not `sin((x) ^ 2)`).
    fn parse_factor(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        let Some(op) = self.next_prefix_op() else {
            return self.parse_exponential(stream);
        };

        let checkpoint = self.checkpoint();
        self.advance()?;
        if op != "-" && op != "+" && self.next.extra == TokenKind::LeftParen {
            self.restore(checkpoint);
            return self.parse_exponential(stream);
        }
        self.parse_factor(stream)?;
        stream.push(Instruction::UnaryOp(op.to_owned()));
        Ok(())
    }

    fn parse_exponential(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_postfix(stream)?;
        while self.accept_op("^")? {
            self.parse_factor(stream)?;
            stream.push(Instruction::BinaryOp("^".to_owned()));
        }
        Ok(())
    }

    fn parse_postfix(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_function_call(stream)?;
        while self.accept_op("!")? {
            stream.push(Instruction::UnaryOp("!".to_owned()));
        }
        Ok(())
    }

    fn parse_function_call(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        if let Some(op) = self.next_prefix_op() {
            // Unary operator applied with the call syntax, such as `sin(x)`.
            self.advance()?;
            self.parse_atom(stream)?;
            stream.push(Instruction::UnaryOp(op.to_owned()));
            return Ok(());
        }

        self.parse_member_access(stream)?;
        while self.accept(&TokenKind::LeftParen)? {
            let arg_count = self.parse_args(stream)?;
            stream.push(Instruction::FunctionCall(arg_count));
        }
        Ok(())
    }

    /// Parses comma-separated call args after the opening parenthesis.
    fn parse_args(&mut self, stream: &mut InstructionStream) -> Result<usize, Error> {
        if self.accept(&TokenKind::RightParen)? {
            return Ok(0);
        }
        let mut arg_count = 0;
        loop {
            self.parse_expression(stream)?;
            arg_count += 1;
            if !self.accept(&TokenKind::Comma)? {
                self.expect(&TokenKind::RightParen, Expected::CommaOrRightParen)?;
                return Ok(arg_count);
            }
        }
    }

    fn parse_member_access(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        self.parse_atom(stream)?;
        while self.next.extra.is_operator(".") {
            if !self.options.allows_member_access() {
                return Err(ErrorKind::MemberAccessDisabled.with_span(&self.next));
            }
            self.advance()?;

            let field = match self.next.extra {
                TokenKind::Name(name) => name,
                // Named operators are valid identifiers as well.
                TokenKind::Operator(op) if op.starts_with(char::is_alphabetic) => op,
                _ => return Err(ErrorKind::Expected(Expected::FieldName).with_span(&self.next)),
            };
            self.advance()?;
            stream.push(Instruction::MemberAccess(field.to_owned()));
        }
        Ok(())
    }

    fn parse_atom(&mut self, stream: &mut InstructionStream) -> Result<(), Error> {
        match &self.next.extra {
            TokenKind::Eof => return Err(ErrorKind::UnexpectedEnd.with_span(&self.next)),
            TokenKind::RightParen | TokenKind::Comma => {
                let token = self.next.extra.to_string();
                return Err(ErrorKind::UnexpectedToken(token).with_span(&self.next));
            }
            // Prefix operators are handled by `parse_factor()` and `parse_function_call()`.
            TokenKind::Operator(_) => {
                let token = self.next.extra.to_string();
                return Err(ErrorKind::UnexpectedToken(token).with_span(&self.next));
            }
            _ => { /* Valid start of an atom */ }
        }

        let token = self.advance()?;
        match token.extra {
            TokenKind::Name(name) => {
                stream.push(Instruction::Variable(name.to_owned()));
            }
            TokenKind::Number(number) => stream.push(Instruction::Number(number)),
            TokenKind::Str(string) => stream.push(Instruction::Str(string)),
            TokenKind::LeftParen => {
                self.parse_expression(stream)?;
                self.expect(&TokenKind::RightParen, Expected::RightParen)?;
            }
            TokenKind::Eof | TokenKind::RightParen | TokenKind::Comma | TokenKind::Operator(_) => {
                unreachable!("checked above")
            }
        }
        Ok(())
    }
}
