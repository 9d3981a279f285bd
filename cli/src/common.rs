//! Common utils: parsing expressions with diagnostics.

use codespan::{FileId, Files};
use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    term::termcolor::{ColorChoice, StandardStream},
    term::{emit, Config as ReportingConfig},
};

use std::{io, ops::Range};

use formula_eval::{Environment, EvalError, Expression};

/// Exit code on parsing or evaluation error.
pub const ERROR_EXIT_CODE: i32 = 2;

/// Source of a code snippet.
#[derive(Debug, Clone, Copy)]
pub enum Snippet<'a> {
    /// Main expression.
    Main,
    /// Replacement for a variable.
    Substitution(&'a str),
}

/// Registers code snippets and reports errors in them.
pub struct Reporter {
    files: Files<String>,
    main_file: Option<FileId>,
    writer: StandardStream,
    config: ReportingConfig,
}

impl Reporter {
    pub fn new(color_choice: ColorChoice) -> Self {
        Self {
            files: Files::new(),
            main_file: None,
            writer: StandardStream::stderr(color_choice),
            config: ReportingConfig::default(),
        }
    }

    /// Parses `code` in the specified environment, reporting a parsing error if one occurs.
    pub fn parse<'e>(
        &mut self,
        snippet: Snippet<'_>,
        code: &str,
        env: &'e Environment,
    ) -> io::Result<Option<Expression<'e>>> {
        let file_name = match snippet {
            Snippet::Main => "expr".to_owned(),
            Snippet::Substitution(name) => format!("subst:{name}"),
        };
        let file = self.files.add(file_name, code.to_owned());
        if let Snippet::Main = snippet {
            self.main_file = Some(file);
        }

        match Expression::parse(code, env) {
            Ok(expr) => {
                log::debug!("parsed `{code}` into {} instructions", expr.stream().len());
                Ok(Some(expr))
            }
            Err(err) => {
                let range = self.clamp_range(file, err.range());
                let label = Label::primary(file, range).with_message("Error occurred here");
                let code = if err.is_lex_error() { "LEX" } else { "PARSE" };
                let diagnostic = Diagnostic::error()
                    .with_message(err.kind().to_string())
                    .with_code(code)
                    .with_labels(vec![label]);
                self.emit(&diagnostic)?;
                Ok(None)
            }
        }
    }

    /// Reports an evaluation error. Instruction streams do not retain spans, so the error
    /// is attributed to the entire main expression.
    pub fn report_eval_error(&mut self, err: &EvalError) -> io::Result<()> {
        let mut diagnostic = Diagnostic::error()
            .with_message(err.to_string())
            .with_code("EVAL");

        if let Some(file) = self.main_file {
            let range = 0..self.files.source(file).trim_end().len();
            let label =
                Label::primary(file, range).with_message("Error evaluating this expression");
            diagnostic = diagnostic.with_labels(vec![label]);
        }
        if let EvalError::Undefined(name) = err {
            let note = format!("Use `--var {name}=<value>` to define the variable");
            diagnostic = diagnostic.with_notes(vec![note]);
        }
        self.emit(&diagnostic)
    }

    fn clamp_range(&self, file: FileId, range: Range<usize>) -> Range<usize> {
        let len = self.files.source(file).len();
        range.start.min(len)..range.end.min(len)
    }

    fn emit(&self, diagnostic: &Diagnostic<FileId>) -> io::Result<()> {
        emit(&mut self.writer.lock(), &self.config, &self.files, diagnostic)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}
