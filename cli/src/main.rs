//! Simple CLI for evaluating and transforming formula expressions.

use anyhow::{ensure, format_err};
use clap::{Args as ClapArgs, Parser, Subcommand};
use codespan_reporting::term::termcolor::ColorChoice;
use log::LevelFilter;

use std::{
    io::{self, Read},
    process,
};

use formula_eval::{Bindings, Environment, Expression, Value};
use formula_parser::{is_valid_variable_name, ParseOptions, SymbolOptions};

mod common;

use crate::common::{Reporter, Snippet, ERROR_EXIT_CODE};

const ABOUT: &str = "CLI for evaluating, simplifying and rendering formula expressions.";

const AFTER_HELP: &str = "\
EXIT CODES:
    0    Normal exit
    1    Invalid command-line option
    2    Parsing or evaluation error";

#[derive(Debug, Parser)]
#[command(about = ABOUT, after_help = AFTER_HELP)]
struct Args {
    /// Increase logging verbosity. Can be specified multiple times.
    /// Logging can also be configured with the `RUST_LOG` env var.
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate the expression and output the result.
    Eval(ExprArgs),
    /// Fold constant subexpressions and output the simplified expression.
    /// Variables specified with `--var` are considered known.
    Simplify(ExprArgs),
    /// Output the expression in the normalized infix form.
    Render(ExprArgs),
    /// Output free variables of the expression, one per line.
    Vars {
        #[command(flatten)]
        args: ExprArgs,
        /// Output member access chains (e.g., `point.x`) instead of base variables.
        #[arg(long)]
        members: bool,
    },
}

#[derive(Debug, ClapArgs)]
struct ExprArgs {
    /// Variable binding in the form `name=value`. Values are parsed as numbers if possible;
    /// otherwise, they are treated as strings. Quote the value (e.g., `x='42'`)
    /// to force a string.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    vars: Vec<(String, Value)>,
    /// Replace a variable with an expression before processing.
    #[arg(long = "subst", value_name = "NAME=EXPR", value_parser = parse_substitution)]
    substitutions: Vec<(String, String)>,
    /// Enable an operator capability (e.g., `in`, `power` or `sin`).
    #[arg(long = "enable", value_name = "CAPABILITY")]
    enabled: Vec<String>,
    /// Disable an operator capability (e.g., `conditional`, `factorial` or `sqrt`).
    #[arg(long = "disable", value_name = "CAPABILITY")]
    disabled: Vec<String>,
    /// Disallow member access (`point.x`).
    #[arg(long)]
    no_members: bool,
    /// Expression to process. If omitted, the expression will be read from stdin.
    expr: Option<String>,
}

fn split_assignment(s: &str) -> anyhow::Result<(String, &str)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format_err!("Expected `name=value` format"))?;
    let name = name.trim();
    ensure!(
        is_valid_variable_name(name),
        "`{name}` is not a valid variable name"
    );
    Ok((name.to_owned(), value))
}

fn parse_binding(s: &str) -> anyhow::Result<(String, Value)> {
    let (name, value) = split_assignment(s)?;
    let value = value.trim();
    let is_quoted = value.len() >= 2
        && (value.starts_with('\'') && value.ends_with('\'')
            || value.starts_with('"') && value.ends_with('"'));
    let value = if is_quoted {
        Value::from(&value[1..value.len() - 1])
    } else if let Ok(number) = value.parse::<f64>() {
        Value::Number(number)
    } else {
        Value::from(value)
    };
    Ok((name, value))
}

fn parse_substitution(s: &str) -> anyhow::Result<(String, String)> {
    let (name, code) = split_assignment(s)?;
    Ok((name, code.to_owned()))
}

impl Args {
    fn init_logging(&self) {
        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    }

    fn run(self) -> io::Result<bool> {
        let mut reporter = Reporter::new(ColorChoice::Auto);
        match self.command {
            Command::Eval(args) => args.run(&mut reporter, |expr, vars, reporter| {
                match expr.evaluate(vars) {
                    Ok(value) => {
                        println!("{value}");
                        Ok(true)
                    }
                    Err(err) => {
                        reporter.report_eval_error(&err)?;
                        Ok(false)
                    }
                }
            }),
            Command::Simplify(args) => args.run(&mut reporter, |expr, vars, _| {
                println!("{}", expr.simplify(vars));
                Ok(true)
            }),
            Command::Render(args) => args.run(&mut reporter, |expr, _, _| {
                println!("{expr}");
                Ok(true)
            }),
            Command::Vars { args, members } => args.run(&mut reporter, |expr, _, _| {
                let options = SymbolOptions::default().with_members(members);
                for var in expr.variables(options) {
                    println!("{var}");
                }
                Ok(true)
            }),
        }
    }
}

impl ExprArgs {
    fn environment(&self) -> Environment {
        let mut options = ParseOptions::default().with_member_access(!self.no_members);
        for capability in &self.enabled {
            options.set_operator(capability, true);
        }
        for capability in &self.disabled {
            options.set_operator(capability, false);
        }
        Environment::standard().with_options(options)
    }

    fn read_expr(&mut self) -> io::Result<String> {
        if let Some(expr) = self.expr.take() {
            return Ok(expr);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }

    /// Parses the expression and applies substitutions, then runs `action` on the result.
    fn run<F>(mut self, reporter: &mut Reporter, action: F) -> io::Result<bool>
    where
        F: FnOnce(&Expression<'_>, &Bindings, &mut Reporter) -> io::Result<bool>,
    {
        let code = self.read_expr()?;
        let env = self.environment();
        let Some(mut expr) = reporter.parse(Snippet::Main, &code, &env)? else {
            return Ok(false);
        };

        for (name, replacement) in &self.substitutions {
            let snippet = Snippet::Substitution(name);
            let Some(replacement) = reporter.parse(snippet, replacement, &env)? else {
                return Ok(false);
            };
            expr = expr.substitute(name, &replacement);
            log::info!("substituted `{name}`: {expr}");
        }

        let vars: Bindings = self.vars.into_iter().collect();
        action(&expr, &vars, reporter)
    }
}

fn main() -> io::Result<()> {
    let args = Args::try_parse().unwrap_or_else(|err| {
        let exit_code = if err.use_stderr() { 1 } else { 0 };
        err.print().ok();
        process::exit(exit_code);
    });
    args.init_logging();

    if !args.run()? {
        process::exit(ERROR_EXIT_CODE);
    }
    Ok(())
}
