//! Session driver tying the pipeline together:
//! scanner → parser → resolver → interpreter.
//!
//! One [`Lox`] session owns one interpreter, so globals, functions and
//! classes defined by earlier sources stay visible to later ones (REPL use).

use std::io::Write;

use log::{debug, info};

use crate::ast::{ExprId, Stmt};
use crate::error::{LoxError, Reporter, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;

/// How a call to [`Lox::run_source`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,

    /// Lexical, syntax or resolution errors; nothing was executed.
    StaticError,

    /// Execution started and was aborted by a runtime error.
    RuntimeError,
}

/// Forwards diagnostics while counting them.
struct Tally<'r> {
    inner: &'r mut dyn Reporter,
    count: usize,
}

impl Reporter for Tally<'_> {
    fn report(&mut self, error: LoxError) {
        self.count += 1;
        self.inner.report(error);
    }
}

pub struct Lox {
    interpreter: Interpreter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A session printing program output to stdout.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    /// A session printing program output to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Scan, parse and resolve `source`.  Returns `None` when any diagnostic
    /// was reported: a malformed program is never handed to the interpreter.
    pub fn compile(&mut self, source: &str, reporter: &mut dyn Reporter) -> Option<Vec<Stmt>> {
        let mut tally = Tally {
            inner: reporter,
            count: 0,
        };

        let first_id: ExprId = ExprId::high_water();
        let tokens = scan_tokens(source, &mut tally);
        let statements: Vec<Stmt> = Parser::new(&tokens, &mut tally).parse();

        if tally.count > 0 {
            debug!("{} error(s) before resolution, skipping it", tally.count);
            return None;
        }

        Resolver::new(&mut self.interpreter, &mut tally).resolve(&statements);

        if tally.count > 0 {
            info!("Resolution reported {} error(s)", tally.count);
            self.interpreter.forget_locals_from(first_id);
            return None;
        }

        Some(statements)
    }

    /// Run statements previously returned by [`Lox::compile`].
    pub fn execute(&mut self, statements: &[Stmt]) -> Result<()> {
        self.interpreter.interpret(statements)
    }

    /// Compile and, if that succeeded, execute `source`.  A runtime error is
    /// handed to `reporter` as well.
    pub fn run_source(&mut self, source: &str, reporter: &mut dyn Reporter) -> Status {
        let Some(statements) = self.compile(source, reporter) else {
            return Status::StaticError;
        };

        match self.execute(&statements) {
            Ok(()) => Status::Success,
            Err(e) => {
                reporter.report(e);
                Status::RuntimeError
            }
        }
    }
}
