use std::io::{self, BufRead, Write};
use std::path::Path;

use log::{debug, info};

use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;

/// How one program run ended.  The CLI maps these onto its exit codes.
#[derive(Debug)]
pub enum Outcome {
    Success,
    StaticError(Vec<LoxError>),
    RuntimeError(LoxError),
}

impl Outcome {
    /// Print any collected diagnostics to standard error.
    pub fn report(&self) {
        match self {
            Outcome::Success => {}

            Outcome::StaticError(errors) => {
                for error in errors {
                    eprintln!("{}", error);
                }
            }

            Outcome::RuntimeError(error) => {
                eprintln!("{}", error);
            }
        }
    }
}

/// Front door of the interpreter: owns the interpreter state plus the
/// expression-id counter, so scripts and successive REPL lines share one
/// global environment without colliding node identities.
pub struct Lox<W: Write> {
    interpreter: Interpreter<W>,
    next_expr_id: usize,
}

impl<W: Write> Lox<W> {
    pub fn new(out: W) -> Self {
        Lox {
            interpreter: Interpreter::new(out),
            next_expr_id: 0,
        }
    }

    /// Run one source text through the full pipeline.
    pub fn run(&mut self, source: &[u8]) -> Outcome {
        let scanner = Scanner::new(source);

        let mut parser = Parser::resume(scanner, self.next_expr_id);
        let program: Vec<Stmt> = parser.parse();
        self.next_expr_id = parser.next_expr_id();

        if parser.had_error() {
            return Outcome::StaticError(parser.into_diagnostics());
        }

        debug!("Parsed {} top-level statement(s)", program.len());

        let resolver = Resolver::new(&mut self.interpreter);
        let resolve_errors: Vec<LoxError> = resolver.resolve(&program);

        if !resolve_errors.is_empty() {
            return Outcome::StaticError(resolve_errors);
        }

        match self.interpreter.interpret(&program) {
            Ok(()) => Outcome::Success,

            Err(e) => Outcome::RuntimeError(e),
        }
    }

    /// Execute a script file.
    pub fn run_file(&mut self, path: &Path) -> Result<Outcome> {
        info!("Running file {}", path.display());

        let source: Vec<u8> = std::fs::read(path)?;

        Ok(self.run(&source))
    }

    /// Line-at-a-time REPL over stdin.  Diagnostics are reported and the
    /// loop continues; EOF terminates.
    pub fn run_prompt(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            print!("> ");
            io::stdout().flush()?;

            line.clear();

            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }

            self.run(line.as_bytes()).report();
        }
    }
}
