//! Volt: a small dynamically-typed scripting language.
//!
//! The pipeline is lexer -> parser -> AST -> tree-walking evaluator. See
//! [`run_source`] for the simplest embedding entry point.

mod ast;
mod builtins;
mod diagnostics;
mod environment;
mod exception;
mod function;
mod interpreter;
mod io;
mod lexer;
mod modules;
mod object;
mod parser;
mod token;
mod value;

pub use diagnostics::{ParseError, SourcePos};
pub use environment::Environment;
pub use exception::{ExcType, RuntimeError, Signal};
pub use interpreter::Interpreter;
pub use io::{CollectOutput, InputSource, NoInput, OutputSink, ScriptedInput, StdIo};
pub use value::Value;

use std::rc::Rc;

/// Parses and runs `source`, writing `show` output to `sink` and reading
/// `ask` input from `input`. Returns the value of the last top-level
/// expression statement, or the first unhandled signal converted to an
/// error string.
pub fn run_source(
    source: &str,
    sink: &mut dyn OutputSink,
    input: &mut dyn InputSource,
    seed: Option<u64>,
) -> Result<Value, String> {
    let tokens = lexer::Lexer::new(source).tokenize().map_err(|e| e.to_string())?;
    let program = parser::Parser::new(tokens, source).parse_program().map_err(|e| e.to_string())?;
    let mut interp = Interpreter::new(sink, input, seed);
    match interp.run_program(&program) {
        Ok(v) => Ok(v),
        Err(Signal::Throw(payload)) => {
            Err(interp.stringify(&payload).unwrap_or_else(|_| "<unprintable error>".to_string()))
        }
        Err(_) => unreachable!("run_program resolves Return/Break/Continue internally"),
    }
}

/// Parses `source` without executing it, surfacing only syntax errors.
pub fn parse_only(source: &str) -> Result<(), ParseError> {
    let tokens = lexer::Lexer::new(source).tokenize()?;
    parser::Parser::new(tokens, source).parse_program()?;
    Ok(())
}

pub(crate) type Shared<T> = Rc<std::cell::RefCell<T>>;

pub(crate) fn shared<T>(value: T) -> Shared<T> {
    Rc::new(std::cell::RefCell::new(value))
}
