//! Runtime error kinds and the internal unwind-signal control-flow type.
//!
//! Grounded directly on the teacher's `exception_private.rs`: a `strum`-derived
//! kind enum plus a single result-channel sum type, rather than a grab-bag
//! `anyhow`-style error. Here the "result channel" also carries `return`,
//! `break`, and `continue` so every evaluation routine has exactly one
//! non-`Ok` path to worry about (spec 9: "a sum type with variants `Return`,
//! `Break`, `Continue`, `Throw`").

use std::fmt;

use strum::{Display, EnumString};

use crate::value::Value;

/// The eight runtime-throwable error kinds (`SyntaxError` is its own
/// [`crate::ParseError`] type and never reaches this enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ExcType {
    NameError,
    TypeError,
    ArityError,
    IndexError,
    DivisionError,
    ValueError,
    UserError,
    IOError,
}

/// A builtin-raised runtime error: a kind plus a message. Converts into a
/// thrown string value (`"Kind: message"`) when it enters the language's
/// `throw`/`catch` channel.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ExcType,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: ExcType, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::string(format!("{}: {}", self.kind, self.message))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// The interpreter's single non-`Ok` result channel: normal evaluation
/// returns `Ok`, every other control-flow exit (or error) unwinds as one of
/// these signal variants until something handles it.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Break,
    Continue,
    Throw(Value),
}

impl Signal {
    pub fn throw(err: RuntimeError) -> Self {
        Signal::Throw(err.into_value())
    }
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::throw(err)
    }
}

pub type EvalResult<T> = Result<T, Signal>;
