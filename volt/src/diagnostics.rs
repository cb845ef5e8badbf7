//! Source positions and the fatal parse-error type.
//!
//! Modeled on the teacher's split between fatal, pre-execution failures and
//! in-language throwable errors: a [`ParseError`] is never a [`crate::Signal`],
//! it can only come out of the lexer or parser and always carries line/column.

use std::fmt;

/// A byte offset into the source, plus its resolved 1-based line/column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    pub line: usize,
    pub column: usize,
}

impl SourcePos {
    /// Resolves a byte offset into source into a 1-based line/column pair.
    #[must_use]
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for ch in source[..offset.min(source.len())].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A fatal lexer or parser failure. Always reported before any evaluation
/// begins (spec: "SyntaxError ... fatal before execution starts").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub pos: SourcePos,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, pos: SourcePos) -> Self {
        Self { message: message.into(), pos }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError at {}: {}", self.pos, self.message)
    }
}

impl std::error::Error for ParseError {}
