//! `show`/`ask` I/O abstraction.
//!
//! Directly modeled on the teacher's `PrintWriter`/`StdPrint`/
//! `CollectStringPrint`/`NoPrint` quartet: a trait for the output side, real
//! and test-only implementations. `ask` needs a matching input-side trait the
//! teacher has no analog for (Python's sandboxed `print` has no blocking
//! `input()` equivalent in that corpus), so `InputSource` is modeled the same
//! way by symmetry.

use std::io::{self, BufRead, Write as _};

/// Receives `show` output: one formatted line per call.
pub trait OutputSink {
    fn write_line(&mut self, line: &str);

    /// Writes `ask`'s prompt text with no trailing newline (spec 6).
    fn write_prompt(&mut self, text: &str);
}

/// Supplies `ask` input: one line per call, pre-stripped of its newline.
pub trait InputSource {
    /// Returns `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Default `OutputSink`/`InputSource` pair backed by the process's real
/// stdout/stdin.
#[derive(Debug, Default)]
pub struct StdIo;

impl OutputSink for StdIo {
    fn write_line(&mut self, line: &str) {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout, "{line}");
    }

    fn write_prompt(&mut self, text: &str) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();
    }
}

impl InputSource for StdIo {
    fn read_line(&mut self) -> Option<String> {
        let _ = io::stdout().flush();
        let mut buf = String::new();
        match io::stdin().lock().read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.ends_with('\n') {
                    buf.pop();
                    if buf.ends_with('\r') {
                        buf.pop();
                    }
                }
                Some(buf)
            }
            Err(_) => None,
        }
    }
}

/// `OutputSink` that collects lines into a string; useful for tests that
/// assert on `show` output without touching real stdout.
#[derive(Debug, Default)]
pub struct CollectOutput {
    buffer: String,
}

impl CollectOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.buffer
    }
}

impl OutputSink for CollectOutput {
    fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    fn write_prompt(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// `InputSource` that yields a fixed, pre-scripted sequence of lines.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

/// `InputSource` that never has input; every `ask` observes end of input.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn read_line(&mut self) -> Option<String> {
        None
    }
}
