//! Operator-supplied responses.

use std::io::{BufRead, IsTerminal};

use console::Term;
use dialoguer::Input;

use crate::error::{JitsError, Result};

/// A source of single lines of operator input.
pub trait LineSource {
    /// Block until one line is available. `None` means the input is closed.
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// Reads lines from any buffered reader (piped stdin, files, test buffers).
pub struct ReaderLineSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Interactive line prompt on the controlling terminal.
pub struct TerminalLineSource {
    term: Term,
}

impl TerminalLineSource {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TerminalLineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for TerminalLineSource {
    fn read_line(&mut self) -> Result<Option<String>> {
        let line = Input::<String>::new()
            .with_prompt(">>")
            .allow_empty(true)
            .interact_on(&self.term)
            .map_err(|e| JitsError::Io(e.into()))?;
        Ok(Some(line))
    }
}

/// Pick the line source for standard input.
///
/// A terminal gets an interactive prompt; anything else is read line by line.
pub fn stdin_line_source() -> Box<dyn LineSource> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        Box::new(TerminalLineSource::new())
    } else {
        Box::new(ReaderLineSource::new(stdin.lock()))
    }
}
