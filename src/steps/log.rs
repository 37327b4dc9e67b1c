//! Per-step run logs.
//!
//! Each executed step leaves one log holding timestamped entries:
//!
//! ```text
//! [2026-10-18 09:14:02] === PROMPT ===
//! Write a function that reads a file.
//!
//! [2026-10-18 09:14:09] === RESPONSE ===
//! def read_file(path): ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::Result;

/// Timestamp format used in log entries.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntryKind {
    Prompt,
    Response,
    ManualInput,
}

impl LogEntryKind {
    fn heading(&self) -> &'static str {
        match self {
            Self::Prompt => "=== PROMPT ===",
            Self::Response => "=== RESPONSE ===",
            Self::ManualInput => "=== MANUAL INPUT ===",
        }
    }
}

/// One timestamped entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub kind: LogEntryKind,
    pub body: String,
}

impl LogEntry {
    /// Entry stamped with the current local time.
    pub fn now(kind: LogEntryKind, body: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            body: body.into(),
        }
    }

    fn render(&self) -> String {
        format!(
            "[{}] {}\n{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.kind.heading(),
            self.body
        )
    }
}

/// The log of one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    entries: Vec<LogEntry>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Render entries separated by blank lines.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(LogEntry::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Destination for step logs.
pub trait LogSink {
    /// Store the log of `step_id`, replacing any previous log for it.
    fn record(&mut self, step_id: &str, record: &LogRecord) -> Result<()>;
}

/// Writes `{dir}/{step_id}.log` files.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    dir: PathBuf,
}

impl FileLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the log for `step_id`.
    pub fn path_for(&self, step_id: &str) -> PathBuf {
        self.dir.join(format!("{}.log", step_id))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LogSink for FileLogSink {
    fn record(&mut self, step_id: &str, record: &LogRecord) -> Result<()> {
        let path = self.path_for(step_id);
        fs::write(&path, record.render())?;
        tracing::debug!("Wrote log {}", path.display());
        Ok(())
    }
}

/// Keeps logs in memory.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    records: Vec<(String, LogRecord)>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded logs in write order.
    pub fn records(&self) -> &[(String, LogRecord)] {
        &self.records
    }

    /// The log recorded for `step_id`, if any.
    pub fn get(&self, step_id: &str) -> Option<&LogRecord> {
        self.records
            .iter()
            .rev()
            .find(|(id, _)| id == step_id)
            .map(|(_, record)| record)
    }
}

impl LogSink for MemoryLogSink {
    fn record(&mut self, step_id: &str, record: &LogRecord) -> Result<()> {
        self.records.push((step_id.to_string(), record.clone()));
        Ok(())
    }
}

/// Log files under `dir`, sorted by file name.
pub fn list_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .collect();
    logs.sort();
    Ok(logs)
}
