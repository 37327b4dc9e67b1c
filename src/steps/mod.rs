//! Step execution and its artifacts.
//!
//! - [`execute_step`] - Run one step against the chosen backend
//! - [`ArtifactStore`] - Run-scoped output directory
//! - [`LogSink`] - Per-step prompt/response logs
//! - [`Formatter`] - Best-effort post-processing of module files

pub mod artifact;
pub mod executor;
pub mod format;
pub mod log;

pub use artifact::{ArtifactMap, ArtifactStore, StepArtifact};
pub use executor::{execute_step, ExecutionContext, StepOutcome};
pub use format::{ExternalFormatter, FormatOutcome, Formatter};
pub use log::{
    list_logs, FileLogSink, LogEntry, LogEntryKind, LogRecord, LogSink, MemoryLogSink,
    TIMESTAMP_FORMAT,
};
