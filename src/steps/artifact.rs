//! Step artifacts and their on-disk layout.
//!
//! A run named `wordcount` writes under `{output_dir}/wordcount/`:
//!
//! - `{id}_response.md` for every executed step
//! - `{id}.{ext}` for every step when the module strategy is active
//! - `logs/{id}.log` (see [`FileLogSink`](super::FileLogSink))
//!
//! Writes replace whole files, so re-running a spec overwrites the previous
//! artifacts of the same step ids.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::Language;
use crate::error::Result;

/// Output of one executed (or previously executed) step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepArtifact {
    /// The response text after any extraction.
    pub text: String,

    /// Path of the persisted module, when one was written.
    pub module: Option<PathBuf>,
}

impl StepArtifact {
    /// Create an artifact holding `text` and no module.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            module: None,
        }
    }
}

/// Artifacts recorded so far in a run, keyed by step id.
pub type ArtifactMap = HashMap<String, StepArtifact>;

/// Run-scoped artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `{output_dir}/{run_name}`.
    pub fn new(output_dir: &Path, run_name: &str) -> Self {
        Self {
            root: output_dir.join(run_name),
        }
    }

    /// The run's output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding per-step logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Create the output root and log directory. Idempotent.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// Path of the raw response file for `step_id`.
    pub fn response_path(&self, step_id: &str) -> PathBuf {
        self.root.join(format!("{}_response.md", step_id))
    }

    /// Path of the module file for `step_id`.
    pub fn module_path(&self, step_id: &str, language: Language) -> PathBuf {
        self.root
            .join(format!("{}.{}", step_id, language.module_extension()))
    }

    /// Write the response file for `step_id`.
    pub fn write_response(&self, step_id: &str, text: &str) -> Result<PathBuf> {
        let path = self.response_path(step_id);
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Write the module file for `step_id`.
    pub fn write_module(&self, step_id: &str, text: &str, language: Language) -> Result<PathBuf> {
        let path = self.module_path(step_id, language);
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Read the response a previous run left for `step_id`, if any.
    pub fn load_response(&self, step_id: &str) -> Result<Option<String>> {
        let path = self.response_path(step_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
