//! Step execution engine.
//!
//! Drives one step end-to-end: obtain the response, write the step log,
//! persist the response and (for the module strategy) the module file.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::backend::{Backend, ResponseOrigin};
use crate::context::{IntegrationStrategy, Language};
use crate::error::Result;

use super::artifact::{ArtifactStore, StepArtifact};
use super::format::{FormatOutcome, Formatter};
use super::log::{LogEntry, LogEntryKind, LogRecord, LogSink};

/// Run-wide inputs to step execution.
pub struct ExecutionContext<'a> {
    pub store: &'a ArtifactStore,
    pub strategy: IntegrationStrategy,
    pub language: Language,
    /// Formatter for module files; `None` skips formatting.
    pub formatter: Option<&'a dyn Formatter>,
}

/// Result of executing a step.
#[derive(Debug)]
pub struct StepOutcome {
    /// Step id.
    pub step_id: String,

    /// The artifact recorded for later steps.
    pub artifact: StepArtifact,

    /// Who produced the response.
    pub origin: ResponseOrigin,

    /// Where the response was written.
    pub response_path: PathBuf,

    /// Formatter outcome, when a module was written.
    pub format: Option<FormatOutcome>,

    /// Execution duration.
    pub duration: Duration,
}

/// Execute a single step with an already assembled prompt.
///
/// A backend failure returns before anything is written for the step.
pub fn execute_step(
    step_id: &str,
    prompt: &str,
    backend: &mut Backend,
    log: &mut dyn LogSink,
    ctx: &ExecutionContext<'_>,
) -> Result<StepOutcome> {
    let start = Instant::now();

    let prompt_entry = LogEntry::now(LogEntryKind::Prompt, prompt);
    let response = backend.respond(step_id, prompt)?;

    let mut record = LogRecord::new();
    record.push(prompt_entry);
    let kind = match response.origin {
        ResponseOrigin::Generated => LogEntryKind::Response,
        ResponseOrigin::Manual => LogEntryKind::ManualInput,
    };
    record.push(LogEntry::now(kind, response.raw.as_str()));
    log.record(step_id, &record)?;

    let response_path = ctx.store.write_response(step_id, &response.text)?;
    debug!("Saved response to {}", response_path.display());

    let mut artifact = StepArtifact::new(response.text);
    let mut format = None;

    if ctx.strategy.writes_modules() {
        let module_path = ctx
            .store
            .write_module(step_id, &artifact.text, ctx.language)?;
        debug!("Saved module to {}", module_path.display());

        let outcome = match ctx.formatter {
            Some(formatter) => formatter.format(&module_path),
            None => FormatOutcome::Skipped {
                reason: "no formatter configured".to_string(),
            },
        };
        if let FormatOutcome::Failed { tool, message } = &outcome {
            warn!("Formatter {} failed on {}: {}", tool, module_path.display(), message);
        }

        artifact.module = Some(module_path);
        format = Some(outcome);
    }

    Ok(StepOutcome {
        step_id: step_id.to_string(),
        artifact,
        origin: response.origin,
        response_path,
        format,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AutomatedBackend, GenerationBackend, GenerationParams, GenerationRequest, ManualBackend,
        ReaderLineSource,
    };
    use crate::context::Flavor;
    use crate::error::JitsError;
    use crate::steps::log::MemoryLogSink;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixed(&'static str);

    impl GenerationBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl GenerationBackend for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String> {
            Err(JitsError::Backend {
                provider: "broken".into(),
                message: "connection reset".into(),
            })
        }
    }

    struct Recording;

    impl Formatter for Recording {
        fn format(&self, path: &Path) -> FormatOutcome {
            FormatOutcome::Formatted {
                tool: path.file_name().unwrap().to_string_lossy().to_string(),
            }
        }
    }

    fn store(temp: &TempDir) -> ArtifactStore {
        let store = ArtifactStore::new(temp.path(), "run");
        store.ensure_dirs().unwrap();
        store
    }

    fn automated(client: impl GenerationBackend + 'static, flavor: Flavor) -> Backend {
        Backend::Automated(AutomatedBackend::new(
            Box::new(client),
            GenerationParams::default(),
            flavor,
        ))
    }

    fn inline_ctx(store: &ArtifactStore) -> ExecutionContext<'_> {
        ExecutionContext {
            store,
            strategy: IntegrationStrategy::Inline,
            language: Language::Python,
            formatter: None,
        }
    }

    #[test]
    fn automated_step_writes_response_and_log() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut backend = automated(Fixed("print('hi')"), Flavor::Freeform);
        let mut log = MemoryLogSink::new();

        let outcome =
            execute_step("a", "say hi", &mut backend, &mut log, &inline_ctx(&store)).unwrap();

        assert_eq!(outcome.artifact.text, "print('hi')");
        assert!(outcome.artifact.module.is_none());
        assert!(outcome.format.is_none());
        assert_eq!(
            fs::read_to_string(store.response_path("a")).unwrap(),
            "print('hi')"
        );

        let record = log.get("a").unwrap();
        assert_eq!(record.entries().len(), 2);
        assert_eq!(record.entries()[0].kind, LogEntryKind::Prompt);
        assert_eq!(record.entries()[0].body, "say hi");
        assert_eq!(record.entries()[1].kind, LogEntryKind::Response);
    }

    #[test]
    fn code_flavor_stores_extracted_code_but_logs_raw() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut backend = automated(Fixed("Here:\n```python\nx = 1\n```"), Flavor::Code);
        let mut log = MemoryLogSink::new();

        let outcome = execute_step("a", "p", &mut backend, &mut log, &inline_ctx(&store)).unwrap();

        assert_eq!(outcome.artifact.text, "x = 1");
        assert!(log.get("a").unwrap().entries()[1].body.contains("Here:"));
    }

    #[test]
    fn manual_step_logs_manual_input() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = ReaderLineSource::new(Cursor::new("42\n"));
        let mut backend = Backend::Manual(ManualBackend::new(Box::new(source)));
        let mut log = MemoryLogSink::new();

        let outcome = execute_step("a", "p", &mut backend, &mut log, &inline_ctx(&store)).unwrap();

        assert_eq!(outcome.origin, ResponseOrigin::Manual);
        assert_eq!(outcome.artifact.text, "42");
        let entries = log.get("a").unwrap().entries();
        assert_eq!(entries[1].kind, LogEntryKind::ManualInput);
        assert_eq!(entries[1].body, "42");
    }

    #[test]
    fn backend_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut backend = automated(Broken, Flavor::Freeform);
        let mut log = MemoryLogSink::new();

        let err = execute_step("a", "p", &mut backend, &mut log, &inline_ctx(&store)).unwrap_err();

        assert!(matches!(err, JitsError::Backend { .. }));
        assert!(!store.response_path("a").exists());
        assert!(log.records().is_empty());
    }

    #[test]
    fn module_strategy_writes_module_and_formats() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut backend = automated(Fixed("def f(): pass"), Flavor::Freeform);
        let mut log = MemoryLogSink::new();
        let formatter = Recording;
        let ctx = ExecutionContext {
            store: &store,
            strategy: IntegrationStrategy::Module,
            language: Language::Python,
            formatter: Some(&formatter),
        };

        let outcome = execute_step("util", "p", &mut backend, &mut log, &ctx).unwrap();

        let module = outcome.artifact.module.clone().unwrap();
        assert!(module.ends_with("util.py"));
        assert_eq!(fs::read_to_string(&module).unwrap(), "def f(): pass");
        assert_eq!(
            outcome.format,
            Some(FormatOutcome::Formatted {
                tool: "util.py".into()
            })
        );
    }

    #[test]
    fn module_strategy_without_formatter_is_skipped() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut backend = automated(Fixed("x"), Flavor::Freeform);
        let mut log = MemoryLogSink::new();
        let ctx = ExecutionContext {
            store: &store,
            strategy: IntegrationStrategy::Module,
            language: Language::Python,
            formatter: None,
        };

        let outcome = execute_step("a", "p", &mut backend, &mut log, &ctx).unwrap();
        assert!(matches!(outcome.format, Some(FormatOutcome::Skipped { .. })));
    }
}
