//! Run orchestration.

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::backend::{Backend, BackendMode};
use crate::error::{JitsError, Result};
use crate::graph::ExecutionOrder;
use crate::spec::{load_prompt_text, LoadedSpec};
use crate::steps::{
    execute_step, ArtifactMap, ArtifactStore, ExecutionContext, ExternalFormatter, Formatter,
    LogSink, StepArtifact, StepOutcome,
};

use super::plan::RunPlan;

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        id: &'a str,
        title: &'a str,
        index: usize,
        total: usize,
    },
    /// The final prompt is assembled and about to go to the backend.
    PromptReady {
        id: &'a str,
        prompt: &'a str,
        mode: BackendMode,
    },
    /// A step finished.
    StepFinished {
        id: &'a str,
        outcome: &'a StepOutcome,
    },
    /// A step failed; the run stops after this event.
    StepFailed { id: &'a str, error: &'a JitsError },
    /// A step was skipped. `reused` is set when a previous response was
    /// loaded for its dependents.
    StepSkipped { id: &'a str, reused: bool },
}

/// Options for a run.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Skip these steps.
    pub skip: HashSet<String>,
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Run name.
    pub name: String,
    /// Order the steps were visited in.
    pub order: ExecutionOrder,
    /// Artifacts of executed and reused steps.
    pub artifacts: ArtifactMap,
    /// Outcomes of executed steps, in execution order.
    pub executed: Vec<StepOutcome>,
    /// Ids of skipped steps.
    pub skipped: Vec<String>,
    /// Total duration.
    pub duration: Duration,
}

/// Walks the execution order and executes each step.
///
/// Backend, log sink and artifact store are supplied by the caller.
pub struct RunDriver<'a> {
    spec: &'a LoadedSpec,
    plan: RunPlan,
    backend: Backend,
    log: &'a mut dyn LogSink,
    store: ArtifactStore,
    formatter: Option<Box<dyn Formatter>>,
}

impl<'a> RunDriver<'a> {
    /// Create a driver. Module formatting uses the command from the plan's
    /// settings.
    pub fn new(
        spec: &'a LoadedSpec,
        plan: RunPlan,
        backend: Backend,
        log: &'a mut dyn LogSink,
        store: ArtifactStore,
    ) -> Self {
        let formatter = plan
            .settings
            .formatter_command()
            .map(|cmd| Box::new(ExternalFormatter::new(cmd)) as Box<dyn Formatter>);
        Self {
            spec,
            plan,
            backend,
            log,
            store,
            formatter,
        }
    }

    /// Replace the module formatter.
    pub fn with_formatter(mut self, formatter: Option<Box<dyn Formatter>>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    pub fn output_dir(&self) -> &Path {
        self.store.root()
    }

    /// Run every step.
    pub fn run(&mut self, options: &RunOptions) -> Result<RunResult> {
        self.run_with_progress(options, |_| {})
    }

    /// Run every step with a progress callback.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedStep` for an unknown skip id before any output is
    /// written. Any step error stops the run; artifacts of earlier steps
    /// stay on disk.
    pub fn run_with_progress(
        &mut self,
        options: &RunOptions,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunResult> {
        let start = Instant::now();

        let mut unknown: Vec<_> = options
            .skip
            .iter()
            .filter(|id| !self.plan.graph.contains(id))
            .collect();
        unknown.sort();
        if let Some(id) = unknown.first() {
            return Err(JitsError::UndefinedStep {
                step: (*id).clone(),
            });
        }

        self.store.ensure_dirs()?;
        info!(
            "Running '{}' ({} steps, {} integration, {} mode)",
            self.spec.spec.name,
            self.plan.order.len(),
            self.plan.settings.integration,
            self.backend.mode()
        );

        let assembler = self.plan.settings.assembler();
        let total = self.plan.order.len();
        let mut artifacts = ArtifactMap::new();
        let mut executed = Vec::new();
        let mut skipped = Vec::new();

        for (index, id) in self.plan.order.iter().enumerate() {
            let step = self
                .spec
                .spec
                .prompts
                .get(id)
                .ok_or_else(|| JitsError::UndefinedStep { step: id.clone() })?;

            if options.skip.contains(id) {
                let reused = match self.store.load_response(id)? {
                    Some(text) => {
                        let mut artifact = StepArtifact::new(text);
                        let module = self.store.module_path(id, self.plan.settings.language);
                        if self.plan.settings.integration.writes_modules() && module.exists() {
                            artifact.module = Some(module);
                        }
                        artifacts.insert(id.clone(), artifact);
                        true
                    }
                    None => false,
                };
                debug!("Skipping step '{}' (reused previous response: {})", id, reused);
                on_progress(RunProgress::StepSkipped { id, reused });
                skipped.push(id.clone());
                continue;
            }

            on_progress(RunProgress::StepStarting {
                id,
                title: &step.title,
                index,
                total,
            });

            let result = load_prompt_text(id, step, &self.spec.base_dir).and_then(|prompt| {
                let prompt =
                    assembler.assemble(&prompt, self.plan.graph.dependencies_of(id), &artifacts);
                on_progress(RunProgress::PromptReady {
                    id,
                    prompt: &prompt,
                    mode: self.backend.mode(),
                });

                let ctx = ExecutionContext {
                    store: &self.store,
                    strategy: self.plan.settings.integration,
                    language: self.plan.settings.language,
                    formatter: self.formatter.as_deref(),
                };
                execute_step(id, &prompt, &mut self.backend, &mut *self.log, &ctx)
            });

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(error) => {
                    on_progress(RunProgress::StepFailed { id, error: &error });
                    return Err(error);
                }
            };

            on_progress(RunProgress::StepFinished {
                id,
                outcome: &outcome,
            });
            artifacts.insert(id.clone(), outcome.artifact.clone());
            executed.push(outcome);
        }

        Ok(RunResult {
            name: self.spec.spec.name.clone(),
            order: self.plan.order.clone(),
            artifacts,
            executed,
            skipped,
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AutomatedBackend, GenerationBackend, GenerationParams, GenerationRequest, ManualBackend,
        ReaderLineSource,
    };
    use crate::context::Flavor;
    use crate::spec::parse_spec;
    use crate::steps::{LogEntryKind, MemoryLogSink};
    use std::cell::RefCell;
    use std::fs;
    use std::io::Cursor;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Records prompts and answers with a running counter.
    struct Recorder {
        prompts: Rc<RefCell<Vec<String>>>,
    }

    impl GenerationBackend for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn generate(&self, request: &GenerationRequest<'_>) -> crate::error::Result<String> {
            let mut prompts = self.prompts.borrow_mut();
            prompts.push(request.prompt.to_string());
            Ok(format!("OUT{}", prompts.len()))
        }
    }

    struct Failing;

    impl GenerationBackend for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn generate(&self, _request: &GenerationRequest<'_>) -> crate::error::Result<String> {
            Err(JitsError::Backend {
                provider: "failing".into(),
                message: "rate limited".into(),
            })
        }
    }

    const CHAIN: &str = r#"
name: chain
prompts:
  a: { title: A, prompt: "make a" }
  b: { title: B, prompt: "make b" }
  c: { title: C, prompt: "make c" }
flow:
  - { id: b, after: [a] }
  - { id: c, after: [b] }
"#;

    fn loaded(yaml: &str, dir: &Path) -> LoadedSpec {
        LoadedSpec::from_spec(parse_spec(yaml, Path::new("spec.yml")).unwrap(), dir)
    }

    fn recorder() -> (Backend, Rc<RefCell<Vec<String>>>) {
        let prompts = Rc::new(RefCell::new(Vec::new()));
        let backend = Backend::Automated(AutomatedBackend::new(
            Box::new(Recorder {
                prompts: Rc::clone(&prompts),
            }),
            GenerationParams::default(),
            Flavor::Freeform,
        ));
        (backend, prompts)
    }

    fn manual(input: &str) -> Backend {
        Backend::Manual(ManualBackend::new(Box::new(ReaderLineSource::new(
            Cursor::new(input.to_string()),
        ))))
    }

    #[test]
    fn manual_chain_writes_responses_and_logs() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let store = ArtifactStore::new(&temp.path().join("out"), &spec.spec.name);
        let mut log = MemoryLogSink::new();

        let result = RunDriver::new(&spec, plan, manual("1\n2\n3\n"), &mut log, store.clone())
            .run(&RunOptions::default())
            .unwrap();

        assert_eq!(result.order.as_slice(), &["a", "b", "c"]);
        for (id, text) in [("a", "1"), ("b", "2"), ("c", "3")] {
            assert_eq!(fs::read_to_string(store.response_path(id)).unwrap(), text);
        }
        assert_eq!(log.records().len(), 3);
        assert_eq!(
            log.get("c").unwrap().entries()[1].kind,
            LogEntryKind::ManualInput
        );
    }

    #[test]
    fn inline_context_flows_to_dependents() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let (backend, prompts) = recorder();
        let mut log = MemoryLogSink::new();

        RunDriver::new(&spec, plan, backend, &mut log, ArtifactStore::new(temp.path(), "chain"))
            .run(&RunOptions::default())
            .unwrap();

        let prompts = prompts.borrow();
        assert_eq!(prompts[0], "make a");
        assert!(prompts[1].contains("# from a\nOUT1"));
        assert!(prompts[1].ends_with("make b"));
        assert!(prompts[2].contains("# from b\nOUT2"));
        assert!(!prompts[2].contains("# from a"));
    }

    #[test]
    fn module_strategy_imports_dependencies_and_writes_modules() {
        let temp = TempDir::new().unwrap();
        let yaml = r#"
name: mods
settings: { integration: module }
prompts:
  a: { prompt: "make a" }
  b: { prompt: "make b" }
flow:
  - { id: b, after: [a] }
"#;
        let spec = loaded(yaml, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let (backend, prompts) = recorder();
        let store = ArtifactStore::new(temp.path(), "mods");
        let mut log = MemoryLogSink::new();

        let result = RunDriver::new(&spec, plan, backend, &mut log, store.clone())
            .with_formatter(None)
            .run(&RunOptions::default())
            .unwrap();

        assert!(prompts.borrow()[1].contains("from a import *"));
        assert!(store.root().join("a.py").exists());
        assert_eq!(
            result.artifacts["b"].module.as_deref(),
            Some(store.root().join("b.py").as_path())
        );
    }

    #[test]
    fn backend_failure_stops_run_and_keeps_earlier_artifacts() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let store = ArtifactStore::new(temp.path(), "chain");
        let mut log = MemoryLogSink::new();
        let backend = manual("only-one\n");

        let mut failed = Vec::new();
        let err = RunDriver::new(&spec, plan, backend, &mut log, store.clone())
            .run_with_progress(&RunOptions::default(), |event| {
                if let RunProgress::StepFailed { id, .. } = event {
                    failed.push(id.to_string());
                }
            })
            .unwrap_err();

        assert!(matches!(err, JitsError::ManualInputClosed { ref step } if step == "b"));
        assert_eq!(failed, ["b"]);
        assert!(store.response_path("a").exists());
        assert!(!store.response_path("b").exists());
    }

    #[test]
    fn automated_failure_writes_nothing_for_step() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let store = ArtifactStore::new(temp.path(), "chain");
        let mut log = MemoryLogSink::new();
        let backend = Backend::Automated(AutomatedBackend::new(
            Box::new(Failing),
            GenerationParams::default(),
            Flavor::Freeform,
        ));

        let err = RunDriver::new(&spec, plan, backend, &mut log, store.clone())
            .run(&RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, JitsError::Backend { .. }));
        assert!(!store.response_path("a").exists());
        assert!(log.records().is_empty());
    }

    #[test]
    fn skipped_step_reuses_previous_response() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let store = ArtifactStore::new(temp.path(), "chain");
        store.ensure_dirs().unwrap();
        store.write_response("a", "PREVIOUS").unwrap();

        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let (backend, prompts) = recorder();
        let mut log = MemoryLogSink::new();
        let options = RunOptions {
            skip: ["a".to_string()].into_iter().collect(),
        };

        let mut events = Vec::new();
        let result = RunDriver::new(&spec, plan, backend, &mut log, store)
            .run_with_progress(&options, |event| {
                if let RunProgress::StepSkipped { id, reused } = event {
                    events.push((id.to_string(), reused));
                }
            })
            .unwrap();

        assert_eq!(events, [("a".to_string(), true)]);
        assert_eq!(result.skipped, ["a"]);
        assert_eq!(result.executed.len(), 2);
        assert!(prompts.borrow()[0].contains("# from a\nPREVIOUS"));
    }

    #[test]
    fn unknown_skip_id_fails_before_writing() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let store = ArtifactStore::new(&temp.path().join("out"), "chain");
        let mut log = MemoryLogSink::new();
        let options = RunOptions {
            skip: ["ghost".to_string()].into_iter().collect(),
        };

        let err = RunDriver::new(&spec, plan, manual(""), &mut log, store.clone())
            .run(&options)
            .unwrap_err();

        assert!(matches!(err, JitsError::UndefinedStep { .. }));
        assert!(!store.root().exists());
    }

    #[test]
    fn missing_prompt_file_fails_at_its_step() {
        let temp = TempDir::new().unwrap();
        let yaml = r#"
prompts:
  a: { prompt: "make a" }
  b: { prompt_file: prompts/b.txt }
flow:
  - { id: b, after: [a] }
"#;
        let spec = loaded(yaml, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let store = ArtifactStore::new(temp.path(), "generative_spec");
        let mut log = MemoryLogSink::new();

        let err = RunDriver::new(&spec, plan, manual("1\n2\n"), &mut log, store.clone())
            .run(&RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, JitsError::PromptFileNotFound { ref step, .. } if step == "b"));
        assert!(store.response_path("a").exists());
    }

    #[test]
    fn progress_events_follow_execution_order() {
        let temp = TempDir::new().unwrap();
        let spec = loaded(CHAIN, temp.path());
        let plan = RunPlan::prepare(&spec.spec).unwrap();
        let mut log = MemoryLogSink::new();

        let mut started = Vec::new();
        let mut finished = 0;
        RunDriver::new(
            &spec,
            plan,
            manual("1\n2\n3\n"),
            &mut log,
            ArtifactStore::new(temp.path(), "chain"),
        )
        .run_with_progress(&RunOptions::default(), |event| match event {
            RunProgress::StepStarting { id, index, total, .. } => {
                assert_eq!(total, 3);
                started.push((index, id.to_string()));
            }
            RunProgress::StepFinished { .. } => finished += 1,
            _ => {}
        })
        .unwrap();

        assert_eq!(
            started,
            [(0, "a".to_string()), (1, "b".to_string()), (2, "c".to_string())]
        );
        assert_eq!(finished, 3);
    }
}
