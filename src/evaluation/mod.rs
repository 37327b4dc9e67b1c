//! Per-step evaluation scripts.
//!
//! Independent of generation runs: every declared step with an `eval:`
//! block has its test script run as a subprocess from the spec directory.
//! Failures are reported per step and never abort the sweep.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::shell::{is_executable, run_program, split_command, CommandOptions};
use crate::spec::{EvaluationDescriptor, LoadedSpec};

/// Environment variable pointing test scripts at the run's output directory.
pub const RUN_DIR_ENV: &str = "JITS_RUN_DIR";

/// How one evaluation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Script exited with status zero.
    Passed,
    /// Script exited non-zero (`None` if killed by a signal).
    Failed { code: Option<i32> },
    /// Script file does not exist.
    Missing { path: PathBuf },
    /// Script could not be started.
    Errored { message: String },
}

impl EvaluationOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed { code: Some(code) } => write!(f, "failed (exit code {})", code),
            Self::Failed { code: None } => write!(f, "failed (terminated by signal)"),
            Self::Missing { path } => write!(f, "missing test script {}", path.display()),
            Self::Errored { message } => write!(f, "error: {}", message),
        }
    }
}

/// Evaluation result for one step.
#[derive(Debug, Clone)]
pub struct StepEvaluation {
    pub step_id: String,
    pub script: PathBuf,
    pub outcome: EvaluationOutcome,
    /// Captured stdout and stderr.
    pub output: String,
    pub duration: Duration,
}

/// Results of an evaluation sweep, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    pub results: Vec<StepEvaluation>,
}

impl EvaluationReport {
    /// Whether every evaluated step passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_passed())
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Run the evaluation script of every step that declares one.
///
/// `run_dir` is exported to the scripts as [`RUN_DIR_ENV`].
pub fn evaluate(spec: &LoadedSpec, run_dir: &Path) -> EvaluationReport {
    let results = spec
        .spec
        .prompts
        .iter()
        .filter_map(|(id, step)| step.evaluation.as_ref().map(|e| (id, e)))
        .map(|(id, descriptor)| evaluate_step(spec, id, descriptor, run_dir))
        .collect();

    EvaluationReport { results }
}

fn evaluate_step(
    spec: &LoadedSpec,
    step_id: &str,
    descriptor: &EvaluationDescriptor,
    run_dir: &Path,
) -> StepEvaluation {
    let script = spec.resolve(&descriptor.test);
    let mut evaluation = StepEvaluation {
        step_id: step_id.to_string(),
        script: script.clone(),
        outcome: EvaluationOutcome::Passed,
        output: String::new(),
        duration: Duration::ZERO,
    };

    if !script.is_file() {
        evaluation.outcome = EvaluationOutcome::Missing { path: script };
        return evaluation;
    }

    // The child runs from the spec directory, so hand it an absolute path.
    let absolute = script.canonicalize().unwrap_or_else(|_| script.clone());
    let (program, args) = match descriptor.interpreter.as_deref().and_then(split_command) {
        Some((program, mut args)) => {
            args.push(absolute.display().to_string());
            (program, args)
        }
        None if is_executable(&script) => (absolute.display().to_string(), Vec::new()),
        None => {
            evaluation.outcome = EvaluationOutcome::Errored {
                message: format!(
                    "{} is not executable and no interpreter is set",
                    script.display()
                ),
            };
            return evaluation;
        }
    };

    let mut options = CommandOptions {
        cwd: Some(spec.base_dir.clone()),
        ..Default::default()
    };
    options
        .env
        .insert(RUN_DIR_ENV.to_string(), run_dir.display().to_string());

    debug!("Evaluating step '{}' with {}", step_id, program);
    match run_program(&program, &args, &options) {
        Ok(result) => {
            evaluation.output = result.combined_output();
            evaluation.duration = result.duration;
            if !result.success {
                evaluation.outcome = EvaluationOutcome::Failed {
                    code: result.exit_code,
                };
            }
        }
        Err(e) => {
            evaluation.outcome = EvaluationOutcome::Errored {
                message: format!("failed to start {}: {}", program, e),
            };
        }
    }

    evaluation
}
