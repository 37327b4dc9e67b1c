//! Eval command implementation.
//!
//! The `jits eval` command runs the test scripts attached to steps.

use crate::cli::args::EvalArgs;
use crate::error::Result;
use crate::evaluation::{evaluate, EvaluationOutcome};
use crate::spec::{load_spec, validate};
use crate::steps::ArtifactStore;
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The eval command implementation.
pub struct EvalCommand {
    args: EvalArgs,
}

impl EvalCommand {
    pub fn new(args: EvalArgs) -> Self {
        Self { args }
    }
}

impl Command for EvalCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = load_spec(&self.args.spec)?;
        validate(&loaded.spec)?;
        let store = ArtifactStore::new(&self.args.output_dir, &loaded.spec.name);

        ui.show_header(&format!("Evaluating {}", loaded.spec.name));
        let report = evaluate(&loaded, store.root());

        if report.is_empty() {
            ui.warning("No steps declare an eval script");
            return Ok(CommandResult::success());
        }

        for result in &report.results {
            let line = format!(
                "{}: {} ({})",
                result.step_id,
                result.outcome,
                format_duration(result.duration)
            );
            match &result.outcome {
                EvaluationOutcome::Passed => ui.success(&line),
                EvaluationOutcome::Missing { .. } => ui.warning(&line),
                EvaluationOutcome::Failed { .. } | EvaluationOutcome::Errored { .. } => {
                    ui.error(&line);
                    if !result.output.is_empty() && ui.output_mode().shows_detail() {
                        ui.show_block(&format!("Output of {}", result.script.display()), &result.output);
                    }
                }
            }
        }

        let passed = report.passed_count();
        let total = report.results.len();
        if report.all_passed() {
            ui.success(&format!("{}/{} evaluations passed", passed, total));
            Ok(CommandResult::success())
        } else {
            ui.error(&format!("{}/{} evaluations passed", passed, total));
            Ok(CommandResult::failure(1))
        }
    }
}
