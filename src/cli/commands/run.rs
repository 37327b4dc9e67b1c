//! Run command implementation.
//!
//! The `jits run` command executes every step of a spec.

use crate::backend::{
    stdin_line_source, AutomatedBackend, Backend, BackendMode, ManualBackend, OpenAiBackend,
};
use crate::cli::args::RunArgs;
use crate::context::Flavor;
use crate::error::{JitsError, Result};
use crate::runner::{RunDriver, RunOptions, RunPlan};
use crate::spec::load_spec;
use crate::steps::{ArtifactStore, FileLogSink};
use crate::ui::{format_duration, RunReporter, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn build_options(&self) -> RunOptions {
        RunOptions {
            skip: self
                .args
                .skip
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    fn build_backend(&self, mode: BackendMode, plan: &RunPlan) -> Result<Backend> {
        match mode {
            BackendMode::Manual => Ok(Backend::Manual(ManualBackend::new(stdin_line_source()))),
            BackendMode::Automated => {
                let api_key = self
                    .args
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .ok_or(JitsError::MissingApiKey)?;
                let client = OpenAiBackend::new(api_key, self.args.base_url.clone())?;
                Ok(Backend::Automated(AutomatedBackend::new(
                    Box::new(client),
                    plan.settings.generation.clone(),
                    plan.settings.flavor,
                )))
            }
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mode = BackendMode::from_flags(self.args.auto, self.args.manual)?;
        let loaded = load_spec(&self.args.spec)?;

        let mut plan = RunPlan::prepare(&loaded.spec)?;
        if let Some(flavor) = &self.args.flavor {
            plan.settings = plan.settings.with_flavor(flavor.parse::<Flavor>()?);
        }
        if let Some(model) = &self.args.model {
            plan.settings = plan.settings.with_model(model)?;
        }

        let backend = self.build_backend(mode, &plan)?;
        let store = ArtifactStore::new(&self.args.output_dir, &loaded.spec.name);
        let mut log = FileLogSink::new(store.logs_dir());

        ui.show_header(&format!(
            "{} · {} steps · {} mode · {} integration",
            loaded.spec.name,
            plan.order.len(),
            mode,
            plan.settings.integration
        ));

        let options = self.build_options();
        let mut driver = RunDriver::new(&loaded, plan, backend, &mut log, store);
        let result = {
            let mut reporter = RunReporter::new(ui);
            driver.run_with_progress(&options, |event| reporter.handle(event))?
        };

        ui.success(&format!(
            "Run '{}' complete: {} executed, {} skipped in {}",
            result.name,
            result.executed.len(),
            result.skipped.len(),
            format_duration(result.duration)
        ));
        ui.message(&format!("Outputs in {}", driver.output_dir().display()));

        Ok(CommandResult::success())
    }
}
