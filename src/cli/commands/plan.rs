//! Plan command implementation.
//!
//! The `jits plan` command validates a spec and prints its execution order.

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::RunPlan;
use crate::spec::load_spec;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    args: PlanArgs,
}

impl PlanCommand {
    pub fn new(args: PlanArgs) -> Self {
        Self { args }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = load_spec(&self.args.spec)?;
        let plan = RunPlan::prepare(&loaded.spec)?;
        let settings = &plan.settings;

        ui.show_header(&loaded.spec.name);
        ui.message(&format!(
            "integration: {}  flavor: {}  language: {}  model: {}",
            settings.integration, settings.flavor, settings.language, settings.generation.model
        ));

        for (index, id) in plan.order.iter().enumerate() {
            let title = loaded
                .spec
                .prompts
                .get(id)
                .map(|s| s.title.as_str())
                .unwrap_or_default();
            let deps = plan.dependencies_of(id);
            let mut line = format!("{:>3}. {}", index + 1, id);
            if !title.is_empty() {
                line.push_str(&format!(" - {}", title));
            }
            if !deps.is_empty() {
                line.push_str(&format!(" (after {})", deps.join(", ")));
            }
            ui.message(&line);
        }

        ui.success(&format!("{} steps scheduled", plan.order.len()));
        Ok(CommandResult::success())
    }
}
