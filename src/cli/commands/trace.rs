//! Trace command implementation.
//!
//! The `jits trace` command prints the step logs of a previous run.

use std::fs;

use crate::cli::args::TraceArgs;
use crate::error::Result;
use crate::spec::load_spec;
use crate::steps::{list_logs, ArtifactStore};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The trace command implementation.
pub struct TraceCommand {
    args: TraceArgs,
}

impl TraceCommand {
    pub fn new(args: TraceArgs) -> Self {
        Self { args }
    }
}

impl Command for TraceCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = load_spec(&self.args.spec)?;
        let store = ArtifactStore::new(&self.args.output_dir, &loaded.spec.name);
        let logs_dir = store.logs_dir();

        if !logs_dir.is_dir() {
            ui.error(&format!(
                "No logs found for run '{}' at {}",
                loaded.spec.name,
                logs_dir.display()
            ));
            return Ok(CommandResult::failure(1));
        }

        let logs = list_logs(&logs_dir)?;
        if logs.is_empty() {
            ui.warning(&format!("Log directory {} is empty", logs_dir.display()));
            return Ok(CommandResult::success());
        }

        for path in &logs {
            let title = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let body = fs::read_to_string(path)?;
            ui.show_block(&title, &body);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_spec(dir: &Path) -> std::path::PathBuf {
        let spec = dir.join("spec.yml");
        fs::write(&spec, "name: demo\nprompts:\n  a: { prompt: x }\n").unwrap();
        spec
    }

    #[test]
    fn prints_logs_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        let spec = write_spec(temp.path());
        let out = temp.path().join("out");
        let logs = out.join("demo/logs");
        fs::create_dir_all(&logs).unwrap();
        fs::write(logs.join("b.log"), "second").unwrap();
        fs::write(logs.join("a.log"), "first").unwrap();

        let mut ui = MockUI::new();
        let result = TraceCommand::new(TraceArgs {
            spec,
            output_dir: out,
        })
        .execute(&mut ui)
        .unwrap();

        assert!(result.success);
        assert_eq!(
            ui.blocks(),
            [
                ("a.log".to_string(), "first".to_string()),
                ("b.log".to_string(), "second".to_string())
            ]
        );
    }

    #[test]
    fn missing_log_dir_fails() {
        let temp = TempDir::new().unwrap();
        let spec = write_spec(temp.path());

        let mut ui = MockUI::new();
        let result = TraceCommand::new(TraceArgs {
            spec,
            output_dir: temp.path().join("out"),
        })
        .execute(&mut ui)
        .unwrap();

        assert_eq!(result, CommandResult::failure(1));
        assert!(ui.errors()[0].contains("No logs found"));
    }

    #[test]
    fn empty_log_dir_warns() {
        let temp = TempDir::new().unwrap();
        let spec = write_spec(temp.path());
        let out = temp.path().join("out");
        fs::create_dir_all(out.join("demo/logs")).unwrap();

        let mut ui = MockUI::new();
        let result = TraceCommand::new(TraceArgs {
            spec,
            output_dir: out,
        })
        .execute(&mut ui)
        .unwrap();

        assert!(result.success);
        assert_eq!(ui.warnings().len(), 1);
    }
}
