//! Best-effort formatting of persisted modules.

use std::path::Path;

use crate::shell::{is_not_found, run_program, split_command, CommandOptions};

/// What happened when a module was handed to the formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The tool ran and exited successfully.
    Formatted { tool: String },
    /// Nothing ran (no tool configured or tool not installed).
    Skipped { reason: String },
    /// The tool ran and failed.
    Failed { tool: String, message: String },
}

/// Post-processing applied to a persisted module. Never fails the run.
pub trait Formatter {
    fn format(&self, path: &Path) -> FormatOutcome;
}

/// Runs an external command on the module file.
///
/// The command is split on whitespace; a `{file}` argument is replaced by
/// the module path, otherwise the path is appended.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    command: String,
}

impl ExternalFormatter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Formatter for ExternalFormatter {
    fn format(&self, path: &Path) -> FormatOutcome {
        let Some((program, mut args)) = split_command(&self.command) else {
            return FormatOutcome::Skipped {
                reason: "empty formatter command".to_string(),
            };
        };

        let file = path.display().to_string();
        let mut substituted = false;
        for arg in args.iter_mut() {
            if arg.as_str() == "{file}" {
                *arg = file.clone();
                substituted = true;
            }
        }
        if !substituted {
            args.push(file);
        }

        match run_program(&program, &args, &CommandOptions::default()) {
            Ok(result) if result.success => FormatOutcome::Formatted { tool: program },
            Ok(result) => FormatOutcome::Failed {
                message: format!(
                    "exited with code {:?}: {}",
                    result.exit_code,
                    result.combined_output()
                ),
                tool: program,
            },
            Err(e) if is_not_found(&e) => FormatOutcome::Skipped {
                reason: format!("{} not found", program),
            },
            Err(e) => FormatOutcome::Failed {
                tool: program,
                message: e.to_string(),
            },
        }
    }
}
