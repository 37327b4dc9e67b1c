//! Rendering of run progress events.

use std::time::Duration;

use crate::backend::BackendMode;
use crate::runner::RunProgress;
use crate::steps::FormatOutcome;

use super::{SpinnerHandle, UserInterface};

/// Turns [`RunProgress`] events into UI output.
///
/// Automated steps get a spinner while the backend is working. Manual
/// steps show the assembled prompt so the operator can answer it.
pub struct RunReporter<'a> {
    ui: &'a mut dyn UserInterface,
    spinner: Option<Box<dyn SpinnerHandle>>,
}

impl<'a> RunReporter<'a> {
    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui, spinner: None }
    }

    /// Render one event.
    pub fn handle(&mut self, event: RunProgress<'_>) {
        match event {
            RunProgress::StepStarting {
                id,
                title,
                index,
                total,
            } => {
                let label = if title.is_empty() || title == id {
                    id.to_string()
                } else {
                    format!("{} - {}", id, title)
                };
                self.ui.show_progress(index + 1, total, &label);
            }
            RunProgress::PromptReady { id, prompt, mode } => match mode {
                BackendMode::Manual => {
                    self.ui.show_block(&format!("Prompt for {}", id), prompt);
                    self.ui.message("Enter the response on one line:");
                }
                BackendMode::Automated => {
                    if self.ui.output_mode().shows_prompts() {
                        self.ui.show_block(&format!("Prompt for {}", id), prompt);
                    }
                    self.spinner = Some(self.ui.start_spinner(&format!("Generating {}...", id)));
                }
            },
            RunProgress::StepFinished { id, outcome } => {
                let msg = format!("{} ({})", id, format_duration(outcome.duration));
                match self.spinner.take() {
                    Some(mut spinner) => spinner.finish_success(&msg),
                    None => self.ui.success(&msg),
                }
                if self.ui.output_mode().shows_detail() {
                    self.ui
                        .message(&format!("  saved {}", outcome.response_path.display()));
                }
                if let Some(format) = &outcome.format {
                    self.report_format(id, format);
                }
            }
            RunProgress::StepFailed { id, error } => {
                let msg = format!("{}: {}", id, error);
                match self.spinner.take() {
                    Some(mut spinner) => spinner.finish_error(&msg),
                    None => self.ui.error(&msg),
                }
            }
            RunProgress::StepSkipped { id, reused } => {
                let msg = if reused {
                    format!("{} (skipped, using previous response)", id)
                } else {
                    format!("{} (skipped)", id)
                };
                self.ui.skipped(&msg);
            }
        }
    }

    fn report_format(&mut self, id: &str, outcome: &FormatOutcome) {
        match outcome {
            FormatOutcome::Formatted { tool } => {
                if self.ui.output_mode().shows_detail() {
                    self.ui.message(&format!("  formatted with {}", tool));
                }
            }
            FormatOutcome::Skipped { reason } => {
                self.ui
                    .warning(&format!("Module for {} not formatted: {}", id, reason));
            }
            FormatOutcome::Failed { tool, message } => {
                self.ui
                    .warning(&format!("{} failed on module for {}: {}", tool, id, message));
            }
        }
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ResponseOrigin;
    use crate::error::JitsError;
    use crate::steps::{StepArtifact, StepOutcome};
    use crate::ui::{MockUI, OutputMode};
    use std::path::PathBuf;

    fn outcome(format: Option<FormatOutcome>) -> StepOutcome {
        StepOutcome {
            step_id: "a".into(),
            artifact: StepArtifact::new("x"),
            origin: ResponseOrigin::Generated,
            response_path: PathBuf::from("outputs/run/a_response.md"),
            format,
            duration: Duration::from_millis(250),
        }
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn automated_step_uses_spinner() {
        let mut ui = MockUI::new();
        {
            let mut reporter = RunReporter::new(&mut ui);
            reporter.handle(RunProgress::PromptReady {
                id: "a",
                prompt: "p",
                mode: BackendMode::Automated,
            });
            let done = outcome(None);
            reporter.handle(RunProgress::StepFinished {
                id: "a",
                outcome: &done,
            });
        }

        assert_eq!(ui.spinners(), ["Generating a..."]);
        assert!(ui.blocks().is_empty());
        assert!(ui.successes().is_empty());
        assert!(ui.messages()[0].contains("a_response.md"));
    }

    #[test]
    fn verbose_automated_step_shows_prompt() {
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        RunReporter::new(&mut ui).handle(RunProgress::PromptReady {
            id: "a",
            prompt: "write it",
            mode: BackendMode::Automated,
        });
        assert_eq!(ui.blocks()[0].1, "write it");
    }

    #[test]
    fn manual_step_shows_prompt_block() {
        let mut ui = MockUI::new();
        RunReporter::new(&mut ui).handle(RunProgress::PromptReady {
            id: "b",
            prompt: "Use the following code as reference:",
            mode: BackendMode::Manual,
        });

        assert_eq!(ui.blocks()[0].0, "Prompt for b");
        assert!(ui.spinners().is_empty());
    }

    #[test]
    fn manual_finish_reports_success() {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        let done = outcome(None);
        RunReporter::new(&mut ui).handle(RunProgress::StepFinished {
            id: "a",
            outcome: &done,
        });
        assert_eq!(ui.successes(), ["a (250ms)"]);
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn format_problems_are_warnings() {
        let mut ui = MockUI::new();
        let done = outcome(Some(FormatOutcome::Skipped {
            reason: "black not found".into(),
        }));
        RunReporter::new(&mut ui).handle(RunProgress::StepFinished {
            id: "a",
            outcome: &done,
        });
        assert!(ui.warnings()[0].contains("black not found"));
    }

    #[test]
    fn failure_without_spinner_is_error() {
        let mut ui = MockUI::new();
        let error = JitsError::ManualInputClosed { step: "c".into() };
        RunReporter::new(&mut ui).handle(RunProgress::StepFailed {
            id: "c",
            error: &error,
        });
        assert!(ui.errors()[0].starts_with("c: "));
    }

    #[test]
    fn skipped_step_mentions_reuse() {
        let mut ui = MockUI::new();
        RunReporter::new(&mut ui).handle(RunProgress::StepSkipped {
            id: "a",
            reused: true,
        });
        assert!(ui.skips()[0].contains("previous response"));
    }

    #[test]
    fn starting_step_shows_position() {
        let mut ui = MockUI::new();
        RunReporter::new(&mut ui).handle(RunProgress::StepStarting {
            id: "reader",
            title: "Read a file",
            index: 0,
            total: 3,
        });
        assert_eq!(ui.progress(), [(1, 3, "reader - Read a file".to_string())]);
    }
}
