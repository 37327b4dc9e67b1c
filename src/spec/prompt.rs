//! Prompt text loading.

use std::fs;
use std::path::Path;

use crate::error::{JitsError, Result};
use crate::spec::schema::StepDeclaration;

/// Load the prompt text for a step.
///
/// Inline prompts win over `prompt_file`. File paths are resolved against
/// `base_dir` and the text is trimmed.
///
/// # Errors
///
/// Returns `PromptFileNotFound` when the file is missing, `EmptyPromptFile`
/// when it holds only whitespace and `MissingPrompt` when the step has no
/// usable inline prompt or no source at all.
pub fn load_prompt_text(step_id: &str, step: &StepDeclaration, base_dir: &Path) -> Result<String> {
    let text = match (&step.prompt, &step.prompt_file) {
        (Some(prompt), _) => prompt.clone(),
        (None, Some(file)) => {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };
            let text = fs::read_to_string(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    JitsError::PromptFileNotFound {
                        step: step_id.to_string(),
                        path: path.clone(),
                    }
                } else {
                    JitsError::Io(e)
                }
            })?;
            if text.trim().is_empty() {
                return Err(JitsError::EmptyPromptFile {
                    step: step_id.to_string(),
                    path,
                });
            }
            text
        }
        (None, None) => {
            return Err(JitsError::MissingPrompt {
                step: step_id.to_string(),
            })
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(JitsError::MissingPrompt {
            step: step_id.to_string(),
        });
    }
    Ok(text.to_string())
}
