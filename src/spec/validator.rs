//! Spec validation rules.
//!
//! - The run name and every step id must be usable as a file name
//! - Each step declares exactly one prompt source
//! - Evaluation descriptors name a script
//! - Settings parse into [`RunSettings`](super::RunSettings)
//!
//! Graph-level problems (undefined ids, cycles) are left to the graph
//! builder and scheduler.

use crate::error::{JitsError, Result};
use crate::spec::schema::SpecFile;
use crate::spec::settings::RunSettings;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    /// Human-readable error message
    pub message: String,
    /// Step id if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &'static str, message: String, step: Option<&str>) -> Self {
        Self {
            rule,
            message,
            step: step.map(str::to_string),
        }
    }
}

/// Validate a spec and return all structural errors.
///
/// Collects every problem rather than stopping at the first one.
pub fn validate_spec(spec: &SpecFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(problem) = file_name_problem(&spec.name) {
        errors.push(ValidationError::new(
            "invalid-name",
            format!("Run name '{}' {}", spec.name, problem),
            None,
        ));
    }

    for (id, step) in &spec.prompts {
        if let Some(problem) = file_name_problem(id) {
            errors.push(ValidationError::new(
                "invalid-step-id",
                format!("Step id '{}' {}", id, problem),
                Some(id),
            ));
        }

        if step.prompt.is_some() && step.prompt_file.is_some() {
            errors.push(ValidationError::new(
                "ambiguous-prompt",
                format!("Step '{}' must have only one of 'prompt' or 'prompt_file'", id),
                Some(id),
            ));
        }

        if let Some(eval) = &step.evaluation {
            if eval.test.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    "empty-eval-test",
                    format!("Step '{}' has an eval block without a test script", id),
                    Some(id),
                ));
            }
        }
    }

    errors
}

/// Validate a spec, failing on the first class of error found.
///
/// # Errors
///
/// Returns `MissingPrompt` for a step without a prompt source, the settings
/// error for invalid settings, and `SpecValidationError` with every
/// structural problem otherwise.
pub fn validate(spec: &SpecFile) -> Result<RunSettings> {
    for (id, step) in &spec.prompts {
        let blank_inline = step.prompt.as_deref().is_some_and(|p| p.trim().is_empty());
        if (step.prompt.is_none() && step.prompt_file.is_none()) || blank_inline {
            return Err(JitsError::MissingPrompt { step: id.clone() });
        }
    }

    let errors = validate_spec(spec);
    if !errors.is_empty() {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        return Err(JitsError::SpecValidationError {
            message: messages.join("; "),
        });
    }

    RunSettings::from_config(&spec.settings)
}

fn file_name_problem(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("is not a valid file name")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::schema::{EvaluationDescriptor, StepDeclaration};
    use std::path::PathBuf;

    fn spec_with(steps: &[(&str, StepDeclaration)]) -> SpecFile {
        let mut spec = SpecFile::default();
        for (id, step) in steps {
            spec.prompts.insert(id.to_string(), step.clone());
        }
        spec
    }

    #[test]
    fn valid_spec_passes() {
        let spec = spec_with(&[("a", StepDeclaration::inline("A", "do a"))]);
        assert!(validate_spec(&spec).is_empty());
        assert!(validate(&spec).is_ok());
    }

    #[test]
    fn empty_spec_is_valid() {
        assert!(validate(&SpecFile::default()).is_ok());
    }

    #[test]
    fn step_without_prompt_is_missing_prompt() {
        let spec = spec_with(&[("a", StepDeclaration::default())]);
        let err = validate(&spec).unwrap_err();
        assert!(matches!(err, JitsError::MissingPrompt { ref step } if step == "a"));
    }

    #[test]
    fn blank_inline_prompt_is_missing_prompt() {
        let spec = spec_with(&[("a", StepDeclaration::inline("A", "   "))]);
        assert!(matches!(
            validate(&spec).unwrap_err(),
            JitsError::MissingPrompt { .. }
        ));
    }

    #[test]
    fn both_prompt_sources_are_rejected() {
        let mut step = StepDeclaration::inline("A", "do a");
        step.prompt_file = Some(PathBuf::from("a.txt"));
        let spec = spec_with(&[("a", step)]);

        let errors = validate_spec(&spec);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "ambiguous-prompt");
        assert_eq!(errors[0].step.as_deref(), Some("a"));
    }

    #[test]
    fn path_like_ids_are_rejected() {
        let spec = spec_with(&[
            ("../escape", StepDeclaration::inline("A", "x")),
            ("ok", StepDeclaration::inline("B", "y")),
        ]);
        let errors = validate_spec(&spec);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "invalid-step-id");
    }

    #[test]
    fn invalid_run_name_is_rejected() {
        let mut spec = SpecFile::default();
        spec.name = "a/b".into();
        let err = validate(&spec).unwrap_err();
        assert!(err.to_string().contains("path separators"));
    }

    #[test]
    fn empty_eval_test_is_rejected() {
        let mut step = StepDeclaration::inline("A", "x");
        step.evaluation = Some(EvaluationDescriptor {
            test: PathBuf::new(),
            interpreter: None,
        });
        let errors = validate_spec(&spec_with(&[("a", step)]));
        assert_eq!(errors[0].rule, "empty-eval-test");
    }

    #[test]
    fn errors_are_joined() {
        let mut spec = spec_with(&[("a/b", StepDeclaration::inline("A", "x"))]);
        spec.name = "..".into();
        let err = validate(&spec).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Run name"));
        assert!(msg.contains("Step id"));
    }

    #[test]
    fn settings_errors_surface() {
        let mut spec = spec_with(&[("a", StepDeclaration::inline("A", "x"))]);
        spec.settings.integration = "carrier-pigeon".into();
        assert!(matches!(
            validate(&spec).unwrap_err(),
            JitsError::UnknownIntegrationStrategy { .. }
        ));
    }
}
