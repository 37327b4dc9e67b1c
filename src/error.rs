//! Error types for jits operations.
//!
//! This module defines [`JitsError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Definition errors (bad spec, bad graph, bad flags) are raised before any
//!   step executes
//! - Per-step and backend errors abort the run where they occur
//! - Use `anyhow::Error` (via `JitsError::Other`) for unexpected errors
//! - Best-effort failures (formatter hook) and evaluation failures are never
//!   surfaced as `JitsError`; they are reported as outcomes

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for jits operations.
#[derive(Debug, Error)]
pub enum JitsError {
    /// Spec file not found at the given location.
    #[error("Spec file not found: {path}")]
    SpecNotFound { path: PathBuf },

    /// Failed to parse the spec file.
    #[error("Failed to parse spec at {path}: {message}")]
    SpecParseError { path: PathBuf, message: String },

    /// Spec is structurally valid YAML but semantically invalid.
    #[error("Invalid spec: {message}")]
    SpecValidationError { message: String },

    /// A flow entry names a step that is not declared in `prompts`.
    #[error("Prompt ID '{step}' in flow not defined in prompts")]
    UndefinedStep { step: String },

    /// Scheduling could not place every declared step.
    #[error("Cycle detected or disconnected graph in flow definition: {detail}")]
    CycleOrDisconnectedGraph { detail: String },

    /// `settings.integration` names an unsupported strategy.
    #[error("Unknown integration mode: {name}")]
    UnknownIntegrationStrategy { name: String },

    /// Both `--auto` and `--manual` were given.
    #[error("Choose only one of --auto or --manual")]
    ConflictingBackendMode,

    /// Neither `--auto` nor `--manual` was given.
    #[error("Specify --auto or --manual to execute prompts")]
    MissingBackendMode,

    /// Automated mode was requested without an API key.
    #[error("OPENAI_API_KEY is not set (export it or pass --api-key)")]
    MissingApiKey,

    /// Step has neither `prompt` nor `prompt_file`.
    #[error("No prompt or prompt_file found for step: {step}")]
    MissingPrompt { step: String },

    /// Step's `prompt_file` does not exist.
    #[error("Prompt file not found for step '{step}': {path}")]
    PromptFileNotFound { step: String, path: PathBuf },

    /// Step's `prompt_file` exists but holds no text. Detected when the step
    /// runs, unlike `MissingPrompt`.
    #[error("Prompt file for step '{step}' is empty: {path}")]
    EmptyPromptFile { step: String, path: PathBuf },

    /// The generation backend failed.
    #[error("Generation backend error ({provider}): {message}")]
    Backend { provider: String, message: String },

    /// Manual mode could not read a response line.
    #[error("No manual input available for step '{step}'")]
    ManualInputClosed { step: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JitsError {
    /// Whether this error is detected before any step executes.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::SpecNotFound { .. }
                | Self::SpecParseError { .. }
                | Self::SpecValidationError { .. }
                | Self::UndefinedStep { .. }
                | Self::CycleOrDisconnectedGraph { .. }
                | Self::UnknownIntegrationStrategy { .. }
                | Self::ConflictingBackendMode
                | Self::MissingBackendMode
                | Self::MissingApiKey
                | Self::MissingPrompt { .. }
        )
    }
}

/// Result type alias for jits operations.
pub type Result<T> = std::result::Result<T, JitsError>;
