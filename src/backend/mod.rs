//! Response backends.
//!
//! A run gets its step responses from exactly one of two places, chosen once
//! before any step executes:
//!
//! - [`Backend::Automated`] sends prompts to a [`GenerationBackend`]
//! - [`Backend::Manual`] reads one line of operator input per step
//!
//! # Example
//!
//! ```
//! use jits::backend::{Backend, ManualBackend, ReaderLineSource};
//! use std::io::Cursor;
//!
//! let source = ReaderLineSource::new(Cursor::new("x = 1\n"));
//! let mut backend = Backend::Manual(ManualBackend::new(Box::new(source)));
//! let response = backend.respond("a", "write x").unwrap();
//! assert_eq!(response.text, "x = 1");
//! ```

pub mod extract;
pub mod manual;
pub mod openai;

pub use extract::extract_code;
pub use manual::{stdin_line_source, LineSource, ReaderLineSource, TerminalLineSource};
pub use openai::{OpenAiBackend, DEFAULT_BASE_URL};

use std::fmt;

use crate::context::Flavor;
use crate::error::{JitsError, Result};

/// System message sent with every automated request.
pub const SYSTEM_PROMPT: &str = "You are a helpful software assistant.";

/// Run-level generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.5,
            max_tokens: 800,
        }
    }
}

/// One call to a generation backend.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub params: &'a GenerationParams,
}

/// A text-generation service.
///
/// Any error returned is fatal to the run.
pub trait GenerationBackend {
    /// Short provider name for messages.
    fn name(&self) -> &str;

    /// Generate a response for `request`.
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Which backend a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Automated,
    Manual,
}

impl BackendMode {
    /// Resolve the mode from the `--auto` / `--manual` flags.
    ///
    /// Exactly one flag must be set.
    pub fn from_flags(auto: bool, manual: bool) -> Result<Self> {
        match (auto, manual) {
            (true, false) => Ok(Self::Automated),
            (false, true) => Ok(Self::Manual),
            (true, true) => Err(JitsError::ConflictingBackendMode),
            (false, false) => Err(JitsError::MissingBackendMode),
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automated => write!(f, "automated"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    Generated,
    Manual,
}

/// A step response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Text as received, before any extraction.
    pub raw: String,
    /// Text to store as the step's artifact.
    pub text: String,
    pub origin: ResponseOrigin,
}

/// Automated responses from a generation service.
pub struct AutomatedBackend {
    client: Box<dyn GenerationBackend>,
    params: GenerationParams,
    flavor: Flavor,
}

impl AutomatedBackend {
    pub fn new(client: Box<dyn GenerationBackend>, params: GenerationParams, flavor: Flavor) -> Self {
        Self {
            client,
            params,
            flavor,
        }
    }

    /// Parameters sent with every request.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    fn respond(&self, prompt: &str) -> Result<Response> {
        let request = GenerationRequest {
            system: SYSTEM_PROMPT,
            prompt,
            params: &self.params,
        };
        let raw = self.client.generate(&request)?;
        let text = match self.flavor {
            Flavor::Freeform => raw.trim().to_string(),
            Flavor::Code => extract_code(&raw),
        };
        Ok(Response {
            raw,
            text,
            origin: ResponseOrigin::Generated,
        })
    }
}

/// Operator-typed responses.
pub struct ManualBackend {
    input: Box<dyn LineSource>,
}

impl ManualBackend {
    pub fn new(input: Box<dyn LineSource>) -> Self {
        Self { input }
    }

    fn respond(&mut self, step_id: &str) -> Result<Response> {
        let line = self
            .input
            .read_line()?
            .ok_or_else(|| JitsError::ManualInputClosed {
                step: step_id.to_string(),
            })?;
        Ok(Response {
            raw: line.clone(),
            text: line,
            origin: ResponseOrigin::Manual,
        })
    }
}

/// The backend chosen for a run.
pub enum Backend {
    Automated(AutomatedBackend),
    Manual(ManualBackend),
}

impl Backend {
    /// The mode this backend implements.
    pub fn mode(&self) -> BackendMode {
        match self {
            Self::Automated(_) => BackendMode::Automated,
            Self::Manual(_) => BackendMode::Manual,
        }
    }

    /// Obtain the response for one step.
    pub fn respond(&mut self, step_id: &str, prompt: &str) -> Result<Response> {
        match self {
            Self::Automated(backend) => backend.respond(prompt),
            Self::Manual(backend) => backend.respond(step_id),
        }
    }
}
