//! Spec file loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//! - Validation in [`validator`]
//! - Typed settings in [`settings`]
//! - Prompt text loading in [`prompt`]
//!
//! # Example
//!
//! ```
//! use jits::spec::{parse_spec, validate};
//! use std::path::Path;
//!
//! let yaml = "name: demo\nprompts:\n  a:\n    title: A\n    prompt: Write a parser\n";
//! let spec = parse_spec(yaml, Path::new("demo.yml")).unwrap();
//! let settings = validate(&spec).unwrap();
//! assert_eq!(settings.generation.model, "gpt-4");
//! ```

pub mod loader;
pub mod prompt;
pub mod schema;
pub mod settings;
pub mod validator;

pub use loader::{load_spec, parse_spec, LoadedSpec};
pub use prompt::load_prompt_text;
pub use schema::{
    EvaluationDescriptor, FlowEntry, SettingsConfig, SpecFile, StepDeclaration, DEFAULT_RUN_NAME,
};
pub use settings::RunSettings;
pub use validator::{validate, validate_spec, ValidationError};
