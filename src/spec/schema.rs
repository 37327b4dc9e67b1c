//! Spec file schema definitions.
//!
//! These structs map one-to-one onto the YAML spec format. Values are kept
//! raw here (strings for enumerations); [`RunSettings`](super::RunSettings)
//! turns them into typed settings and reports unknown values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run name used when the spec omits `name`.
pub const DEFAULT_RUN_NAME: &str = "generative_spec";

/// Root structure of a spec file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecFile {
    /// Logical run name; names the output directory.
    pub name: String,

    /// Run-level settings.
    pub settings: SettingsConfig,

    /// Step declarations keyed by id, in declaration order.
    pub prompts: IndexMap<String, StepDeclaration>,

    /// Ordering constraints.
    pub flow: Vec<FlowEntry>,
}

impl Default for SpecFile {
    fn default() -> Self {
        Self {
            name: DEFAULT_RUN_NAME.to_string(),
            settings: SettingsConfig::default(),
            prompts: IndexMap::new(),
            flow: Vec::new(),
        }
    }
}

/// Raw `settings:` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Context integration strategy: `inline` or `module`.
    pub integration: String,

    /// Model identifier passed to the generation backend.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Token ceiling for each response.
    pub max_tokens: u32,

    /// Response flavor: `freeform` or `code`.
    pub flavor: String,

    /// Language of generated code.
    pub language: String,

    /// Formatter command overriding the language default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            integration: "inline".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.5,
            max_tokens: 800,
            flavor: "freeform".to_string(),
            language: "python".to_string(),
            formatter: None,
        }
    }
}

/// A single step declaration under `prompts:`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepDeclaration {
    /// Human-readable title.
    pub title: String,

    /// Inline prompt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Path to a file holding the prompt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<PathBuf>,

    /// Evaluation hook for this step.
    #[serde(rename = "eval", skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationDescriptor>,
}

impl StepDeclaration {
    /// Create a step with an inline prompt.
    pub fn inline(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }
}

/// Test script attached to a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDescriptor {
    /// Script path, relative to the spec directory.
    pub test: PathBuf,

    /// Program used to run the script (e.g. `python`). When absent the
    /// script is executed directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
}

/// One entry of the `flow:` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEntry {
    /// The dependent step.
    pub id: String,

    /// Steps that must run before it.
    #[serde(default)]
    pub after: Vec<String>,
}

impl FlowEntry {
    /// Create a flow entry.
    pub fn new(id: impl Into<String>, after: &[&str]) -> Self {
        Self {
            id: id.into(),
            after: after.iter().map(|s| s.to_string()).collect(),
        }
    }
}
