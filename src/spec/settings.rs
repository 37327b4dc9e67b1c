//! Typed run settings.

use crate::backend::GenerationParams;
use crate::context::{Assembler, Flavor, IntegrationStrategy, Language};
use crate::error::{JitsError, Result};
use crate::spec::schema::SettingsConfig;

/// Formatter values that disable the module formatter.
const DISABLED_FORMATTERS: &[&str] = &["", "none", "off"];

/// Settings for one run, parsed from the `settings:` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSettings {
    pub integration: IntegrationStrategy,
    pub flavor: Flavor,
    pub language: Language,
    pub generation: GenerationParams,
    formatter: Option<String>,
}

impl RunSettings {
    /// Parse raw settings.
    ///
    /// # Errors
    ///
    /// Returns `UnknownIntegrationStrategy` for an unsupported `integration`
    /// and `SpecValidationError` for any other invalid value.
    pub fn from_config(config: &SettingsConfig) -> Result<Self> {
        let integration: IntegrationStrategy = config.integration.parse()?;
        let flavor: Flavor = config.flavor.parse()?;
        let language: Language = config.language.parse()?;

        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(JitsError::SpecValidationError {
                message: format!(
                    "temperature must be between 0 and 2, got {}",
                    config.temperature
                ),
            });
        }
        if config.max_tokens == 0 {
            return Err(JitsError::SpecValidationError {
                message: "max_tokens must be greater than 0".to_string(),
            });
        }
        let model = checked_model(&config.model)?;

        Ok(Self {
            integration,
            flavor,
            language,
            generation: GenerationParams {
                model,
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
            formatter: config.formatter.clone(),
        })
    }

    /// Override the response flavor.
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Override the model. A blank name is rejected the same way as in
    /// `settings.model`.
    pub fn with_model(mut self, model: &str) -> Result<Self> {
        self.generation.model = checked_model(model)?;
        Ok(self)
    }

    /// Override the formatter command.
    pub fn with_formatter(mut self, command: impl Into<String>) -> Self {
        self.formatter = Some(command.into());
        self
    }

    /// Formatter command for module files.
    ///
    /// Falls back to the language default; `none` disables formatting.
    pub fn formatter_command(&self) -> Option<String> {
        match self.formatter.as_deref().map(str::trim) {
            Some(cmd) if DISABLED_FORMATTERS.contains(&cmd.to_ascii_lowercase().as_str()) => None,
            Some(cmd) => Some(cmd.to_string()),
            None => Some(self.language.default_formatter().to_string()),
        }
    }

    /// Prompt assembler for these settings.
    pub fn assembler(&self) -> Assembler {
        Assembler::new(self.integration, self.flavor, self.language)
    }
}

fn checked_model(model: &str) -> Result<String> {
    let model = model.trim();
    if model.is_empty() {
        return Err(JitsError::SpecValidationError {
            message: "model must not be empty".to_string(),
        });
    }
    Ok(model.to_string())
}
