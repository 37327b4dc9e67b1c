//! Run-wide prompt shaping choices.

use std::fmt;
use std::str::FromStr;

use crate::error::JitsError;

/// How a dependent step's prompt incorporates prior outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationStrategy {
    /// Paste dependency outputs into the prompt as labeled reference code.
    #[default]
    Inline,
    /// Reference dependencies through synthetic import statements and
    /// persist each output as an importable module.
    Module,
}

impl IntegrationStrategy {
    /// Whether step outputs are also persisted as modules.
    pub fn writes_modules(&self) -> bool {
        matches!(self, Self::Module)
    }
}

impl FromStr for IntegrationStrategy {
    type Err = JitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inline" => Ok(Self::Inline),
            "module" => Ok(Self::Module),
            other => Err(JitsError::UnknownIntegrationStrategy {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for IntegrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// What kind of response a run expects from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    /// Store responses verbatim.
    #[default]
    Freeform,
    /// Ask for code only and extract fenced code from responses.
    Code,
}

impl FromStr for Flavor {
    type Err = JitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "freeform" => Ok(Self::Freeform),
            "code" => Ok(Self::Code),
            other => Err(JitsError::SpecValidationError {
                message: format!("unknown flavor '{}' (expected freeform or code)", other),
            }),
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Freeform => write!(f, "freeform"),
            Self::Code => write!(f, "code"),
        }
    }
}

/// Language of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    TypeScript,
    Rust,
}

impl Language {
    /// Info string for markdown code fences.
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
        }
    }

    /// File extension for persisted modules.
    pub fn module_extension(&self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::JavaScript => "js",
            Self::TypeScript => "ts",
            Self::Rust => "rs",
        }
    }

    /// Synthetic import statement referencing the module of step `id`.
    pub fn import_statement(&self, id: &str) -> String {
        match self {
            Self::Python => format!("from {} import *", id),
            Self::JavaScript | Self::TypeScript => {
                format!("import * as {} from \"./{}\";", id, id)
            }
            Self::Rust => format!("use crate::{}::*;", id),
        }
    }

    /// Formatter command run on persisted modules when none is configured.
    pub fn default_formatter(&self) -> &'static str {
        match self {
            Self::Python => "black",
            Self::JavaScript | Self::TypeScript => "prettier --write",
            Self::Rust => "rustfmt",
        }
    }
}

impl FromStr for Language {
    type Err = JitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" => Ok(Self::JavaScript),
            "typescript" | "ts" => Ok(Self::TypeScript),
            "rust" | "rs" => Ok(Self::Rust),
            other => Err(JitsError::SpecValidationError {
                message: format!("unsupported language '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fence_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_known_values() {
        assert_eq!(
            "inline".parse::<IntegrationStrategy>().unwrap(),
            IntegrationStrategy::Inline
        );
        assert_eq!(
            "module".parse::<IntegrationStrategy>().unwrap(),
            IntegrationStrategy::Module
        );
    }

    #[test]
    fn strategy_rejects_unknown_value() {
        let err = "symlink".parse::<IntegrationStrategy>().unwrap_err();
        assert!(matches!(
            err,
            JitsError::UnknownIntegrationStrategy { ref name } if name == "symlink"
        ));
    }

    #[test]
    fn strategy_is_case_sensitive() {
        assert!("Inline".parse::<IntegrationStrategy>().is_err());
    }

    #[test]
    fn only_module_strategy_writes_modules() {
        assert!(IntegrationStrategy::Module.writes_modules());
        assert!(!IntegrationStrategy::Inline.writes_modules());
    }

    #[test]
    fn flavor_parses() {
        assert_eq!("code".parse::<Flavor>().unwrap(), Flavor::Code);
        assert_eq!("Freeform".parse::<Flavor>().unwrap(), Flavor::Freeform);
        assert!("poetry".parse::<Flavor>().is_err());
    }

    #[test]
    fn language_aliases() {
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("TS".parse::<Language>().unwrap(), Language::TypeScript);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn python_imports_and_extension() {
        assert_eq!(Language::Python.import_statement("a"), "from a import *");
        assert_eq!(Language::Python.module_extension(), "py");
    }

    #[test]
    fn other_language_imports() {
        assert_eq!(
            Language::JavaScript.import_statement("util"),
            "import * as util from \"./util\";"
        );
        assert_eq!(Language::Rust.import_statement("util"), "use crate::util::*;");
    }
}
