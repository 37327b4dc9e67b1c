//! Spec file discovery and loading.

use crate::error::{JitsError, Result};
use crate::spec::schema::SpecFile;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed spec together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    /// Path the spec was read from.
    pub path: PathBuf,

    /// Directory relative paths inside the spec resolve against.
    pub base_dir: PathBuf,

    /// The parsed spec.
    pub spec: SpecFile,
}

impl LoadedSpec {
    /// Wrap an in-memory spec, resolving relative paths against `base_dir`.
    pub fn from_spec(spec: SpecFile, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            path: base_dir.join("<memory>"),
            base_dir,
            spec,
        }
    }

    /// Resolve a path declared in the spec.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Load and parse a spec file.
///
/// # Errors
///
/// Returns `SpecNotFound` if the file doesn't exist.
/// Returns `SpecParseError` if the YAML is invalid.
pub fn load_spec(path: &Path) -> Result<LoadedSpec> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            JitsError::SpecNotFound {
                path: path.to_path_buf(),
            }
        } else {
            JitsError::Io(e)
        }
    })?;

    let spec = parse_spec(&content, path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    tracing::debug!(
        "Loaded spec '{}' with {} steps from {}",
        spec.name,
        spec.prompts.len(),
        path.display()
    );

    Ok(LoadedSpec {
        path: path.to_path_buf(),
        base_dir,
        spec,
    })
}

/// Parse YAML content into a [`SpecFile`].
///
/// `source_path` is only used for error reporting.
pub fn parse_spec(content: &str, source_path: &Path) -> Result<SpecFile> {
    // An empty document deserializes to unit, not a map.
    if content.trim().is_empty() {
        return Ok(SpecFile::default());
    }

    serde_yaml::from_str(content).map_err(|e| JitsError::SpecParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
