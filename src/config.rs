use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// Title shown when a query document has no `:title`.
pub const DEFAULT_TITLE: &str = "Advanced Query";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which shape the runner serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// Bare raw tuples for a query-only document, the full structure otherwise
    #[default]
    Auto,
    /// Always `{results, metadata, rawResults}`
    Full,
    /// Only the transformed results
    Results,
}

/// Runner settings.
///
/// ```toml
/// default_title = "Query"
/// output = "full"
/// pretty = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    pub default_title: String,
    pub output: OutputShape,
    pub pretty: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            default_title: DEFAULT_TITLE.to_string(),
            output: OutputShape::Auto,
            pretty: true,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
