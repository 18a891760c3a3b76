use std::fs;
use std::path::{Path, PathBuf};

use course_core::GateOptions;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config validation failed: {message}")]
    Validation { message: String },
}

/// Settings read from `config.toml`.
///
/// ```toml
/// database_url = "sqlite:///home/me/progress.sqlite3"
///
/// [gate]
/// require_correct_to_complete = true
/// lock_scenarios_until_lessons_done = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub gate: GateOptions,
}

impl AppConfig {
    /// `<config_dir>/course-runner/config.toml`, or the working directory
    /// when the platform has no config dir.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("course-runner").join("config.toml")
    }

    /// Load and validate a config file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for a blank `database_url`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .database_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation {
                message: "database_url must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
