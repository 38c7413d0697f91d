use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::sequencer::StateLabel;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/safety-link/config.toml` on Linux, or the
    /// platform equivalent via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("safety-link").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - Otherwise parses it as TOML; missing keys take their defaults.
    ///
    /// Validation is left to the caller so CLI overrides can be applied
    /// first.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The port path is not empty and the baud rate is non-zero
    /// - At least one state label is configured, each a valid label
    /// - `max_cycles`, if set, is non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.port.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Serial port path must not be empty".to_string(),
            });
        }

        if self.link.baud == 0 {
            return Err(ConfigError::ValidationError {
                message: "Baud rate must be greater than zero".to_string(),
            });
        }

        if self.sequence.max_cycles == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "max_cycles must be greater than zero when set".to_string(),
            });
        }

        self.state_labels().map(|_| ())
    }

    /// The configured sequence as validated labels.
    pub fn state_labels(&self) -> Result<Vec<StateLabel>, ConfigError> {
        if self.sequence.states.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "At least one state label must be configured".to_string(),
            });
        }

        self.sequence
            .states
            .iter()
            .map(|s| {
                StateLabel::new(s.as_str()).map_err(|e| ConfigError::ValidationError {
                    message: e.to_string(),
                })
            })
            .collect()
    }
}
