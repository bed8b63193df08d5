//! Muban configuration
//!
//! The engine is configured from a small TOML document:
//!
//! ```toml
//! [symbols]
//! eager_constraint_resolution = true
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Missing sections and keys fall back to their defaults.
//!
//! # Usage
//!
//! ```rust
//! use muban::util::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("[symbols]\neager_constraint_resolution = true").unwrap();
//! assert!(config.symbols.eager_constraint_resolution);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::util::logger::LogLevel;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Symbol table settings
    #[serde(default)]
    pub symbols: SymbolConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Symbol table configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SymbolConfig {
    /// Resolve every template parameter's bounds in `finish_declarations`
    /// instead of on first query
    #[serde(default)]
    pub eager_constraint_resolution: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level emitted by `util::logger`
    #[serde(default)]
    pub level: LogLevel,
}

impl EngineConfig {
    /// Parse a configuration document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseError)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Load configuration from a file
/// Returns default config if file doesn't exist
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
    EngineConfig::from_toml_str(&content)
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Config serialize error: {0}")]
    SerializeError(toml::ser::Error),
}
