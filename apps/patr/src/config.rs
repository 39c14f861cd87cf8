//! # Configuration
//!
//! `patr.toml` holds evaluation defaults and the log format. Every key is
//! optional; a missing file yields the defaults.
//!
//! ```toml
//! [evaluation]
//! quick_check = true
//! add_wildcards = false
//!
//! [log]
//! format = "json"
//! ```

use patr_core::EvaluatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PatrConfig {
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// `[evaluation]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Pre-filter candidates before cloning.
    pub quick_check: bool,

    /// Give every constrained slot without candidates a wildcard column.
    pub add_wildcards: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            quick_check: true,
            add_wildcards: false,
        }
    }
}

impl EvaluationConfig {
    /// The engine settings this section maps to.
    pub fn evaluator(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            quick_check: self.quick_check,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse the value of `PATR_LOG_FORMAT`. Unknown names give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl PatrConfig {
    /// Loads configuration from `path`, or the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or is invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PatrConfig::from_toml_str("").expect("parse");
        assert_eq!(config, PatrConfig::default());
        assert!(config.evaluation.quick_check);
        assert!(!config.evaluation.add_wildcards);
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn sections_override_defaults() {
        let config = PatrConfig::from_toml_str(
            "[evaluation]\nquick_check = false\n\n[log]\nformat = \"json\"\n",
        )
        .expect("parse");
        assert!(!config.evaluation.quick_check);
        assert!(!config.evaluation.add_wildcards);
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(!config.evaluation.evaluator().quick_check);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let result = PatrConfig::from_toml_str("[log]\nformat = \"xml\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn log_format_names() {
        assert_eq!(LogFormat::from_name("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_name("text"), Some(LogFormat::Text));
        assert_eq!(LogFormat::from_name("yaml"), None);
    }
}
