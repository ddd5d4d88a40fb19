//! Core error types for fallquiz-core.
//!
//! Only session startup, configuration and question-bank loading can fail.
//! Everything that happens inside a running session degrades to a no-op
//! instead of surfacing an error, so none of these variants are produced
//! by `answer()`, `pause()` or the power-up calls.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fallquiz-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// `start()` was given no questions.
    #[error("Cannot start a session with an empty question set")]
    EmptyQuestionSet,

    /// A question failed validation at startup or bank load.
    #[error("Invalid question '{id}': {reason}")]
    InvalidQuestion { id: String, reason: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
