//! Shared error type for Reelrank crates

use thiserror::Error;

/// Errors raised by the shared core utilities
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value is missing, unparsable or out of range
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable the error refers to, if any
        key: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}

impl CoreError {
    /// Build a configuration error tied to an environment variable
    pub fn config(message: impl Into<String>, key: &str) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Whether this error should abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigurationError { .. })
    }
}
