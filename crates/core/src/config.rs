//! Shared configuration loading for Reelrank crates
//!
//! Every service configuration is read from environment variables with the
//! `REELRANK_` prefix. A `.env` file in the working directory is honoured
//! through dotenvy, so the override order is: defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use reelrank_core::config::{load_dotenv, parse_env_var};
//!
//! load_dotenv();
//! let top_n: usize = parse_env_var("REELRANK_DEFAULT_TOP_N", 3).unwrap();
//! assert!(top_n > 0);
//! ```

use crate::error::CoreError;
use std::ops::RangeInclusive;
use url::Url;

/// Configuration loader trait
///
/// Implementors read their values from the environment and check them
/// before the process starts serving.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a required variable is missing or
    /// a value cannot be parsed.
    fn from_env() -> Result<Self, CoreError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` naming the first offending key.
    fn validate(&self) -> Result<(), CoreError>;

    /// Load and validate in one step
    fn load() -> Result<Self, CoreError> {
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable with a default value
///
/// A missing variable yields `default`; a present but unparsable one is an
/// error rather than a silent fallback.
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| CoreError::config(format!("Failed to parse {}: {}", key, e), key))
        })
        .unwrap_or(Ok(default))
}

/// Read a required environment variable
pub fn require_env_var(key: &str) -> Result<String, CoreError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::config(format!("{} must be set", key), key)),
    }
}

/// Read an optional environment variable, treating empty values as unset
pub fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Check that `value` is a parseable http(s) URL
pub fn validate_url(value: &str, key: &str) -> Result<(), CoreError> {
    let url = Url::parse(value)
        .map_err(|e| CoreError::config(format!("Invalid URL for {}: {}", key, e), key))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(CoreError::config(
            format!("{} must use http or https, got {}", key, scheme),
            key,
        )),
    }
}

/// Check that a float lies within an inclusive range
pub fn validate_range(value: f32, range: RangeInclusive<f32>, key: &str) -> Result<(), CoreError> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::config(
            format!(
                "{} must be between {} and {}, got {}",
                key,
                range.start(),
                range.end(),
                value
            ),
            key,
        ))
    }
}

/// Check that a count is non-zero
pub fn validate_positive(value: usize, key: &str) -> Result<(), CoreError> {
    if value == 0 {
        return Err(CoreError::config(
            format!("{} must be greater than 0", key),
            key,
        ));
    }
    Ok(())
}

/// Load .env file if present
///
/// Runs before logging is initialized, so problems go to stderr.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        // Only report if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
