//! Structured logging initialization
//!
//! Wraps tracing-subscriber setup so every binary configures logging the
//! same way: an `EnvFilter` honouring `RUST_LOG`, and either JSON lines or
//! human-readable output.

use crate::config::{optional_env_var, ConfigLoader};
use crate::error::CoreError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(CoreError::config(
                format!("Unknown log format: {}", other),
                "REELRANK_LOG_FORMAT",
            )),
        }
    }
}

/// Logging configuration
///
/// # Environment Variables
///
/// - `REELRANK_LOG_LEVEL` (optional): default filter when `RUST_LOG` is unset (default: info)
/// - `REELRANK_LOG_FORMAT` (optional): `json` or `pretty` (default: json)
/// - `SERVICE_NAME` (optional): recorded on the startup line (default: reelrank)
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            service_name: "reelrank".to_string(),
        }
    }
}

impl ConfigLoader for LogConfig {
    fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();

        let format = match optional_env_var("REELRANK_LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => defaults.format,
        };

        Ok(Self {
            level: optional_env_var("REELRANK_LOG_LEVEL").unwrap_or(defaults.level),
            format,
            service_name: optional_env_var("SERVICE_NAME").unwrap_or(defaults.service_name),
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        EnvFilter::try_new(&self.level).map_err(|e| {
            CoreError::config(
                format!("Invalid log level '{}': {}", self.level, e),
                "REELRANK_LOG_LEVEL",
            )
        })?;
        Ok(())
    }
}

/// Install the global tracing subscriber
///
/// Must be called once at startup. A second call returns
/// `CoreError::LoggingInit` instead of panicking.
pub fn init_logging(config: &LogConfig) -> Result<(), CoreError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| CoreError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service_name = %config.service_name,
        format = ?config.format,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_config_validation() {
        let config = LogConfig::default();
        assert!(config.validate().is_ok());

        let bad = LogConfig {
            level: "reelrank=verbose".to_string(),
            ..LogConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = LogConfig {
            format: LogFormat::Pretty,
            ..LogConfig::default()
        };
        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(first.is_ok() || matches!(first, Err(CoreError::LoggingInit(_))));
        assert!(matches!(second, Err(CoreError::LoggingInit(_))));
    }
}
