use reelrank_core::CoreError;

pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Errors surfaced by the ranking engine
///
/// Unknown items, failed image lookups and empty batches are not errors;
/// they degrade to a no-op, a missing field and an empty batch respectively.
#[derive(Debug, thiserror::Error)]
pub enum RecommenderError {
    /// Empty or malformed embedding table, bad settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RecommenderError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<CoreError> for RecommenderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigurationError { message, key } => match key {
                Some(key) => Self::Configuration(format!("{} ({})", message, key)),
                None => Self::Configuration(message),
            },
            CoreError::Io(e) => Self::Io(e),
            CoreError::Serialization(e) => Self::Serialization(e),
            CoreError::LoggingInit(e) => Self::Configuration(e),
        }
    }
}

impl From<bincode::Error> for RecommenderError {
    fn from(err: bincode::Error) -> Self {
        Self::Configuration(format!("Malformed binary embedding table: {}", err))
    }
}
