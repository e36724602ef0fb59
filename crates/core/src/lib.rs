//! # Reelrank Core
//!
//! Shared building blocks for the Reelrank recommendation crates.
//!
//! ## Modules
//!
//! - `config`: Configuration loading and validation
//! - `error`: Shared error type
//! - `math`: Vector utilities for embedding similarity
//! - `observability`: Structured logging setup

pub mod config;
pub mod error;
pub mod math;
pub mod observability;

// Re-export commonly used types
pub use config::{load_dotenv, ConfigLoader};
pub use error::CoreError;
pub use math::{cosine_similarity, dot_product, is_zero_vector, l2_norm, normalize_vector};
pub use observability::{init_logging, LogConfig, LogFormat};

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
