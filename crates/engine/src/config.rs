//! Engine configuration
//!
//! # Environment Variables
//!
//! - `REELRANK_EMBEDDINGS_PATH` (required): embedding table, `.json` or `.bin`
//! - `REELRANK_CATALOG_PATH` (required): catalog JSON array
//! - `REELRANK_LEARNING_RATE` (optional): feedback learning rate (default: 0.05)
//! - `REELRANK_DIVERSITY_LAMBDA` (optional): MMR relevance weight (default: 0.75)
//! - `REELRANK_CANDIDATE_POOL` (optional): scored candidates kept for reranking (default: 300)
//! - `REELRANK_RERANK_WINDOW` (optional): candidates considered per MMR round (default: 50)
//! - `REELRANK_DEFAULT_TOP_N` (optional): batch size when the caller gives none (default: 3)
//! - `TMDB_API_KEY` (optional): enables image enrichment
//! - `REELRANK_TMDB_BASE_URL` (optional): TMDb API root
//! - `REELRANK_IMAGE_BASE_URL` (optional): prefix for image file paths
//! - `REELRANK_LOOKUP_TIMEOUT_MS` (optional): per-lookup timeout (default: 4000)
//! - `REELRANK_IMAGE_CACHE_CAPACITY` (optional): cached lookups (default: 10000)

use crate::diversity::{DEFAULT_LAMBDA, DEFAULT_WINDOW};
use crate::image::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_LOOKUP_TIMEOUT, TMDB_API_BASE_URL, TMDB_IMAGE_BASE_URL,
};
use crate::profile::DEFAULT_LEARNING_RATE;
use crate::scoring::DEFAULT_CANDIDATE_POOL;
use reelrank_core::config::{
    optional_env_var, parse_env_var, require_env_var, validate_positive, validate_range,
    validate_url, ConfigLoader,
};
use reelrank_core::CoreError;
use std::path::PathBuf;
use std::time::Duration;

/// Ranking parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub learning_rate: f32,
    pub diversity_lambda: f32,
    pub candidate_pool: usize,
    pub rerank_window: usize,
    pub default_top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            diversity_lambda: DEFAULT_LAMBDA,
            candidate_pool: DEFAULT_CANDIDATE_POOL,
            rerank_window: DEFAULT_WINDOW,
            default_top_n: 3,
        }
    }
}

impl ConfigLoader for RankingConfig {
    fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();
        Ok(Self {
            learning_rate: parse_env_var("REELRANK_LEARNING_RATE", defaults.learning_rate)?,
            diversity_lambda: parse_env_var(
                "REELRANK_DIVERSITY_LAMBDA",
                defaults.diversity_lambda,
            )?,
            candidate_pool: parse_env_var("REELRANK_CANDIDATE_POOL", defaults.candidate_pool)?,
            rerank_window: parse_env_var("REELRANK_RERANK_WINDOW", defaults.rerank_window)?,
            default_top_n: parse_env_var("REELRANK_DEFAULT_TOP_N", defaults.default_top_n)?,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(CoreError::config(
                format!(
                    "learning rate must be in (0, 1], got {}",
                    self.learning_rate
                ),
                "REELRANK_LEARNING_RATE",
            ));
        }
        validate_range(self.diversity_lambda, 0.0..=1.0, "REELRANK_DIVERSITY_LAMBDA")?;
        validate_positive(self.candidate_pool, "REELRANK_CANDIDATE_POOL")?;
        validate_positive(self.rerank_window, "REELRANK_RERANK_WINDOW")?;
        validate_positive(self.default_top_n, "REELRANK_DEFAULT_TOP_N")?;
        Ok(())
    }
}

/// Image enrichment settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImageConfig {
    /// `None` disables lookups entirely
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub image_base_url: String,
    pub timeout: Duration,
    pub cache_capacity: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: TMDB_API_BASE_URL.to_string(),
            image_base_url: TMDB_IMAGE_BASE_URL.to_string(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ConfigLoader for ImageConfig {
    fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();
        let timeout_ms = parse_env_var(
            "REELRANK_LOOKUP_TIMEOUT_MS",
            defaults.timeout.as_millis() as u64,
        )?;

        Ok(Self {
            api_key: optional_env_var("TMDB_API_KEY"),
            api_base_url: optional_env_var("REELRANK_TMDB_BASE_URL")
                .unwrap_or(defaults.api_base_url),
            image_base_url: optional_env_var("REELRANK_IMAGE_BASE_URL")
                .unwrap_or(defaults.image_base_url),
            timeout: Duration::from_millis(timeout_ms),
            cache_capacity: parse_env_var(
                "REELRANK_IMAGE_CACHE_CAPACITY",
                defaults.cache_capacity,
            )?,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        validate_url(&self.api_base_url, "REELRANK_TMDB_BASE_URL")?;
        validate_url(&self.image_base_url, "REELRANK_IMAGE_BASE_URL")?;

        if self.timeout.is_zero() {
            return Err(CoreError::config(
                "lookup timeout must be greater than 0",
                "REELRANK_LOOKUP_TIMEOUT_MS",
            ));
        }
        Ok(())
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub embeddings_path: PathBuf,
    pub catalog_path: PathBuf,
    pub ranking: RankingConfig,
    pub images: ImageConfig,
}

impl ConfigLoader for EngineConfig {
    fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            embeddings_path: require_env_var("REELRANK_EMBEDDINGS_PATH")?.into(),
            catalog_path: require_env_var("REELRANK_CATALOG_PATH")?.into(),
            ranking: RankingConfig::from_env()?,
            images: ImageConfig::from_env()?,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        self.ranking.validate()?;
        self.images.validate()?;
        Ok(())
    }
}
