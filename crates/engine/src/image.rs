//! Image lookup for display enrichment
//!
//! Fetches a backdrop (falling back to a poster) for a movie from TMDb.
//! Lookups are best-effort: upstream failures and timeouts are logged and
//! masked as `None`, never propagated.

use crate::error::{RecommenderError, Result};
use crate::types::ItemId;
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const TMDB_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w780";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Resolves an item id to an image URL
#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn lookup(&self, item_id: ItemId) -> Option<String>;
}

/// Lookup used when no TMDb credentials are configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageLookup;

#[async_trait]
impl ImageLookup for NoImageLookup {
    async fn lookup(&self, _item_id: ItemId) -> Option<String> {
        None
    }
}

/// Reasons a TMDb lookup failed; logged, never returned to callers
#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    backdrops: Vec<ImageEntry>,
    #[serde(default)]
    posters: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    file_path: String,
}

/// TMDb images client with a bounded per-item cache
///
/// Successful responses are cached, including ones with no usable image.
/// Failures are not cached so a later call can retry.
pub struct TmdbImageClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    cache: Cache<ItemId, Option<String>>,
}

impl TmdbImageClient {
    /// Create a client against the public TMDb API
    ///
    /// # Arguments
    /// * `api_key` - TMDb API key (v3)
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_options(
            api_key,
            TMDB_API_BASE_URL.to_string(),
            TMDB_IMAGE_BASE_URL.to_string(),
            DEFAULT_LOOKUP_TIMEOUT,
            DEFAULT_CACHE_CAPACITY,
        )
    }

    /// # Errors
    ///
    /// `Configuration` if the HTTP client cannot be built (for example, no
    /// usable TLS backend).
    pub fn with_options(
        api_key: String,
        base_url: String,
        image_base_url: String,
        timeout: Duration,
        cache_capacity: u64,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RecommenderError::Configuration(format!("cannot build TMDb HTTP client: {}", e))
        })?;

        let cache = Cache::builder().max_capacity(cache_capacity).build();

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Number of cached entries (after pending maintenance)
    pub async fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    async fn fetch(&self, item_id: ItemId) -> std::result::Result<Option<String>, LookupError> {
        let url = format!("{}/movie/{}/images", self.base_url, item_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("include_image_language", "en,null"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let images: ImagesResponse = response.json().await?;
        let path = images
            .backdrops
            .first()
            .or_else(|| images.posters.first())
            .map(|entry| entry.file_path.as_str());

        Ok(path.map(|p| format!("{}{}", self.image_base_url, p)))
    }
}

#[async_trait]
impl ImageLookup for TmdbImageClient {
    async fn lookup(&self, item_id: ItemId) -> Option<String> {
        if let Some(cached) = self.cache.get(&item_id).await {
            return cached;
        }

        match self.fetch(item_id).await {
            Ok(image_url) => {
                debug!(item_id, found = image_url.is_some(), "TMDb image lookup");
                self.cache.insert(item_id, image_url.clone()).await;
                image_url
            }
            Err(e) => {
                warn!(item_id, error = %e, "TMDb image lookup failed");
                None
            }
        }
    }
}
