//! Reelrank Ranking Engine
//!
//! Recommends movies by comparing a per-user preference vector against
//! precomputed item embeddings, then reranks the best matches with
//! Maximal Marginal Relevance so a batch is not five versions of the same
//! film. Users with no signal get a popularity list. Every item shown, by
//! feedback or by recommendation, is excluded from later batches.

pub mod catalog;
pub mod cold_start;
pub mod config;
pub mod diversity;
pub mod embedding;
pub mod error;
pub mod exposure;
pub mod image;
pub mod profile;
pub mod recommendation;
pub mod scoring;
pub mod store;
pub mod types;

// Re-export key types
pub use catalog::{Catalog, CatalogItem};
pub use cold_start::HandleColdStartUser;
pub use config::{EngineConfig, ImageConfig, RankingConfig};
pub use diversity::ApplyDiversityFilter;
pub use embedding::EmbeddingStore;
pub use error::{RecommenderError, Result};
pub use exposure::ExposureSet;
pub use image::{ImageLookup, NoImageLookup, TmdbImageClient};
pub use profile::{PreferenceUpdater, UserRecord};
pub use recommendation::RecommenderEngine;
pub use scoring::CandidateScorer;
pub use store::{InMemoryUserStore, UserLocks, UserStore};
pub use types::*;
