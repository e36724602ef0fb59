//! Recommendation Engine
//!
//! Orchestrates feedback and recommendation requests:
//!
//! Feedback: load user → update preference vector → mark item exposed → save.
//!
//! Recommend:
//! 1. Load user under the per-user lock
//! 2. Zero preference vector → popularity fallback
//! 3. Otherwise cosine scoring → MMR reranking; fall back to popularity if empty
//! 4. Mark every returned item exposed and save, then release the lock
//! 5. Attach display metadata and images outside the lock

use crate::catalog::Catalog;
use crate::cold_start::HandleColdStartUser;
use crate::config::{EngineConfig, ImageConfig, RankingConfig};
use crate::diversity::ApplyDiversityFilter;
use crate::embedding::EmbeddingStore;
use crate::error::{RecommenderError, Result};
use crate::image::{ImageLookup, NoImageLookup, TmdbImageClient};
use crate::profile::{PreferenceUpdater, UserRecord};
use crate::scoring::CandidateScorer;
use crate::store::{UserLocks, UserStore};
use crate::types::{
    FeedbackKind, FeedbackOutcome, ItemId, RecommendationBatch, RecommendationSource,
    RecommendedItem, ScoredItem,
};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Ranking engine shared across requests
pub struct RecommenderEngine {
    embeddings: Arc<EmbeddingStore>,
    catalog: Arc<Catalog>,
    users: Arc<dyn UserStore>,
    images: Arc<dyn ImageLookup>,
    locks: UserLocks,
    updater: PreferenceUpdater,
    scorer: CandidateScorer,
    reranker: ApplyDiversityFilter,
    default_top_n: usize,
    lookup_timeout: Duration,
}

impl RecommenderEngine {
    pub fn new(
        ranking: &RankingConfig,
        embeddings: Arc<EmbeddingStore>,
        catalog: Arc<Catalog>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            embeddings,
            catalog,
            users,
            images: Arc::new(NoImageLookup),
            locks: UserLocks::new(),
            updater: PreferenceUpdater::new(ranking.learning_rate),
            scorer: CandidateScorer::new(ranking.candidate_pool),
            reranker: ApplyDiversityFilter::new(ranking.diversity_lambda, ranking.rerank_window),
            default_top_n: ranking.default_top_n,
            lookup_timeout: ImageConfig::default().timeout,
        }
    }

    /// Attach an image lookup collaborator
    pub fn with_image_lookup(mut self, images: Arc<dyn ImageLookup>, timeout: Duration) -> Self {
        self.images = images;
        self.lookup_timeout = timeout;
        self
    }

    /// Load embeddings and catalog from disk and wire collaborators
    ///
    /// # Errors
    ///
    /// `Configuration` if either data file is missing or malformed.
    pub fn from_config(config: &EngineConfig, users: Arc<dyn UserStore>) -> Result<Self> {
        let embeddings = Arc::new(EmbeddingStore::load(&config.embeddings_path)?);
        let catalog = Arc::new(Catalog::load(&config.catalog_path)?);

        let engine = Self::new(&config.ranking, embeddings, catalog, users);

        let engine = match &config.images.api_key {
            Some(api_key) => {
                let client = TmdbImageClient::with_options(
                    api_key.clone(),
                    config.images.api_base_url.clone(),
                    config.images.image_base_url.clone(),
                    config.images.timeout,
                    config.images.cache_capacity,
                )?;
                engine.with_image_lookup(Arc::new(client), config.images.timeout)
            }
            None => {
                info!("TMDB_API_KEY not set, image enrichment disabled");
                engine
            }
        };

        Ok(engine)
    }

    pub fn embeddings(&self) -> &EmbeddingStore {
        &self.embeddings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Register a user with a zero preference vector and no exposure
    #[instrument(skip(self))]
    pub async fn create_user(&self, user_id: &str) -> Result<UserRecord> {
        let record = UserRecord::new(user_id, self.embeddings.dimension());
        self.users.insert(record.clone()).await?;
        info!(user_id, "Created user");
        Ok(record)
    }

    /// Apply one feedback event
    ///
    /// Feedback on an item without an embedding changes nothing and reports
    /// `UnknownItem`; unrecognized kinds still mark the item as seen.
    #[instrument(skip(self))]
    pub async fn submit_feedback(
        &self,
        user_id: &str,
        item_id: ItemId,
        kind: FeedbackKind,
    ) -> Result<FeedbackOutcome> {
        let _guard = self.locks.acquire(user_id).await;
        let mut record = self.load_user(user_id).await?;

        if !self.embeddings.contains(item_id) {
            debug!(user_id, item_id, "Feedback on unknown item ignored");
            return Ok(FeedbackOutcome::UnknownItem);
        }

        record.preference_vector =
            self.updater
                .update(&self.embeddings, &record.preference_vector, item_id, kind);
        record.exposure.mark_feedback(item_id);
        self.users.put(record).await?;

        debug!(user_id, item_id, "Feedback applied");
        Ok(FeedbackOutcome::Applied)
    }

    /// Produce the next batch for a user and mark it exposed
    ///
    /// `top_n` of `None` uses the configured default. An empty batch is a
    /// valid answer when everything has been seen.
    #[instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        top_n: Option<usize>,
    ) -> Result<RecommendationBatch> {
        let top_n = top_n.unwrap_or(self.default_top_n);

        let (selected, source) = {
            let _guard = self.locks.acquire(user_id).await;
            let mut record = self.load_user(user_id).await?;

            let (selected, source) = self.select(&record, top_n);

            let added = record
                .exposure
                .mark_exposed(selected.iter().map(|s| s.item_id));
            if added > 0 {
                self.users.put(record).await?;
            }
            (selected, source)
        };

        debug!(
            user_id,
            count = selected.len(),
            source = ?source,
            "Recommendations selected"
        );

        let items = self.enrich(&selected).await;

        Ok(RecommendationBatch {
            user_id: user_id.to_string(),
            source,
            items,
            generated_at: Utc::now(),
        })
    }

    /// Whether `item_id` may no longer be shown to the user
    pub async fn is_excluded(&self, user_id: &str, item_id: ItemId) -> Result<bool> {
        let record = self.load_user(user_id).await?;
        Ok(record.exposure.is_excluded(item_id))
    }

    /// Choose items for one batch without side effects
    fn select(&self, record: &UserRecord, top_n: usize) -> (Vec<ScoredItem>, RecommendationSource) {
        if top_n == 0 {
            return (Vec::new(), RecommendationSource::Popularity);
        }

        if !record.is_cold_start() {
            let candidates =
                self.scorer
                    .score(&self.embeddings, &record.preference_vector, &record.exposure);
            let selected = self.reranker.execute(candidates, top_n, &self.embeddings);
            if !selected.is_empty() {
                return (selected, RecommendationSource::Personalized);
            }
            debug!(
                user_id = %record.user_id,
                "Personalized path empty, falling back to popularity"
            );
        }

        (
            HandleColdStartUser::execute(&self.catalog, &record.exposure, top_n),
            RecommendationSource::Popularity,
        )
    }

    /// Attach catalog metadata and images; lookups run concurrently
    async fn enrich(&self, selected: &[ScoredItem]) -> Vec<RecommendedItem> {
        let lookups = selected.iter().map(|s| async move {
            match tokio::time::timeout(self.lookup_timeout, self.images.lookup(s.item_id)).await {
                Ok(image_url) => image_url,
                Err(_) => {
                    warn!(item_id = s.item_id, "Image lookup timed out");
                    None
                }
            }
        });
        let images = join_all(lookups).await;

        selected
            .iter()
            .zip(images)
            .enumerate()
            .map(|(position, (scored, image_url))| {
                let meta = self.catalog.get(scored.item_id);
                RecommendedItem {
                    item_id: scored.item_id,
                    rank: position + 1,
                    score: scored.score,
                    title: meta.and_then(|m| m.title.clone()),
                    popularity_score: meta.map(|m| m.popularity_score),
                    image_url,
                }
            })
            .collect()
    }

    async fn load_user(&self, user_id: &str) -> Result<UserRecord> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| RecommenderError::UserNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use crate::store::InMemoryUserStore;

    fn engine() -> RecommenderEngine {
        let embeddings = EmbeddingStore::from_vectors(vec![
            (1, vec![1.0, 0.0]),
            (2, vec![0.0, 1.0]),
            (3, vec![0.9, 0.1]),
        ])
        .unwrap();
        let catalog = Catalog::from_items(vec![
            CatalogItem::new(1, "One", 5.0),
            CatalogItem::new(2, "Two", 9.0),
            CatalogItem::new(3, "Three", 7.0),
        ]);
        RecommenderEngine::new(
            &RankingConfig::default(),
            Arc::new(embeddings),
            Arc::new(catalog),
            Arc::new(InMemoryUserStore::new()),
        )
    }

    #[test]
    fn test_select_cold_start_uses_popularity() {
        let engine = engine();
        let record = UserRecord::new("u", 2);
        let (selected, source) = engine.select(&record, 2);
        assert_eq!(source, RecommendationSource::Popularity);
        assert_eq!(
            selected.iter().map(|s| s.item_id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn test_select_personalized_when_vector_nonzero() {
        let engine = engine();
        let mut record = UserRecord::new("u", 2);
        record.preference_vector = vec![0.2, 0.0];
        let (selected, source) = engine.select(&record, 1);
        assert_eq!(source, RecommendationSource::Personalized);
        assert_eq!(selected[0].item_id, 1);
    }

    #[test]
    fn test_select_zero_top_n() {
        let engine = engine();
        let (selected, _) = engine.select(&UserRecord::new("u", 2), 0);
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_is_error() {
        let engine = engine();
        let err = engine.get_recommendations("ghost", Some(3)).await.unwrap_err();
        assert!(matches!(err, RecommenderError::UserNotFound(_)));

        let err = engine
            .submit_feedback("ghost", 1, FeedbackKind::StrongPositive)
            .await
            .unwrap_err();
        assert!(matches!(err, RecommenderError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_from_config_wires_image_client() {
        use std::io::Write;

        let mut embeddings = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(embeddings, r#"{{"550": [1.0, 0.0]}}"#).unwrap();
        let mut catalog = tempfile::NamedTempFile::new().unwrap();
        write!(catalog, r#"[{{"tmdb_id": 550, "title": "Fight Club", "avg_rating": 8.4}}]"#)
            .unwrap();

        let config = EngineConfig {
            embeddings_path: embeddings.path().to_path_buf(),
            catalog_path: catalog.path().to_path_buf(),
            ranking: RankingConfig::default(),
            images: ImageConfig {
                api_key: Some("key".to_string()),
                ..ImageConfig::default()
            },
        };

        let engine =
            RecommenderEngine::from_config(&config, Arc::new(InMemoryUserStore::new())).unwrap();
        assert_eq!(engine.embeddings().dimension(), 2);
        assert_eq!(engine.catalog().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_ids_leave_no_lock_entries() {
        let engine = engine();
        for i in 0..500 {
            let user_id = format!("ghost-{}", i);
            assert!(engine.get_recommendations(&user_id, None).await.is_err());
            assert!(engine
                .submit_feedback(&user_id, 1, FeedbackKind::Negative)
                .await
                .is_err());
        }
        assert!(engine.locks.is_empty());

        engine.create_user("u").await.unwrap();
        engine.get_recommendations("u", Some(1)).await.unwrap();
        assert!(engine.locks.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_attaches_metadata_and_rank() {
        let engine = engine();
        let items = engine
            .enrich(&[ScoredItem::new(3, 0.9), ScoredItem::new(42, 0.1)])
            .await;
        assert_eq!(items[0].rank, 1);
        assert_eq!(items[0].title.as_deref(), Some("Three"));
        assert_eq!(items[0].popularity_score, Some(7.0));
        assert_eq!(items[1].rank, 2);
        assert!(items[1].title.is_none());
        assert!(items[1].image_url.is_none());
    }
}
