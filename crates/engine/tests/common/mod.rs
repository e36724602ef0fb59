//! Shared fixtures for engine integration tests

use reelrank_engine::{
    Catalog, CatalogItem, EmbeddingStore, InMemoryUserStore, RankingConfig, RecommenderEngine,
};
use std::sync::Arc;

/// Two genre clusters on orthogonal axes plus a few in-between titles
pub fn embeddings() -> EmbeddingStore {
    EmbeddingStore::from_vectors(vec![
        (1, vec![1.0, 0.0, 0.0]),
        (2, vec![0.95, 0.05, 0.0]),
        (3, vec![0.9, 0.1, 0.1]),
        (4, vec![0.0, 1.0, 0.0]),
        (5, vec![0.05, 0.95, 0.0]),
        (6, vec![0.0, 0.0, 1.0]),
        (7, vec![0.5, 0.5, 0.0]),
        (8, vec![0.3, 0.0, 0.7]),
    ])
    .expect("fixture embeddings are valid")
}

pub fn catalog() -> Catalog {
    Catalog::from_items(vec![
        CatalogItem::new(1, "Heat", 8.3),
        CatalogItem::new(2, "Ronin", 7.2),
        CatalogItem::new(3, "Collateral", 7.5),
        CatalogItem::new(4, "Amelie", 8.3),
        CatalogItem::new(5, "Before Sunrise", 8.1),
        CatalogItem::new(6, "Alien", 8.5),
        CatalogItem::new(7, "Drive", 7.8),
        CatalogItem::new(8, "Sunshine", 7.2),
        // Catalog-only title with no embedding
        CatalogItem::new(9, "Metropolis", 8.9),
    ])
}

pub fn engine() -> RecommenderEngine {
    engine_with(RankingConfig::default())
}

pub fn engine_with(ranking: RankingConfig) -> RecommenderEngine {
    RecommenderEngine::new(
        &ranking,
        Arc::new(embeddings()),
        Arc::new(catalog()),
        Arc::new(InMemoryUserStore::new()),
    )
}

/// Engine plus a handle on its store for inspecting user records
pub fn engine_with_store() -> (RecommenderEngine, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let engine = RecommenderEngine::new(
        &RankingConfig::default(),
        Arc::new(embeddings()),
        Arc::new(catalog()),
        store.clone(),
    );
    (engine, store)
}
