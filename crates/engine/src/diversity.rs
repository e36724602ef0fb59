//! Diversity Filter using Maximal Marginal Relevance (MMR)
//!
//! Balances relevance with diversity to avoid redundant recommendations.
//!
//! MMR formula: score = λ * relevance - (1-λ) * max_similarity_to_selected
//!
//! Each round only looks at the head of the remaining candidates (the
//! window), so an item ranked far below it is never picked even if it would
//! diversify well.

use crate::embedding::EmbeddingStore;
use crate::types::ScoredItem;

pub const DEFAULT_LAMBDA: f32 = 0.75;
pub const DEFAULT_WINDOW: usize = 50;

/// Greedy MMR reranker
#[derive(Debug, Clone, Copy)]
pub struct ApplyDiversityFilter {
    lambda: f32,
    window: usize,
}

impl Default for ApplyDiversityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_LAMBDA, DEFAULT_WINDOW)
    }
}

impl ApplyDiversityFilter {
    pub fn new(lambda: f32, window: usize) -> Self {
        Self { lambda, window }
    }

    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    /// Select up to `limit` items from `candidates`
    ///
    /// `candidates` must already be in relevance order. The returned items
    /// keep their original relevance score. Ties in MMR score go to the
    /// earlier candidate.
    pub fn execute(
        &self,
        candidates: Vec<ScoredItem>,
        limit: usize,
        embeddings: &EmbeddingStore,
    ) -> Vec<ScoredItem> {
        let mut selected: Vec<ScoredItem> = Vec::with_capacity(limit.min(candidates.len()));
        let mut remaining = candidates;

        while selected.len() < limit && !remaining.is_empty() {
            let mut best_score = f32::NEG_INFINITY;
            let mut best_index = None;

            for (index, candidate) in remaining.iter().take(self.window).enumerate() {
                let penalty = Self::max_similarity(candidate, &selected, embeddings);
                let mmr_score = self.lambda * candidate.score - (1.0 - self.lambda) * penalty;

                if mmr_score > best_score {
                    best_score = mmr_score;
                    best_index = Some(index);
                }
            }

            match best_index {
                Some(index) => selected.push(remaining.remove(index)),
                None => break,
            }
        }

        selected
    }

    /// Similarity to the closest already-selected item, 0 when none selected
    fn max_similarity(
        candidate: &ScoredItem,
        selected: &[ScoredItem],
        embeddings: &EmbeddingStore,
    ) -> f32 {
        if selected.is_empty() {
            return 0.0;
        }

        selected
            .iter()
            .map(|s| {
                embeddings
                    .similarity(candidate.item_id, s.item_id)
                    .unwrap_or(0.0)
            })
            .fold(f32::NEG_INFINITY, f32::max)
    }
}
