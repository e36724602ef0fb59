//! Candidate Scorer
//!
//! Cosine relevance of every un-seen item against the user's preference
//! vector, computed as one matrix-vector product over the unit embedding
//! table.

use crate::embedding::EmbeddingStore;
use crate::exposure::ExposureSet;
use crate::types::ScoredItem;
use ndarray::Array1;
use reelrank_core::math::l2_norm;
use std::cmp::Ordering;

pub const DEFAULT_CANDIDATE_POOL: usize = 300;

/// Scores and truncates the candidate pool handed to reranking
#[derive(Debug, Clone, Copy)]
pub struct CandidateScorer {
    pool_size: usize,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_POOL)
    }
}

impl CandidateScorer {
    pub fn new(pool_size: usize) -> Self {
        Self { pool_size }
    }

    /// Rank non-excluded items by cosine similarity to `preference`
    ///
    /// Sorted by relevance descending, ties by item id ascending, truncated
    /// to the pool size. Callers route zero vectors to the cold start path;
    /// a zero or mismatched vector here yields no candidates.
    pub fn score(
        &self,
        embeddings: &EmbeddingStore,
        preference: &[f32],
        excluded: &ExposureSet,
    ) -> Vec<ScoredItem> {
        let norm = l2_norm(preference);
        if norm == 0.0 || preference.len() != embeddings.dimension() {
            return Vec::new();
        }

        let unit: Array1<f32> = preference.iter().map(|x| x / norm).collect();
        let relevance = embeddings.score_all(unit.view());

        let mut candidates: Vec<ScoredItem> = embeddings
            .ids()
            .iter()
            .zip(relevance.iter())
            .filter(|(id, _)| !excluded.is_excluded(**id))
            .map(|(id, score)| ScoredItem::new(*id, *score))
            .collect();

        // Partition around the pool boundary, then sort only the pool
        if self.pool_size > 0 && candidates.len() > self.pool_size {
            candidates.select_nth_unstable_by(self.pool_size - 1, by_relevance);
        }
        candidates.truncate(self.pool_size);
        candidates.sort_by(by_relevance);

        candidates
    }
}

/// Descending relevance, then ascending item id
pub(crate) fn by_relevance(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item_id.cmp(&b.item_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EmbeddingStore {
        EmbeddingStore::from_vectors(vec![
            (1, vec![1.0, 0.0]),
            (2, vec![0.0, 1.0]),
            (3, vec![0.9, 0.1]),
            (4, vec![1.0, 0.0]),
            (5, vec![-1.0, 0.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_sorted_by_relevance_with_id_tiebreak() {
        let scored = CandidateScorer::default().score(&store(), &[1.0, 0.0], &ExposureSet::new());
        let ids: Vec<_> = scored.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![1, 4, 3, 2, 5]);
        assert!((scored[0].score - 1.0).abs() < 1e-6);
        assert!((scored[4].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_excluded_items_are_skipped() {
        let mut excluded = ExposureSet::new();
        excluded.mark_exposed([1, 3]);
        let scored = CandidateScorer::default().score(&store(), &[1.0, 0.0], &excluded);
        assert!(scored.iter().all(|s| s.item_id != 1 && s.item_id != 3));
        assert_eq!(scored.len(), 3);
    }

    #[test]
    fn test_truncates_to_pool_size() {
        let scored = CandidateScorer::new(2).score(&store(), &[1.0, 0.0], &ExposureSet::new());
        let ids: Vec<_> = scored.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_zero_vector_yields_nothing() {
        let scored = CandidateScorer::default().score(&store(), &[0.0, 0.0], &ExposureSet::new());
        assert!(scored.is_empty());
    }

    #[test]
    fn test_invariant_to_positive_rescaling() {
        let scorer = CandidateScorer::default();
        let base = scorer.score(&store(), &[0.3, 0.7], &ExposureSet::new());
        let scaled = scorer.score(&store(), &[30.0, 70.0], &ExposureSet::new());

        assert_eq!(base.len(), scaled.len());
        for (a, b) in base.iter().zip(scaled.iter()) {
            assert_eq!(a.item_id, b.item_id);
            assert!((a.score - b.score).abs() < 1e-5);
        }
    }
}
