//! User records and the Preference Updater
//!
//! A user's preference vector is an exponentially decayed estimate of the
//! item directions they reacted to. Each feedback event moves it toward
//! (positive) or away from (negative) the item's unit embedding:
//!
//! `v' = (1 - lr) * v + lr * weight * item_vector`
//!
//! No normalization happens here; scoring normalizes.

use crate::embedding::EmbeddingStore;
use crate::exposure::ExposureSet;
use crate::types::{FeedbackKind, ItemId, PreferenceVector, UserId};
use ndarray::ArrayView1;
use reelrank_core::math::is_zero_vector;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_LEARNING_RATE: f32 = 0.05;

/// Per-user state owned by the user store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub preference_vector: PreferenceVector,
    pub exposure: ExposureSet,
}

impl UserRecord {
    /// Fresh user with a zero preference vector and nothing seen
    pub fn new(user_id: impl Into<UserId>, dimension: usize) -> Self {
        Self {
            user_id: user_id.into(),
            preference_vector: vec![0.0; dimension],
            exposure: ExposureSet::new(),
        }
    }

    /// No feedback signal yet; recommendations come from popularity
    pub fn is_cold_start(&self) -> bool {
        is_zero_vector(&self.preference_vector)
    }
}

/// Applies feedback events to preference vectors
#[derive(Debug, Clone, Copy)]
pub struct PreferenceUpdater {
    learning_rate: f32,
}

impl Default for PreferenceUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE)
    }
}

impl PreferenceUpdater {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Return the preference vector after feedback on `item_id`
    ///
    /// The input is returned unchanged when the item has no embedding, when
    /// the feedback kind carries zero weight, or when the vector's length
    /// does not match the store.
    pub fn update(
        &self,
        embeddings: &EmbeddingStore,
        preference: &[f32],
        item_id: ItemId,
        kind: FeedbackKind,
    ) -> PreferenceVector {
        let Some(item_vector) = embeddings.get(item_id) else {
            return preference.to_vec();
        };

        let weight = kind.weight();
        if weight == 0.0 {
            return preference.to_vec();
        }

        if preference.len() != item_vector.len() {
            warn!(
                item_id,
                expected = item_vector.len(),
                actual = preference.len(),
                "Preference vector dimension mismatch, feedback ignored"
            );
            return preference.to_vec();
        }

        Self::blend(preference, item_vector, self.learning_rate, weight)
    }

    fn blend(
        preference: &[f32],
        item_vector: ArrayView1<'_, f32>,
        lr: f32,
        weight: f32,
    ) -> PreferenceVector {
        preference
            .iter()
            .zip(item_vector.iter())
            .map(|(v, x)| (1.0 - lr) * v + lr * weight * x)
            .collect()
    }
}
