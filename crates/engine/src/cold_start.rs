//! Cold Start Handling
//!
//! Provides popularity-ranked recommendations for users without any
//! feedback signal yet, and backs up the personalized path when it runs dry.

use crate::catalog::Catalog;
use crate::exposure::ExposureSet;
use crate::types::ScoredItem;

/// Popularity fallback
///
/// Steps:
/// 1. Walk the catalog in descending popularity
/// 2. Skip items the user has already been exposed to
/// 3. Take the first `limit`
///
/// An exhausted catalog yields an empty list, which is a valid result.
pub struct HandleColdStartUser;

impl HandleColdStartUser {
    pub fn execute(catalog: &Catalog, excluded: &ExposureSet, limit: usize) -> Vec<ScoredItem> {
        catalog
            .by_popularity()
            .filter(|item| !excluded.is_excluded(item.item_id))
            .take(limit)
            .map(|item| ScoredItem::new(item.item_id, item.popularity_score))
            .collect()
    }
}
