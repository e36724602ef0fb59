//! Static item catalog
//!
//! Read-only reference data shared by all users: popularity for the cold
//! start path and display metadata for enrichment. Items are kept in
//! popularity order so the fallback is a single filtered scan.

use crate::error::{RecommenderError, Result};
use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// One catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(alias = "tmdb_id")]
    pub item_id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    /// Average rating; drives the cold start ranking
    #[serde(alias = "avg_rating")]
    pub popularity_score: f32,
    /// Any further display columns, passed through untouched
    #[serde(default, flatten)]
    pub metadata: BTreeMap<String, Value>,
}

impl CatalogItem {
    pub fn new(item_id: ItemId, title: impl Into<String>, popularity_score: f32) -> Self {
        Self {
            item_id,
            title: Some(title.into()),
            popularity_score,
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Popularity descending, item id ascending on ties
    items: Vec<CatalogItem>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn from_items(mut items: Vec<CatalogItem>) -> Self {
        items.retain(|item| {
            if item.popularity_score.is_finite() {
                true
            } else {
                warn!(item_id = item.item_id, "Dropping catalog row with non-finite popularity");
                false
            }
        });
        items.sort_by(|a, b| {
            b.popularity_score
                .total_cmp(&a.popularity_score)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });

        let mut seen = HashSet::with_capacity(items.len());
        items.retain(|item| seen.insert(item.item_id));

        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.item_id, i))
            .collect();

        Self { items, index }
    }

    /// Load a JSON array of catalog rows
    ///
    /// Rows that fail to parse are skipped with a warning; a file that is not
    /// a JSON array is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            RecommenderError::Configuration(format!(
                "cannot read catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let rows: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| {
            RecommenderError::Configuration(format!("malformed catalog {}: {}", path.display(), e))
        })?;

        let total = rows.len();
        let items: Vec<CatalogItem> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(row, value)| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(row, error = %e, "Skipping malformed catalog row");
                    None
                }
            })
            .collect();

        let catalog = Self::from_items(items);
        info!(
            path = %path.display(),
            rows = total,
            items = catalog.len(),
            "Loaded item catalog"
        );
        if catalog.is_empty() {
            warn!("Catalog is empty; cold start recommendations will be empty");
        }
        Ok(catalog)
    }

    pub fn get(&self, item_id: ItemId) -> Option<&CatalogItem> {
        self.index.get(&item_id).map(|&i| &self.items[i])
    }

    /// Items in descending popularity order
    pub fn by_popularity(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
