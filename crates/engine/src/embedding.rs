//! Embedding Store
//!
//! Holds the precomputed item embeddings as one row-major matrix with every
//! row L2-normalized at load time. Read-only after construction, so it is
//! shared across requests behind an `Arc` without locking.

use crate::error::{RecommenderError, Result};
use crate::types::ItemId;
use ndarray::{Array1, Array2, ArrayView1};
use reelrank_core::math::normalize_vector;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Normalized item embeddings keyed by item id
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    /// Row order of `matrix`, ascending by id
    ids: Vec<ItemId>,
    index: HashMap<ItemId, usize>,
    matrix: Array2<f32>,
}

impl EmbeddingStore {
    /// Build a store from raw vectors
    ///
    /// Every vector is scaled to unit length; an all-zero vector stays zero.
    ///
    /// # Errors
    ///
    /// `Configuration` if the table is empty, dimensions disagree, a vector
    /// has zero length or contains a non-finite value.
    pub fn from_vectors<I>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ItemId, Vec<f32>)>,
    {
        let mut entries: Vec<(ItemId, Vec<f32>)> = raw.into_iter().collect();
        if entries.is_empty() {
            return Err(RecommenderError::Configuration(
                "embedding table is empty".to_string(),
            ));
        }
        entries.sort_by_key(|(id, _)| *id);
        entries.dedup_by_key(|(id, _)| *id);

        let dim = entries[0].1.len();
        if dim == 0 {
            return Err(RecommenderError::Configuration(
                "embedding vectors have zero length".to_string(),
            ));
        }

        let mut ids = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        let mut flat = Vec::with_capacity(entries.len() * dim);

        for (row, (id, mut vector)) in entries.into_iter().enumerate() {
            if vector.len() != dim {
                return Err(RecommenderError::Configuration(format!(
                    "item {} has dimension {}, expected {}",
                    id,
                    vector.len(),
                    dim
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(RecommenderError::Configuration(format!(
                    "item {} has a non-finite component",
                    id
                )));
            }

            normalize_vector(&mut vector);
            ids.push(id);
            index.insert(id, row);
            flat.extend_from_slice(&vector);
        }

        let matrix = Array2::from_shape_vec((ids.len(), dim), flat)
            .map_err(|e| RecommenderError::Configuration(e.to_string()))?;

        Ok(Self { ids, index, matrix })
    }

    /// Load an embedding table from disk
    ///
    /// `.bin` files are bincode-encoded `HashMap<ItemId, Vec<f32>>`; anything
    /// else is read as a JSON object mapping item id to vector.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            RecommenderError::Configuration(format!(
                "cannot read embedding table {}: {}",
                path.display(),
                e
            ))
        })?;

        let raw: HashMap<ItemId, Vec<f32>> = match path.extension().and_then(|e| e.to_str()) {
            Some("bin") => bincode::deserialize(&bytes)?,
            _ => serde_json::from_slice(&bytes).map_err(|e| {
                RecommenderError::Configuration(format!(
                    "malformed embedding table {}: {}",
                    path.display(),
                    e
                ))
            })?,
        };

        let store = Self::from_vectors(raw)?;
        info!(
            path = %path.display(),
            items = store.len(),
            dimension = store.dimension(),
            "Loaded item embeddings"
        );
        Ok(store)
    }

    /// Embedding dimensionality `d`
    ///
    /// Construction rejects empty tables, so this is always defined.
    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.index.contains_key(&item_id)
    }

    /// Unit embedding for an item, `None` for unknown ids
    pub fn get(&self, item_id: ItemId) -> Option<ArrayView1<'_, f32>> {
        self.index.get(&item_id).map(|&row| self.matrix.row(row))
    }

    /// Dot product of two stored unit embeddings
    pub fn similarity(&self, a: ItemId, b: ItemId) -> Option<f32> {
        Some(self.get(a)?.dot(&self.get(b)?))
    }

    /// Item ids in row order
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// Dot product of every stored embedding with `query`, in row order
    pub fn score_all(&self, query: ArrayView1<'_, f32>) -> Array1<f32> {
        self.matrix.dot(&query)
    }
}
