//! Shared types for the ranking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog / embedding item identifier (TMDb movie id)
pub type ItemId = i64;

/// User identifier as issued by the account layer
pub type UserId = String;

/// Dense user preference vector, same dimensionality as item embeddings
pub type PreferenceVector = Vec<f32>;

/// Kind of feedback a user gave on one item
///
/// Parses the canonical names as well as the swipe directions used by the
/// card client (`right`, `down`, `left`). Anything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackKind {
    StrongPositive,
    WeakPositive,
    Negative,
    Unknown,
}

impl FeedbackKind {
    /// Signed weight applied to the item direction
    pub fn weight(self) -> f32 {
        match self {
            Self::StrongPositive => 1.0,
            Self::WeakPositive => 0.3,
            Self::Negative => -1.0,
            Self::Unknown => 0.0,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strong-positive" | "strong_positive" | "right" => Self::StrongPositive,
            "weak-positive" | "weak_positive" | "down" => Self::WeakPositive,
            "negative" | "left" => Self::Negative,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongPositive => "strong-positive",
            Self::WeakPositive => "weak-positive",
            Self::Negative => "negative",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for FeedbackKind {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for FeedbackKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<FeedbackKind> for String {
    fn from(kind: FeedbackKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item with its relevance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f32,
}

impl ScoredItem {
    pub fn new(item_id: ItemId, score: f32) -> Self {
        Self { item_id, score }
    }
}

/// Which path produced a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Cosine scoring followed by MMR reranking
    Personalized,
    /// Popularity-ranked cold start list
    Popularity,
}

/// One recommended item with display metadata attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub item_id: ItemId,
    /// 1-based position in the batch
    pub rank: usize,
    /// Cosine relevance for personalized batches, popularity for cold start
    pub score: f32,
    pub title: Option<String>,
    pub popularity_score: Option<f32>,
    pub image_url: Option<String>,
}

/// Ranked output of one recommendation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBatch {
    pub user_id: UserId,
    pub source: RecommendationSource,
    pub items: Vec<RecommendedItem>,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationBatch {
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.item_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Result of submitting feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOutcome {
    /// Preference vector and exposure set were updated
    Applied,
    /// Item has no embedding; nothing changed
    UnknownItem,
}
