//! Exposure Tracker
//!
//! Records every item a user has been shown, either by giving feedback on it
//! or by receiving it in a recommendation batch. Exposed items are never
//! recommended to that user again.

use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Append-only record of items a user must not be shown again
///
/// Serialized as the plain list of entries. Feedback appends even when the
/// item is already present; recommendation marking is a set union.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ItemId>", into = "Vec<ItemId>")]
pub struct ExposureSet {
    entries: Vec<ItemId>,
    seen: HashSet<ItemId>,
}

impl ExposureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_excluded(&self, item_id: ItemId) -> bool {
        self.seen.contains(&item_id)
    }

    /// Union `item_ids` into the set; already-present ids are skipped
    ///
    /// Returns how many ids were newly added.
    pub fn mark_exposed<I>(&mut self, item_ids: I) -> usize
    where
        I: IntoIterator<Item = ItemId>,
    {
        let mut added = 0;
        for item_id in item_ids {
            if self.seen.insert(item_id) {
                self.entries.push(item_id);
                added += 1;
            }
        }
        added
    }

    /// Append one fed-back item, duplicates tolerated
    pub fn mark_feedback(&mut self, item_id: ItemId) {
        self.seen.insert(item_id);
        self.entries.push(item_id);
    }

    /// Entries in insertion order, including feedback duplicates
    pub fn entries(&self) -> &[ItemId] {
        &self.entries
    }

    /// Number of distinct excluded items
    pub fn distinct_len(&self) -> usize {
        self.seen.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ItemId>> for ExposureSet {
    fn from(entries: Vec<ItemId>) -> Self {
        let seen = entries.iter().copied().collect();
        Self { entries, seen }
    }
}

impl From<ExposureSet> for Vec<ItemId> {
    fn from(set: ExposureSet) -> Self {
        set.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_exposed_is_idempotent() {
        let mut set = ExposureSet::new();
        assert_eq!(set.mark_exposed([1, 2, 3]), 3);
        assert_eq!(set.mark_exposed([2, 3, 4]), 1);
        assert_eq!(set.mark_exposed([4, 4]), 0);
        assert_eq!(set.entries(), &[1, 2, 3, 4]);
        assert_eq!(set.distinct_len(), 4);
    }

    #[test]
    fn test_mark_feedback_appends_duplicates() {
        let mut set = ExposureSet::new();
        set.mark_feedback(10);
        set.mark_feedback(10);
        assert_eq!(set.entries(), &[10, 10]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.distinct_len(), 1);
        assert!(set.is_excluded(10));
    }

    #[test]
    fn test_feedback_then_exposed_does_not_duplicate() {
        let mut set = ExposureSet::new();
        set.mark_feedback(5);
        assert_eq!(set.mark_exposed([5, 6]), 1);
        assert_eq!(set.entries(), &[5, 6]);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut set = ExposureSet::new();
        set.mark_feedback(7);
        set.mark_feedback(7);
        set.mark_exposed([8]);

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[7,7,8]");

        let back: ExposureSet = serde_json::from_str(&json).unwrap();
        assert!(back.is_excluded(8));
        assert_eq!(back.len(), 3);
    }
}
