//! Insertion-ordered, de-duplicating item set
//!
//! Membership is decided by [`ItemKey`], never by an ordering comparator,
//! so re-sorting can never collapse distinguishable items.

use crate::item::{ContentItem, ItemKey};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Ordered set of content items keyed by `(item_id, relationship_id)`
///
/// The first insertion of a key wins; later duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentItemSet {
    items: IndexMap<ItemKey, ContentItem>,
}

impl ContentItemSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty set with room for `capacity` items
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert item, returning `false` if its key was already present
    pub fn insert(&mut self, item: ContentItem) -> bool {
        match self.items.entry(item.key()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
        }
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.contains_key(key)
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in current order
    pub fn iter(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.values()
    }

    /// Mutable iteration in current order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ContentItem> {
        self.items.values_mut()
    }

    /// First item in current order
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&ContentItem> {
        self.items.first().map(|(_, item)| item)
    }

    /// Stable sort by comparator
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&ContentItem, &ContentItem) -> Ordering,
    {
        self.items.sort_by(|_, a, _, b| compare(a, b));
    }

    /// Keep the first `len` items, returning `true` if any were dropped
    pub fn truncate(&mut self, len: usize) -> bool {
        let truncated = self.items.len() > len;
        self.items.truncate(len);
        truncated
    }

    /// Consume into a vector in current order
    #[must_use]
    pub fn into_vec(self) -> Vec<ContentItem> {
        self.items.into_values().collect()
    }
}

impl Extend<ContentItem> for ContentItemSet {
    fn extend<I: IntoIterator<Item = ContentItem>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl FromIterator<ContentItem> for ContentItemSet {
    fn from_iter<I: IntoIterator<Item = ContentItem>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ContentItemSet {
    type Item = ContentItem;
    type IntoIter = indexmap::map::IntoValues<ItemKey, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ItemId, RelationshipId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(content: u64, rel: Option<u64>, rank: i32) -> ContentItem {
        let item = ContentItem::new(ItemId::new(content, 1)).with_sort_rank(rank);
        match rel {
            Some(r) => item.with_relationship_id(RelationshipId(r)),
            None => item,
        }
    }

    #[test]
    fn duplicate_key_is_ignored() {
        let mut set = ContentItemSet::new();
        assert!(set.insert(item(1, Some(10), 5)));
        assert!(!set.insert(item(1, Some(10), 99)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.first().unwrap().sort_rank(), 5);
    }

    #[test]
    fn same_item_different_relationship_kept() {
        let set: ContentItemSet = vec![item(1, Some(10), 0), item(1, Some(11), 0)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn sort_never_collapses_equal_ranks() {
        let mut set: ContentItemSet = (0..5).map(|i| item(i, None, 0)).collect();
        set.sort_by(|a, b| a.sort_rank().cmp(&b.sort_rank()));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn truncate_reports_drop() {
        let mut set: ContentItemSet = (0..4).map(|i| item(i, None, 0)).collect();
        assert!(!set.truncate(10));
        assert!(set.truncate(2));
        let ids: Vec<u64> = set.iter().map(|i| i.item_id().content_id().0).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn set_len_equals_distinct_keys(
            entries in proptest::collection::vec((0u64..20, proptest::option::of(0u64..5)), 0..60)
        ) {
            let set: ContentItemSet = entries.iter().map(|(c, r)| item(*c, *r, 0)).collect();
            let distinct: std::collections::HashSet<_> = entries.iter().collect();
            prop_assert_eq!(set.len(), distinct.len());
        }
    }
}
