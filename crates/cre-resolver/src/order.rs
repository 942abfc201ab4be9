//! Ordering of resolved items
//!
//! [`RankComparator`] is the default total order: sort rank, then
//! relationship id, then item id. Items without a relationship id sort
//! ahead of items with one at the same rank. It returns `Equal` only for
//! items with the same set key and rank.
//!
//! [`reorder_by_query`] refines an ordered set by asking the store to sort
//! the item ids with an `ORDER BY` clause. It never fails: any problem keeps
//! the existing order.

use cre_item::{ContentId, ContentItem, ContentItemSet};
use cre_store::{props, ContentStore, QueryRequest};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Total order over content items
pub trait ItemComparator: Send + Sync {
    /// Compare two items
    fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering;
}

impl<F> ItemComparator for F
where
    F: Fn(&ContentItem, &ContentItem) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering {
        self(a, b)
    }
}

/// Sort rank ascending with relationship / item id tie-break
#[derive(Debug, Clone, Copy, Default)]
pub struct RankComparator;

impl ItemComparator for RankComparator {
    fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering {
        // `None` < `Some`, so mixed pairs stay transitive
        a.sort_rank()
            .cmp(&b.sort_rank())
            .then_with(|| a.relationship_id().cmp(&b.relationship_id()))
            .then_with(|| a.item_id().cmp(&b.item_id()))
    }
}

fn order_clause_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let term = r"[A-Za-z_][\w.:]*(\s+(?i:asc|desc))?";
        Regex::new(&format!(r"^\s*{term}(\s*,\s*{term})*\s*$")).unwrap_or_else(|_| {
            unreachable!("order clause pattern is a valid constant regex")
        })
    })
}

/// Check that `clause` is a plain column list with optional directions
#[must_use]
pub fn is_valid_order_clause(clause: &str) -> bool {
    order_clause_pattern().is_match(clause)
}

/// Query text used to sort `ids` by `clause`
#[must_use]
pub fn reorder_query_text(ids: &[ContentId], clause: &str) -> String {
    let list = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "SELECT {id} FROM content_items WHERE {id} IN ({list}) ORDER BY {clause}",
        id = props::CONTENT_ID,
        clause = clause.trim()
    )
}

/// Re-sort `items` by the store's ordering of their content ids
///
/// Items whose id the store did not return take position 0 and sort first;
/// ties keep their current relative order.
pub async fn reorder_by_query(
    store: &dyn ContentStore,
    mut items: ContentItemSet,
    clause: &str,
    locale: Option<&str>,
) -> ContentItemSet {
    if items.len() < 2 {
        return items;
    }
    if !is_valid_order_clause(clause) {
        tracing::warn!(clause, "rejecting order_by clause, keeping existing order");
        return items;
    }

    let mut ids: Vec<ContentId> = Vec::with_capacity(items.len());
    for item in items.iter() {
        let id = item.item_id().content_id();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let request = QueryRequest::new(reorder_query_text(&ids, clause))
        .with_locale(locale.map(str::to_string));
    let rows = match store.query(request).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(clause, error = %err, "reorder query failed, keeping existing order");
            return items;
        }
    };

    let mut positions: HashMap<ContentId, usize> = HashMap::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if let Some(id) = row.get_u64(props::CONTENT_ID) {
            positions.entry(ContentId(id)).or_insert(index + 1);
        }
    }

    let position = |item: &ContentItem| {
        positions
            .get(&item.item_id().content_id())
            .copied()
            .unwrap_or(0)
    };
    items.sort_by(|a, b| position(a).cmp(&position(b)));
    tracing::debug!(clause, items = items.len(), "reordered by query");
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use cre_item::{ItemId, RelationshipId};
    use cre_test_utils::{rows_for, ScriptedStore};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(content: u64, rank: i32, rel: Option<u64>) -> ContentItem {
        let item = ContentItem::new(ItemId::new(content, 1)).with_sort_rank(rank);
        match rel {
            Some(r) => item.with_relationship_id(RelationshipId(r)),
            None => item,
        }
    }

    fn contents(set: &ContentItemSet) -> Vec<u64> {
        set.iter().map(|i| i.item_id().content_id().0).collect()
    }

    #[test]
    fn rank_then_relationship() {
        let cmp = RankComparator;
        assert_eq!(cmp.compare(&item(9, 1, Some(5)), &item(1, 2, Some(1))), Ordering::Less);
        assert_eq!(cmp.compare(&item(9, 1, Some(5)), &item(1, 1, Some(6))), Ordering::Less);
    }

    #[test]
    fn falls_back_to_item_id_without_relationships() {
        let cmp = RankComparator;
        assert_eq!(cmp.compare(&item(2, 0, None), &item(10, 0, Some(1))), Ordering::Less);
        assert_eq!(cmp.compare(&item(10, 0, None), &item(2, 0, None)), Ordering::Greater);
    }

    #[test]
    fn mixed_relationships_sort_the_same_in_any_order() {
        let a = item(10, 0, Some(1));
        let b = item(5, 0, Some(2));
        let c = item(7, 0, None);
        let forward: ContentItemSet = vec![a.clone(), b.clone(), c.clone()].into_iter().collect();
        let backward: ContentItemSet = vec![c, b, a].into_iter().collect();

        let sort = |mut set: ContentItemSet| {
            set.sort_by(|x, y| RankComparator.compare(x, y));
            contents(&set)
        };
        assert_eq!(sort(forward), vec![7, 10, 5]);
        assert_eq!(sort(backward), vec![7, 10, 5]);
    }

    #[test]
    fn large_mixed_set_sorts() {
        let mut set: ContentItemSet = (0..2_000u64)
            .map(|n| {
                let rel = (n % 3 != 0).then_some((n * 7_919) % 1_000);
                item((n * 104_729) % 3_000, i32::try_from(n % 4).unwrap(), rel)
            })
            .collect();

        set.sort_by(|x, y| RankComparator.compare(x, y));

        let sorted: Vec<_> = set.iter().collect();
        assert!(sorted
            .windows(2)
            .all(|w| RankComparator.compare(w[0], w[1]) != Ordering::Greater));
    }

    #[test]
    fn clause_validation() {
        assert!(is_valid_order_clause("sys_title"));
        assert!(is_valid_order_clause("rx:sys_title DESC, sys_contentid asc"));
        assert!(!is_valid_order_clause("sys_title; DROP TABLE x"));
        assert!(!is_valid_order_clause(""));
    }

    #[tokio::test]
    async fn reorders_by_store_order_with_missing_first() {
        let store = ScriptedStore::returning(rows_for(&[ItemId::new(3, 1), ItemId::new(1, 1)]));
        let set: ContentItemSet = vec![item(1, 0, None), item(2, 0, None), item(3, 0, None)]
            .into_iter()
            .collect();

        let reordered = reorder_by_query(&store, set, "sys_title", Some("en-us")).await;

        assert_eq!(contents(&reordered), vec![2, 3, 1]);
        let request = &store.requests()[0];
        assert!(request.text.contains("IN (1,2,3)"));
        assert!(request.text.ends_with("ORDER BY sys_title"));
        assert_eq!(request.locale.as_deref(), Some("en-us"));
    }

    #[tokio::test]
    async fn failure_keeps_existing_order() {
        let store = ScriptedStore::failing("timeout");
        let set: ContentItemSet = vec![item(3, 0, None), item(1, 0, None)].into_iter().collect();

        let reordered = reorder_by_query(&store, set.clone(), "sys_title", None).await;
        assert_eq!(reordered, set);
    }

    #[tokio::test]
    async fn invalid_clause_never_reaches_store() {
        let store = ScriptedStore::returning(rows_for(&[]));
        let set: ContentItemSet = vec![item(3, 0, None), item(1, 0, None)].into_iter().collect();

        let reordered = reorder_by_query(&store, set.clone(), "1=1 --", None).await;
        assert_eq!(reordered, set);
        assert_eq!(store.call_count(), 0);
    }

    proptest! {
        #[test]
        fn comparator_equal_only_for_same_key(
            a in (0u64..6, -2i32..2, proptest::option::of(0u64..4)),
            b in (0u64..6, -2i32..2, proptest::option::of(0u64..4)),
        ) {
            let x = item(a.0, a.1, a.2);
            let y = item(b.0, b.1, b.2);
            let ord = RankComparator.compare(&x, &y);
            let same = x.key() == y.key() && x.sort_rank() == y.sort_rank();
            prop_assert_eq!(ord == Ordering::Equal, same);
            prop_assert_eq!(ord.reverse(), RankComparator.compare(&y, &x));
        }

        #[test]
        fn comparator_is_transitive(
            a in (0u64..6, -2i32..2, proptest::option::of(0u64..4)),
            b in (0u64..6, -2i32..2, proptest::option::of(0u64..4)),
            c in (0u64..6, -2i32..2, proptest::option::of(0u64..4)),
        ) {
            let (x, y, z) = (item(a.0, a.1, a.2), item(b.0, b.1, b.2), item(c.0, c.1, c.2));
            let cmp = RankComparator;
            let ordered = cmp.compare(&x, &y) != Ordering::Greater
                && cmp.compare(&y, &z) != Ordering::Greater;
            if ordered {
                prop_assert_ne!(cmp.compare(&x, &z), Ordering::Greater);
            }
        }
    }
}
