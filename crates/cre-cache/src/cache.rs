//! Owner-keyed relationship cache using moka
//!
//! Entries are keyed by the owner's content id so that a notification naming
//! any revision of the owner evicts it. An entry cached for a different
//! revision than the one requested is treated as a miss.

use crate::config::CacheConfig;
use cre_item::{ContentId, ItemId};
use cre_store::{Relationship, RelationshipQuery, RelationshipStore, StoreError};
use dashmap::DashMap;
use moka::future::Cache;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that went to the store
    pub loads: u64,
    /// Evictions and clears performed
    pub evictions: u64,
    /// Approximate number of cached owners
    pub entry_count: u64,
}

#[derive(Debug)]
struct CachedEdges {
    owner: ItemId,
    edges: Arc<[Relationship]>,
}

/// Removes the owner's lock from the in-flight map when the lookup ends
struct InFlightSlot<'a> {
    map: &'a DashMap<ContentId, Arc<Mutex<()>>>,
    key: ContentId,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.map
            .remove_if(&self.key, |_, current| Arc::ptr_eq(current, &self.lock));
    }
}

/// Process-wide cache of one relationship category, keyed by owner
///
/// Constructed once at start-up and shared by `Arc`. Evictions bump a
/// generation counter; a load that overlapped an eviction hands its result
/// to the caller but never populates the cache.
#[derive(Debug)]
pub struct RelationshipCache {
    category: String,
    entries: Cache<ContentId, Arc<CachedEdges>>,
    in_flight: DashMap<ContentId, Arc<Mutex<()>>>,
    generation: AtomicU64,
    hits: AtomicU64,
    loads: AtomicU64,
    evictions: AtomicU64,
}

impl RelationshipCache {
    /// Create cache with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    /// Create cache from configuration
    #[must_use]
    pub fn with_config(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);
        if let Some(ttl) = config.time_to_live() {
            builder = builder.time_to_live(ttl);
        }
        Self {
            category: config.category.clone(),
            entries: builder.build(),
            in_flight: DashMap::new(),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Cached relationship category
    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Cached edges for `owner`, if present for that exact revision
    pub async fn get(&self, owner: ItemId) -> Option<Arc<[Relationship]>> {
        self.entries
            .get(&owner.content_id())
            .await
            .filter(|cached| cached.owner == owner)
            .map(|cached| Arc::clone(&cached.edges))
    }

    /// Outbound edges of `owner`, loading them from `store` on a miss
    pub async fn edges_for(
        &self,
        owner: ItemId,
        store: &dyn RelationshipStore,
    ) -> Result<Arc<[Relationship]>, StoreError> {
        let query = RelationshipQuery::owned_by(owner, self.category.clone());
        self.get_or_load(owner, || async move { store.query(&query).await })
            .await
    }

    /// Get cached edges or run `load` once per owner across concurrent callers
    ///
    /// Callers that miss while a load for the same owner is running wait for
    /// it and then re-check the cache. A failed load is returned to its caller
    /// only; waiters retry on their own.
    pub async fn get_or_load<F, Fut>(
        &self,
        owner: ItemId,
        load: F,
    ) -> Result<Arc<[Relationship]>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Relationship>, StoreError>>,
    {
        if let Some(edges) = self.get(owner).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%owner, "relationship cache hit");
            return Ok(edges);
        }

        let key = owner.content_id();
        let lock = Arc::clone(
            self.in_flight
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let _slot = InFlightSlot {
            map: &self.in_flight,
            key,
            lock: Arc::clone(&lock),
        };
        let _permit = lock.lock().await;

        if let Some(edges) = self.get(owner).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%owner, "relationship cache hit after wait");
            return Ok(edges);
        }

        let generation = self.generation.load(Ordering::Acquire);
        self.loads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%owner, category = %self.category, "relationship cache miss, loading");

        let edges: Arc<[Relationship]> = load().await?.into();
        self.store_if_current(owner, Arc::clone(&edges), generation)
            .await;
        Ok(edges)
    }

    async fn store_if_current(&self, owner: ItemId, edges: Arc<[Relationship]>, generation: u64) {
        if self.generation.load(Ordering::Acquire) != generation {
            tracing::debug!(%owner, "eviction overlapped load, not caching");
            return;
        }
        let key = owner.content_id();
        self.entries
            .insert(key, Arc::new(CachedEdges { owner, edges }))
            .await;
        if self.generation.load(Ordering::Acquire) != generation {
            self.entries.invalidate(&key).await;
        }
    }

    /// Evict one owner (all revisions)
    pub async fn evict(&self, owner: ContentId) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.entries.invalidate(&owner).await;
        tracing::debug!(%owner, "relationship cache evicted owner");
    }

    /// Evict every owner in `owners`
    pub async fn evict_owners(&self, owners: &[ItemId]) {
        for owner in owners {
            self.evict(owner.content_id()).await;
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.entries.invalidate_all();
        tracing::debug!(category = %self.category, "relationship cache cleared");
    }

    /// Check if `owner` is cached for that revision
    pub async fn contains(&self, owner: ItemId) -> bool {
        self.get(owner).await.is_some()
    }

    /// Number of owners with a load in progress
    #[inline]
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count: self.entries.entry_count(),
        }
    }
}

impl Default for RelationshipCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cre_item::RelationshipId;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn edge(id: u64, owner: ItemId) -> Relationship {
        Relationship::new(RelationshipId(id), owner, ItemId::new(900 + id, 1), "ActiveAssembly")
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let cache = RelationshipCache::new();
        let owner = ItemId::new(1, 1);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let edges = cache
                .get_or_load(owner, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![edge(1, owner)])
                })
                .await
                .unwrap();
            assert_eq!(edges.len(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().loads, 1);
    }

    #[tokio::test]
    async fn other_revision_is_a_miss() {
        let cache = RelationshipCache::new();
        let rev1 = ItemId::new(1, 1);
        let rev2 = ItemId::new(1, 2);

        cache
            .get_or_load(rev1, || async { Ok(vec![edge(1, rev1)]) })
            .await
            .unwrap();
        assert!(cache.contains(rev1).await);
        assert!(!cache.contains(rev2).await);
    }

    #[tokio::test]
    async fn eviction_forces_reload() {
        let cache = RelationshipCache::new();
        let owner = ItemId::new(1, 1);
        cache
            .get_or_load(owner, || async { Ok(vec![edge(1, owner)]) })
            .await
            .unwrap();

        cache.evict_owners(&[ItemId::new(1, 7)]).await;
        assert!(!cache.contains(owner).await);

        let edges = cache
            .get_or_load(owner, || async { Ok(vec![edge(1, owner), edge(2, owner)]) })
            .await
            .unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = RelationshipCache::new();
        for c in 1..=3 {
            let owner = ItemId::new(c, 1);
            cache
                .get_or_load(owner, || async move { Ok(vec![edge(c, owner)]) })
                .await
                .unwrap();
        }
        cache.clear();
        for c in 1..=3 {
            assert!(!cache.contains(ItemId::new(c, 1)).await);
        }
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_load() {
        let cache = Arc::new(RelationshipCache::new());
        let owner = ItemId::new(5, 1);
        let calls = Arc::new(AtomicUsize::new(0));

        let lookups = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .get_or_load(owner, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(vec![edge(1, owner)])
                    })
                    .await
            }
        });
        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn failed_load_releases_lock_and_caches_nothing() {
        let cache = RelationshipCache::new();
        let owner = ItemId::new(5, 1);

        let result = cache
            .get_or_load(owner, || async {
                Err(StoreError::Unavailable("down".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.in_flight_len(), 0);
        assert!(!cache.contains(owner).await);
    }

    #[tokio::test]
    async fn eviction_during_load_does_not_repopulate() {
        let cache = RelationshipCache::new();
        let owner = ItemId::new(5, 1);

        let edges = cache
            .get_or_load(owner, || async {
                cache.evict(owner.content_id()).await;
                Ok(vec![edge(1, owner)])
            })
            .await
            .unwrap();

        assert_eq!(edges.len(), 1);
        assert!(!cache.contains(owner).await);
    }
}
