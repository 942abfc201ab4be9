//! Cache eviction on relationship change notifications

use crate::cache::RelationshipCache;
use async_trait::async_trait;
use cre_store::{ChangeEvent, ChangeHandler, EventKind, NotificationBus};
use std::sync::Arc;

/// Evicts owners named by relationship change events
///
/// Events that do not identify every affected owner clear the whole cache.
#[derive(Debug, Clone)]
pub struct RelationshipChangeListener {
    cache: Arc<RelationshipCache>,
}

impl RelationshipChangeListener {
    /// Create listener for `cache`
    #[inline]
    #[must_use]
    pub fn new(cache: Arc<RelationshipCache>) -> Self {
        Self { cache }
    }

    /// Create listener and subscribe it to `bus`
    pub fn register(bus: &dyn NotificationBus, cache: Arc<RelationshipCache>) -> Arc<Self> {
        let listener = Arc::new(Self::new(cache));
        bus.subscribe(
            EventKind::RelationshipChanged,
            Arc::clone(&listener) as Arc<dyn ChangeHandler>,
        );
        tracing::info!("relationship cache listener registered");
        listener
    }
}

#[async_trait]
impl ChangeHandler for RelationshipChangeListener {
    async fn handle(&self, event: &ChangeEvent) {
        if event.kind != EventKind::RelationshipChanged {
            return;
        }
        match event.owners() {
            Some(owners) => {
                tracing::debug!(owners = owners.len(), "evicting changed relationship owners");
                self.cache.evict_owners(&owners).await;
            }
            None => {
                tracing::debug!("relationship change without owners, clearing cache");
                self.cache.clear();
            }
        }
    }
}
