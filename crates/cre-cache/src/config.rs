//! Relationship cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relationship category cached by default
pub const DEFAULT_CATEGORY: &str = "ActiveAssembly";

/// Relationship cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached owners
    pub max_capacity: u64,
    /// Optional hard expiry; staleness is otherwise bounded by notifications
    pub time_to_live_secs: Option<u64>,
    /// Relationship category held by the cache
    pub category: String,
}

impl CacheConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With capacity
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// With hard expiry
    #[inline]
    #[must_use]
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live_secs = Some(ttl.as_secs());
        self
    }

    /// With cached category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Hard expiry as a duration
    #[inline]
    #[must_use]
    pub fn time_to_live(&self) -> Option<Duration> {
        self.time_to_live_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_live_secs: None,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}
