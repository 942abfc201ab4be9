//! Permission / visibility filter capability

use crate::error::FilterError;
use async_trait::async_trait;
use cre_item::ContentItem;
use std::collections::BTreeMap;

/// Reduces a candidate list to the items visible in the current context
///
/// Implementations return a subset of `items`; the order of the returned
/// list is not relied upon.
#[async_trait]
pub trait ItemFilter: Send + Sync {
    /// Apply the filter to one batch
    async fn filter(
        &self,
        items: Vec<ContentItem>,
        context: &BTreeMap<String, String>,
    ) -> Result<Vec<ContentItem>, FilterError>;
}

/// Filter that allows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughFilter;

#[async_trait]
impl ItemFilter for PassThroughFilter {
    async fn filter(
        &self,
        items: Vec<ContentItem>,
        _context: &BTreeMap<String, String>,
    ) -> Result<Vec<ContentItem>, FilterError> {
        Ok(items)
    }
}
