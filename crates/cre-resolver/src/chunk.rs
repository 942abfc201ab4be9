//! Chunked visibility filtering
//!
//! Candidates are submitted to the filter in bounded batches, in the order
//! the strategy produced them. Filtering stops as soon as more survivors
//! exist than the result limit allows, so large candidate sets are never
//! filtered in full for a small container and truncation is always observed
//! rather than guessed.

use crate::config::ChunkConfig;
use crate::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use cre_item::{ContentItem, ContentItemSet};
use cre_store::ItemFilter;
use std::collections::BTreeMap;

/// Result of a chunked filter run
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Survivors, in filter return order across batches
    pub items: ContentItemSet,
    /// Whether every candidate was submitted
    pub exhausted: bool,
    /// Number of filter calls made
    pub batches: usize,
}

/// Submits candidates to an [`ItemFilter`] in bounded chunks
#[derive(Clone, Copy)]
pub struct ChunkedFilter<'a> {
    filter: &'a dyn ItemFilter,
    config: &'a ChunkConfig,
}

impl<'a> ChunkedFilter<'a> {
    /// Create chunked filter
    #[inline]
    #[must_use]
    pub fn new(filter: &'a dyn ItemFilter, config: &'a ChunkConfig) -> Self {
        Self { filter, config }
    }

    /// Filter `candidates` for `ctx`
    ///
    /// Items without a site are stamped with the source item's site before
    /// submission. Cancellation is checked before every batch.
    pub async fn run(
        &self,
        ctx: &ResolveContext<'_>,
        candidates: ContentItemSet,
    ) -> ResolveResult<FilterOutcome> {
        let chunk_size = self.config.chunk_size(ctx.max_results);
        let filter_context = ctx.params.flatten();
        let source_site = ctx.source.site_id();

        let mut outcome = FilterOutcome {
            items: ContentItemSet::with_capacity(candidates.len().min(chunk_size)),
            exhausted: true,
            batches: 0,
        };
        let mut pending = candidates.into_iter().peekable();
        let mut buffer: Vec<ContentItem> = Vec::with_capacity(chunk_size);

        while pending.peek().is_some() {
            buffer.extend(pending.by_ref().take(chunk_size).map(|mut item| {
                item.stamp_site_if_absent(source_site);
                item
            }));
            self.submit(ctx, &mut buffer, &filter_context, &mut outcome)
                .await?;

            if ctx.max_results > 0 && outcome.items.len() > ctx.max_results {
                outcome.exhausted = pending.peek().is_none();
                break;
            }
        }

        tracing::debug!(
            container = %ctx.container.name,
            survivors = outcome.items.len(),
            batches = outcome.batches,
            chunk_size,
            exhausted = outcome.exhausted,
            "chunked filtering complete"
        );
        Ok(outcome)
    }

    async fn submit(
        &self,
        ctx: &ResolveContext<'_>,
        buffer: &mut Vec<ContentItem>,
        filter_context: &BTreeMap<String, String>,
        outcome: &mut FilterOutcome,
    ) -> ResolveResult<()> {
        ctx.ensure_active()?;
        let batch = std::mem::take(buffer);
        let submitted = batch.len();
        outcome.batches += 1;

        let survivors = self
            .filter
            .filter(batch, filter_context)
            .await
            .map_err(|err| {
                tracing::error!(
                    container = %ctx.container.name,
                    batch = outcome.batches,
                    error = %err,
                    "item filter failed"
                );
                ResolveError::from(err)
            })?;

        tracing::trace!(submitted, survived = survivors.len(), "filter batch");
        outcome.items.extend(survivors);
        Ok(())
    }
}

impl std::fmt::Debug for ChunkedFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedFilter")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cre_item::params::keys;
    use cre_item::{ItemId, Params, SiteId};
    use cre_test_utils::{container, item_ids, source_item, RecordingFilter};
    use tokio_util::sync::CancellationToken;

    fn candidates(count: u64) -> ContentItemSet {
        item_ids(count).into_iter().map(ContentItem::new).collect()
    }

    #[tokio::test]
    async fn stops_once_limit_is_met() {
        let filter = RecordingFilter::allow_all();
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let params = Params::new().with(keys::MAX_RESULTS, "5");
        let ctx = ResolveContext::new(&source, &container, &params, &cancel).unwrap();

        let outcome = ChunkedFilter::new(&filter, &config)
            .run(&ctx, candidates(10_000))
            .await
            .unwrap();

        assert_eq!(filter.batch_sizes(), vec![100]);
        assert_eq!(outcome.items.len(), 100);
        assert!(!outcome.exhausted);
    }

    #[tokio::test]
    async fn unlimited_filters_everything_in_max_chunks() {
        let filter = RecordingFilter::allow_all();
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let ctx = ResolveContext::new(&source, &container, &Params::new(), &cancel).unwrap();

        let outcome = ChunkedFilter::new(&filter, &config)
            .run(&ctx, candidates(2_500))
            .await
            .unwrap();

        assert_eq!(filter.batch_sizes(), vec![999, 999, 502]);
        assert_eq!(outcome.items.len(), 2_500);
        assert!(outcome.exhausted);
    }

    #[tokio::test]
    async fn keeps_filtering_until_enough_survive() {
        let filter = RecordingFilter::allowing(|item| item.item_id().content_id().0 % 50 == 0);
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let params = Params::new().with(keys::MAX_RESULTS, "3");
        let ctx = ResolveContext::new(&source, &container, &params, &cancel).unwrap();

        let outcome = ChunkedFilter::new(&filter, &config)
            .run(&ctx, candidates(1_000))
            .await
            .unwrap();

        // two survivors per batch of 100
        assert_eq!(filter.calls(), 2);
        assert_eq!(outcome.items.len(), 4);
    }

    #[tokio::test]
    async fn exact_limit_keeps_filtering_to_the_end() {
        let filter = RecordingFilter::allowing(|item| item.item_id().content_id().0 <= 3);
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let params = Params::new().with(keys::MAX_RESULTS, "3");
        let ctx = ResolveContext::new(&source, &container, &params, &cancel).unwrap();

        let outcome = ChunkedFilter::new(&filter, &config)
            .run(&ctx, candidates(350))
            .await
            .unwrap();

        assert_eq!(filter.batch_sizes(), vec![100, 100, 100, 50]);
        assert_eq!(outcome.items.len(), 3);
        assert!(outcome.exhausted);
    }

    #[tokio::test]
    async fn stamps_source_site_and_passes_params() {
        let filter = RecordingFilter::allow_all();
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let params = Params::new().with(keys::LOCALE, "fr-fr");
        let ctx = ResolveContext::new(&source, &container, &params, &cancel).unwrap();
        let set: ContentItemSet = vec![
            ContentItem::new(ItemId::new(2, 1)),
            ContentItem::new(ItemId::new(3, 1)).with_site_id(SiteId(9)),
        ]
        .into_iter()
        .collect();

        let outcome = ChunkedFilter::new(&filter, &config).run(&ctx, set).await.unwrap();

        let sites: Vec<_> = outcome.items.iter().map(ContentItem::site_id).collect();
        assert_eq!(sites, vec![Some(SiteId(9)), Some(SiteId(1))]);
        assert_eq!(filter.contexts()[0].get(keys::LOCALE).map(String::as_str), Some("fr-fr"));
    }

    #[tokio::test]
    async fn cancelled_before_first_batch() {
        let filter = RecordingFilter::allow_all();
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let ctx = ResolveContext::new(&source, &container, &Params::new(), &cancel).unwrap();
        cancel.cancel();

        let err = ChunkedFilter::new(&filter, &config)
            .run(&ctx, candidates(10))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(filter.calls(), 0);
    }

    #[tokio::test]
    async fn filter_failure_propagates() {
        let filter = RecordingFilter::failing();
        let config = ChunkConfig::default();
        let source = source_item(1);
        let container = container(1, "main", "query");
        let cancel = CancellationToken::new();
        let ctx = ResolveContext::new(&source, &container, &Params::new(), &cancel).unwrap();

        let err = ChunkedFilter::new(&filter, &config)
            .run(&ctx, candidates(10))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Filter(_)));
    }
}
