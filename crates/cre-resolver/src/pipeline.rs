//! Resolution pipeline shared by every strategy
//!
//! A [`ContentResolver`] drives one [`CandidateSource`] through the fixed
//! sequence fetch, chunked filter, order, limit and materialize. Strategies
//! only decide which candidates exist; everything after the fetch is common.

use crate::chunk::ChunkedFilter;
use crate::config::ResolverConfig;
use crate::context::{ResolveContext, Services};
use crate::error::{ResolveError, ResolveResult};
use crate::order::{reorder_by_query, ItemComparator, RankComparator};
use async_trait::async_trait;
use cre_item::params::keys;
use cre_item::{AssemblyItem, Container, ContentItem, ContentItemSet, Params, TemplateId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Produces the raw candidates for a container
///
/// Implementations must be safe to call concurrently; all per-call state
/// lives in the [`ResolveContext`].
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Strategy name (for logging and registry keys)
    fn name(&self) -> &'static str;

    /// Whether results go through filtering, ordering and limiting
    fn is_set_oriented(&self) -> bool {
        true
    }

    /// Whether `order_by` may refine the comparator order
    fn supports_reorder(&self) -> bool {
        false
    }

    /// Total order applied after filtering
    fn comparator(&self) -> &dyn ItemComparator {
        &RankComparator
    }

    /// Candidate items, in production order
    async fn fetch_candidates(&self, ctx: &ResolveContext<'_>) -> ResolveResult<ContentItemSet>;
}

/// Items remaining after the limit step
#[derive(Debug, Clone, Default)]
struct Selection {
    items: Vec<ContentItem>,
    had_more: bool,
}

/// One strategy plus the shared pipeline around it
#[derive(Clone)]
pub struct ContentResolver {
    strategy: Arc<dyn CandidateSource>,
    services: Services,
    config: ResolverConfig,
}

impl ContentResolver {
    /// Create resolver for `strategy`
    #[must_use]
    pub fn new(
        strategy: Arc<dyn CandidateSource>,
        services: Services,
        config: ResolverConfig,
    ) -> Self {
        Self {
            strategy,
            services,
            config,
        }
    }

    /// Strategy name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Effective configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `container` for `source` into render work-orders
    ///
    /// Set-oriented strategies record on `source` whether the limit dropped
    /// results. Nothing is recorded when the call fails.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(strategy = self.strategy.name(), container = %container.name, source = %source.id())
    )]
    pub async fn resolve(
        &self,
        source: &AssemblyItem,
        container: &Container,
        params: &Params,
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<AssemblyItem>> {
        let ctx = ResolveContext::new(source, container, params, cancel)?;
        ctx.ensure_active()?;

        let candidates = self.strategy.fetch_candidates(&ctx).await?;
        tracing::debug!(candidates = candidates.len(), "fetched candidates");

        let set_oriented = self.strategy.is_set_oriented();
        let selection = if set_oriented {
            self.select(&ctx, candidates).await?
        } else {
            Selection {
                items: candidates.into_vec(),
                had_more: false,
            }
        };

        ctx.ensure_active()?;
        let resolved = self.materialize(&ctx, selection.items).await?;

        if set_oriented {
            source.set_had_more(selection.had_more);
        }
        tracing::debug!(
            resolved = resolved.len(),
            had_more = selection.had_more,
            "container resolved"
        );
        Ok(resolved)
    }

    async fn select(
        &self,
        ctx: &ResolveContext<'_>,
        candidates: ContentItemSet,
    ) -> ResolveResult<Selection> {
        let outcome = ChunkedFilter::new(self.services.filter.as_ref(), &self.config.chunk)
            .run(ctx, candidates)
            .await?;
        let mut items = outcome.items;

        let comparator = self.strategy.comparator();
        items.sort_by(|a, b| comparator.compare(a, b));

        if self.strategy.supports_reorder() {
            if let Some(clause) = ctx.params.first_non_blank(keys::ORDER_BY) {
                ctx.ensure_active()?;
                items = reorder_by_query(
                    self.services.store.as_ref(),
                    items,
                    clause,
                    ctx.params.first_non_blank(keys::LOCALE),
                )
                .await;
            }
        }

        let had_more = ctx.max_results > 0 && items.truncate(ctx.max_results);

        Ok(Selection {
            items: items.into_vec(),
            had_more,
        })
    }

    async fn materialize(
        &self,
        ctx: &ResolveContext<'_>,
        items: Vec<ContentItem>,
    ) -> ResolveResult<Vec<AssemblyItem>> {
        let explicit_template = self.explicit_template(ctx).await?;
        let source = ctx.source;

        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let mut work = self.services.cloner.clone_item(source).map_err(|err| {
                tracing::error!(item = %item.item_id(), error = %err, "failed to clone work-order");
                ResolveError::from(err)
            })?;
            work.set_id(item.item_id());
            work.set_template_id(
                explicit_template
                    .or(item.template_id())
                    .or(source.template_id()),
            );
            work.set_site_id(item.site_id().or(source.site_id()));
            work.set_folder_id(item.folder_id());
            match item.relationship_id() {
                Some(rel) => work.params_mut().insert(keys::RELATIONSHIP_ID, rel.to_string()),
                None => {
                    work.params_mut().remove(keys::RELATIONSHIP_ID);
                }
            }
            resolved.push(work);
        }
        Ok(resolved)
    }

    async fn explicit_template(
        &self,
        ctx: &ResolveContext<'_>,
    ) -> ResolveResult<Option<TemplateId>> {
        let Some(name) = ctx.params.first_non_blank(keys::TEMPLATE) else {
            return Ok(None);
        };
        let found = self
            .services
            .templates
            .find_by_name(name)
            .await
            .map_err(|err| {
                tracing::error!(
                    template = name,
                    source = %ctx.source.id(),
                    slot = %ctx.container.id,
                    error = %err,
                    "template lookup failed"
                );
                ResolveError::store(format!("looking up template '{name}'"), err)
            })?;
        match found {
            Some(id) => Ok(Some(id)),
            None => {
                tracing::warn!(template = name, "template named by container not found");
                Err(ResolveError::not_found("template", name))
            }
        }
    }
}

impl std::fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentResolver")
            .field("strategy", &self.strategy.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
