//! Navigation strategy: the navigation node beside the source item

use crate::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use crate::pipeline::CandidateSource;
use async_trait::async_trait;
use cre_item::{ContentItem, ContentItemSet};
use cre_store::NavigationIndex;
use std::sync::Arc;

/// Resolves to zero or one navigation node; skips filtering and limits
#[derive(Clone)]
pub struct NavigationResolver {
    index: Arc<dyn NavigationIndex>,
}

impl NavigationResolver {
    /// Create navigation strategy over `index`
    #[inline]
    #[must_use]
    pub fn new(index: Arc<dyn NavigationIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl CandidateSource for NavigationResolver {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn is_set_oriented(&self) -> bool {
        false
    }

    async fn fetch_candidates(&self, ctx: &ResolveContext<'_>) -> ResolveResult<ContentItemSet> {
        let source = ctx.source;
        let node = self
            .index
            .sibling_node(source.id(), source.folder_id())
            .await
            .map_err(|err| {
                tracing::error!(
                    source = %source.id(),
                    slot = %ctx.container.id,
                    error = %err,
                    "navigation lookup failed"
                );
                ResolveError::store(format!("finding navigation node beside {}", source.id()), err)
            })?;

        let Some(node) = node else {
            tracing::debug!(source = %source.id(), "no navigation node");
            return Ok(ContentItemSet::new());
        };

        let mut item = ContentItem::new(node.item);
        if let Some(folder) = node.folder {
            item = item.with_folder_id(folder);
        }
        if let Some(template) = node.template {
            item = item.with_template_id(template);
        }
        Ok(std::iter::once(item).collect())
    }
}

impl std::fmt::Debug for NavigationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationResolver").finish_non_exhaustive()
    }
}
