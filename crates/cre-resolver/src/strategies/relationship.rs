//! Relationship strategy: dependents of the source placed in the container

use crate::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use crate::pipeline::CandidateSource;
use async_trait::async_trait;
use cre_cache::RelationshipCache;
use cre_item::{ContainerId, ContentItem, ContentItemSet, FolderId, SiteId, TemplateId};
use cre_store::{edge_props, Relationship, RelationshipQuery, RelationshipStore};
use std::sync::Arc;

/// Turns the source item's outbound edges for one container into candidates
///
/// Edges of the cached category are read through the [`RelationshipCache`];
/// a container naming another category queries the store directly.
#[derive(Clone)]
pub struct RelationshipResolver {
    relationships: Arc<dyn RelationshipStore>,
    cache: Arc<RelationshipCache>,
}

impl RelationshipResolver {
    /// Create relationship strategy
    #[inline]
    #[must_use]
    pub fn new(relationships: Arc<dyn RelationshipStore>, cache: Arc<RelationshipCache>) -> Self {
        Self {
            relationships,
            cache,
        }
    }

    async fn edges(&self, ctx: &ResolveContext<'_>) -> ResolveResult<Arc<[Relationship]>> {
        let owner = ctx.source.id();
        let category = ctx
            .container
            .relationship_category
            .as_deref()
            .unwrap_or_else(|| self.cache.category());

        let result = if category == self.cache.category() {
            self.cache.edges_for(owner, self.relationships.as_ref()).await
        } else {
            tracing::debug!(category, "category not cached, querying store");
            self.relationships
                .query(&RelationshipQuery::owned_by(owner, category))
                .await
                .map(Arc::<[Relationship]>::from)
        };

        result.map_err(|err| {
            tracing::error!(
                %owner,
                slot = %ctx.container.id,
                error = %err,
                "relationship lookup failed"
            );
            ResolveError::store(format!("loading {category} relationships of {owner}"), err)
        })
    }
}

/// Candidate for `edge`, or `None` when it belongs to another container
fn candidate(edge: &Relationship, slot: ContainerId) -> Option<ContentItem> {
    if edge.parsed_property::<ContainerId>(edge_props::SLOT_ID) != Some(slot) {
        return None;
    }

    let mut item = ContentItem::new(edge.dependent)
        .with_relationship_id(edge.id)
        .with_owner_id(edge.owner)
        .with_sort_rank(edge.parsed_property(edge_props::SORT_RANK).unwrap_or(0));
    if let Some(site) = edge.parsed_property::<SiteId>(edge_props::SITE_ID) {
        item = item.with_site_id(site);
    }
    if let Some(folder) = edge.parsed_property::<FolderId>(edge_props::FOLDER_ID) {
        item = item.with_folder_id(folder);
    }
    if let Some(template) = edge.parsed_property::<TemplateId>(edge_props::TEMPLATE_ID) {
        item = item.with_template_id(template);
    }
    if let Some(widget) = edge.property(edge_props::WIDGET_NAME) {
        item = item.with_widget_name(widget);
    }
    Some(item)
}

#[async_trait]
impl CandidateSource for RelationshipResolver {
    fn name(&self) -> &'static str {
        "relationship"
    }

    fn supports_reorder(&self) -> bool {
        true
    }

    async fn fetch_candidates(&self, ctx: &ResolveContext<'_>) -> ResolveResult<ContentItemSet> {
        let edges = self.edges(ctx).await?;
        let slot = ctx.container.id;
        let items: ContentItemSet = edges
            .iter()
            .filter_map(|edge| candidate(edge, slot))
            .collect();
        tracing::debug!(
            edges = edges.len(),
            slotted = items.len(),
            %slot,
            "relationship candidates"
        );
        Ok(items)
    }
}

impl std::fmt::Debug for RelationshipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipResolver")
            .field("category", &self.cache.category())
            .finish_non_exhaustive()
    }
}
