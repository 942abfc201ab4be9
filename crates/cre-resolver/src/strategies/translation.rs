//! Translation strategy: the other language versions of the source item
//!
//! When the source is a translation of some parent, candidates are the
//! parent followed by its other translations. Otherwise the source is taken
//! to be the parent and its translations are returned.

use crate::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use crate::pipeline::CandidateSource;
use async_trait::async_trait;
use cre_item::{ContentItem, ContentItemSet, ItemId};
use cre_store::{Relationship, RelationshipQuery, RelationshipStore};
use std::sync::Arc;

/// Relationship category linking a parent to its translations
pub const TRANSLATION_CATEGORY: &str = "Translation";

/// Finds translations of the source through translation edges
#[derive(Clone)]
pub struct TranslationResolver {
    relationships: Arc<dyn RelationshipStore>,
    category: String,
}

impl TranslationResolver {
    /// Create translation strategy using [`TRANSLATION_CATEGORY`]
    #[inline]
    #[must_use]
    pub fn new(relationships: Arc<dyn RelationshipStore>) -> Self {
        Self {
            relationships,
            category: TRANSLATION_CATEGORY.to_string(),
        }
    }

    /// With a different edge category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    async fn query(
        &self,
        ctx: &ResolveContext<'_>,
        query: RelationshipQuery,
    ) -> ResolveResult<Vec<Relationship>> {
        self.relationships.query(&query).await.map_err(|err| {
            tracing::error!(
                source = %ctx.source.id(),
                slot = %ctx.container.id,
                category = %self.category,
                error = %err,
                "translation lookup failed"
            );
            ResolveError::store(format!("looking up translations of {}", ctx.source.id()), err)
        })
    }
}

fn ranked(item: ItemId, rank: usize, edge: &Relationship) -> ContentItem {
    ContentItem::new(item)
        .with_sort_rank(i32::try_from(rank).unwrap_or(i32::MAX))
        .with_relationship_id(edge.id)
        .with_owner_id(edge.owner)
}

#[async_trait]
impl CandidateSource for TranslationResolver {
    fn name(&self) -> &'static str {
        "translation"
    }

    fn supports_reorder(&self) -> bool {
        true
    }

    async fn fetch_candidates(&self, ctx: &ResolveContext<'_>) -> ResolveResult<ContentItemSet> {
        let source = ctx.source.id();
        let parents = self
            .query(ctx, RelationshipQuery::depending_on(source, self.category.clone()))
            .await?;

        let Some(parent_edge) = parents.first() else {
            let children = self
                .query(ctx, RelationshipQuery::owned_by(source, self.category.clone()))
                .await?;
            tracing::debug!(
                %source,
                children = children.len(),
                "source is a translation parent"
            );
            return Ok(children
                .iter()
                .enumerate()
                .map(|(rank, edge)| ranked(edge.dependent, rank, edge))
                .collect());
        };

        let parent = parent_edge.owner;
        let siblings = self
            .query(ctx, RelationshipQuery::owned_by(parent, self.category.clone()))
            .await?;
        tracing::debug!(%source, %parent, siblings = siblings.len(), "source is a translation");

        let mut items = ContentItemSet::with_capacity(siblings.len());
        items.insert(ranked(parent, 0, parent_edge));
        let others = siblings
            .iter()
            .filter(|edge| edge.dependent.content_id() != source.content_id());
        for (rank, edge) in others.enumerate() {
            items.insert(ranked(edge.dependent, rank + 1, edge));
        }
        Ok(items)
    }
}

impl std::fmt::Debug for TranslationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationResolver")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}
