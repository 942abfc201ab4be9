//! Legacy resource strategy: candidates listed by a named resource
//!
//! The resource answers with `{"items": [{"contentid", "revision", "templateid"?}]}`;
//! list order becomes sort rank.

use crate::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use crate::pipeline::CandidateSource;
use async_trait::async_trait;
use cre_item::params::keys;
use cre_item::{ContentItem, ContentItemSet, ItemId, TemplateId};
use cre_store::ResourceInvoker;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters consumed by the resolver and never forwarded to the resource
const STRATEGY_KEYS: &[&str] = &[
    keys::RESOURCE,
    keys::MAX_RESULTS,
    keys::ORDER_BY,
    keys::TEMPLATE,
    keys::QUERY,
    keys::QUERY_TYPE,
];

#[derive(Debug, Deserialize)]
struct ResourceDocument {
    items: Vec<ResourceEntry>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    contentid: u64,
    revision: u32,
    #[serde(default)]
    templateid: Option<u64>,
}

/// Invokes the `resource` parameter through a [`ResourceInvoker`]
#[derive(Clone)]
pub struct LegacyResourceResolver {
    invoker: Arc<dyn ResourceInvoker>,
}

impl LegacyResourceResolver {
    /// Create legacy resource strategy
    #[inline]
    #[must_use]
    pub fn new(invoker: Arc<dyn ResourceInvoker>) -> Self {
        Self { invoker }
    }
}

#[async_trait]
impl CandidateSource for LegacyResourceResolver {
    fn name(&self) -> &'static str {
        "legacy_resource"
    }

    async fn fetch_candidates(&self, ctx: &ResolveContext<'_>) -> ResolveResult<ContentItemSet> {
        let path = ctx.params.first_non_blank(keys::RESOURCE).ok_or_else(|| {
            ResolveError::configuration(format!(
                "container '{}' requires a non-blank '{}' parameter",
                ctx.container.name,
                keys::RESOURCE
            ))
        })?;
        let overrides = ctx.params_with_source_context(STRATEGY_KEYS);

        tracing::debug!(resource = path, params = overrides.len(), "invoking legacy resource");
        let document = self.invoker.invoke(path, &overrides).await.map_err(|err| {
            tracing::error!(
                resource = path,
                source = %ctx.source.id(),
                slot = %ctx.container.id,
                error = %err,
                "legacy resource invocation failed"
            );
            ResolveError::from(err)
        })?;
        let document: ResourceDocument = serde_json::from_value(document).map_err(|err| {
            tracing::error!(
                resource = path,
                slot = %ctx.container.id,
                error = %err,
                "unexpected resource document"
            );
            ResolveError::resource(path, format!("unexpected document shape: {err}"))
        })?;

        Ok(document
            .items
            .into_iter()
            .enumerate()
            .map(|(rank, entry)| {
                let item = ContentItem::new(ItemId::new(entry.contentid, entry.revision))
                    .with_sort_rank(i32::try_from(rank).unwrap_or(i32::MAX));
                match entry.templateid {
                    Some(template) => item.with_template_id(TemplateId(template)),
                    None => item,
                }
            })
            .collect())
    }
}

impl std::fmt::Debug for LegacyResourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyResourceResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cre_item::Params;
    use cre_test_utils::{container, source_item, StaticResources};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    async fn fetch(
        resources: &Arc<StaticResources>,
        params: Params,
    ) -> ResolveResult<ContentItemSet> {
        let invoker = Arc::clone(resources) as Arc<dyn ResourceInvoker>;
        let resolver = LegacyResourceResolver::new(invoker);
        let source = source_item(1);
        let container = container(3, "legacy", "legacy_resource");
        let cancel = CancellationToken::new();
        let ctx = ResolveContext::new(&source, &container, &params, &cancel)?;
        resolver.fetch_candidates(&ctx).await
    }

    #[tokio::test]
    async fn parses_items_in_order() {
        let resources = Arc::new(StaticResources::new(vec![(
            "app/related",
            json!({"items": [
                {"contentid": 8, "revision": 2, "templateid": 90},
                {"contentid": 3, "revision": 1}
            ]}),
        )]));
        let params = Params::new()
            .with(keys::RESOURCE, "app/related")
            .with(keys::MAX_RESULTS, "4")
            .with(keys::ORDER_BY, "sys_title")
            .with("color", "blue");

        let items = fetch(&resources, params).await.unwrap();

        let got: Vec<_> = items
            .iter()
            .map(|i| (i.item_id(), i.sort_rank(), i.template_id()))
            .collect();
        assert_eq!(
            got,
            vec![
                (ItemId::new(8, 2), 0, Some(TemplateId(90))),
                (ItemId::new(3, 1), 1, None)
            ]
        );

        let (_, forwarded) = &resources.calls()[0];
        assert_eq!(forwarded.first("color"), Some("blue"));
        assert_eq!(forwarded.first(keys::CONTENT_ID), Some("1"));
        assert!(!forwarded.contains(keys::RESOURCE));
        assert!(!forwarded.contains(keys::MAX_RESULTS));
        assert!(!forwarded.contains(keys::ORDER_BY));
    }

    #[tokio::test]
    async fn missing_resource_parameter() {
        let resources = Arc::new(StaticResources::default());
        let err = fetch(&resources, Params::new()).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn unknown_resource_is_not_found() {
        let resources = Arc::new(StaticResources::default());
        let err = fetch(&resources, Params::new().with(keys::RESOURCE, "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { kind: "resource", .. }));
    }

    #[tokio::test]
    async fn wrong_shape_is_resource_error() {
        let resources = Arc::new(StaticResources::new(vec![("bad", json!({"rows": []}))]));
        let err = fetch(&resources, Params::new().with(keys::RESOURCE, "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Resource { .. }));
    }
}
