//! Query strategy: candidates are the rows of a caller-supplied query

use crate::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use crate::pipeline::CandidateSource;
use async_trait::async_trait;
use cre_item::params::keys;
use cre_item::{ContentItem, ContentItemSet, FolderId, ItemId, SiteId};
use cre_store::{props, ContentStore, QueryRequest, Row, DEFAULT_QUERY_TYPE};
use std::sync::Arc;

/// Runs the `query` parameter against the content store
///
/// Rows must project `sys_contentid` and `sys_revision`. A projected
/// `sys_folderid` becomes the item folder; with `mayHaveCrossSiteLinks` set,
/// a projected `sys_siteid` (or the source site) is stamped on each item.
#[derive(Clone)]
pub struct QueryResolver {
    store: Arc<dyn ContentStore>,
}

impl QueryResolver {
    /// Create query strategy over `store`
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    fn request(ctx: &ResolveContext<'_>) -> ResolveResult<QueryRequest> {
        let text = ctx.params.first_non_blank(keys::QUERY).ok_or_else(|| {
            ResolveError::configuration(format!(
                "container '{}' requires a non-blank '{}' parameter",
                ctx.container.name,
                keys::QUERY
            ))
        })?;
        let query_type = ctx
            .params
            .first_non_blank(keys::QUERY_TYPE)
            .unwrap_or(DEFAULT_QUERY_TYPE);
        let bind = ctx
            .params_with_source_context(&[keys::QUERY, keys::QUERY_TYPE, keys::MAX_RESULTS])
            .flatten();

        Ok(QueryRequest::new(text)
            .with_type(query_type)
            .with_params(bind)
            .with_locale(ctx.params.first_non_blank(keys::LOCALE).map(str::to_string)))
    }

    fn item_from_row(
        row: &Row,
        rank: usize,
        cross_site: Option<Option<SiteId>>,
    ) -> ResolveResult<ContentItem> {
        let content = row.get_u64(props::CONTENT_ID).ok_or_else(|| {
            ResolveError::configuration(format!("query result is missing {}", props::CONTENT_ID))
        })?;
        let revision = row
            .get_u64(props::REVISION)
            .and_then(|r| u32::try_from(r).ok())
            .ok_or_else(|| {
                ResolveError::configuration(format!(
                    "query result is missing a valid {}",
                    props::REVISION
                ))
            })?;

        let mut item = ContentItem::new(ItemId::new(content, revision))
            .with_sort_rank(i32::try_from(rank).unwrap_or(i32::MAX));
        if let Some(folder) = row.get_u64(props::FOLDER_ID) {
            item = item.with_folder_id(FolderId(folder));
        }
        if let Some(source_site) = cross_site {
            let site = row.get_u64(props::SITE_ID).map(SiteId).or(source_site);
            if let Some(site) = site {
                item = item.with_site_id(site);
            }
        }
        Ok(item)
    }
}

#[async_trait]
impl CandidateSource for QueryResolver {
    fn name(&self) -> &'static str {
        "query"
    }

    async fn fetch_candidates(&self, ctx: &ResolveContext<'_>) -> ResolveResult<ContentItemSet> {
        let request = Self::request(ctx)?;
        tracing::debug!(query_type = %request.query_type, "running container query");

        let text = request.text.clone();
        let rows = self.store.query(request).await.map_err(|err| {
            tracing::error!(
                container = %ctx.container.name,
                source = %ctx.source.id(),
                slot = %ctx.container.id,
                query = %text,
                error = %err,
                "container query failed"
            );
            ResolveError::store(
                format!("running query for container '{}'", ctx.container.name),
                err,
            )
        })?;

        let cross_site = ctx
            .params
            .flag(keys::MAY_HAVE_CROSS_SITE_LINKS)
            .then(|| ctx.source.site_id());

        rows.iter()
            .enumerate()
            .map(|(rank, row)| Self::item_from_row(row, rank, cross_site))
            .collect()
    }
}

impl std::fmt::Debug for QueryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cre_item::Params;
    use cre_store::RowSet;
    use cre_test_utils::{container, rows_for, source_item, ScriptedStore};
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    async fn fetch(store: &Arc<ScriptedStore>, params: Params) -> ResolveResult<ContentItemSet> {
        let resolver = QueryResolver::new(Arc::clone(store) as Arc<dyn ContentStore>);
        let source = source_item(1);
        let container = container(2, "results", "query");
        let cancel = CancellationToken::new();
        let ctx = ResolveContext::new(&source, &container, &params, &cancel)?;
        resolver.fetch_candidates(&ctx).await
    }

    #[tokio::test]
    async fn blank_query_is_configuration_error() {
        let store = Arc::new(ScriptedStore::returning(RowSet::default()));

        let err = fetch(&store, Params::new().with(keys::QUERY, "  ")).await.unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn rows_become_ranked_items() {
        let store = Arc::new(ScriptedStore::returning(rows_for(&[
            ItemId::new(30, 2),
            ItemId::new(10, 1),
        ])));
        let params = Params::new()
            .with(keys::QUERY, "select * from items")
            .with(keys::MAX_RESULTS, "5")
            .with("topic", "news");

        let items = fetch(&store, params).await.unwrap();

        let got: Vec<_> = items.iter().map(|i| (i.item_id(), i.sort_rank())).collect();
        assert_eq!(got, vec![(ItemId::new(30, 2), 0), (ItemId::new(10, 1), 1)]);

        let request = &store.requests()[0];
        assert_eq!(request.query_type, DEFAULT_QUERY_TYPE);
        assert_eq!(request.params.get("topic").map(String::as_str), Some("news"));
        assert_eq!(request.params.get(keys::CONTENT_ID).map(String::as_str), Some("1"));
        assert!(!request.params.contains_key(keys::QUERY));
        assert!(!request.params.contains_key(keys::MAX_RESULTS));
    }

    #[tokio::test]
    async fn folder_and_cross_site_projection() {
        let store = Arc::new(ScriptedStore::returning(RowSet::new(vec![
            Row::new()
                .with(props::CONTENT_ID, 5)
                .with(props::REVISION, 1)
                .with(props::FOLDER_ID, 40)
                .with(props::SITE_ID, 3),
            Row::new().with(props::CONTENT_ID, 6).with(props::REVISION, 1),
        ])));

        let items = fetch(
            &store,
            Params::new()
                .with(keys::QUERY, "q")
                .with(keys::QUERY_TYPE, "jcr"),
        )
        .await
        .unwrap();
        let first = items.first().unwrap();
        assert_eq!(first.folder_id(), Some(FolderId(40)));
        assert_eq!(first.site_id(), None);
        assert_eq!(store.requests()[0].query_type, "jcr");

        let items = fetch(
            &store,
            Params::new()
                .with(keys::QUERY, "q")
                .with(keys::MAY_HAVE_CROSS_SITE_LINKS, "true"),
        )
        .await
        .unwrap();
        let sites: Vec<_> = items.iter().map(ContentItem::site_id).collect();
        assert_eq!(sites, vec![Some(SiteId(3)), Some(SiteId(1))]);
    }

    #[tokio::test]
    async fn missing_revision_is_rejected() {
        let store = Arc::new(ScriptedStore::returning(RowSet::new(vec![
            Row::new().with(props::CONTENT_ID, 5),
        ])));

        let err = fetch(&store, Params::new().with(keys::QUERY, "q")).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn store_failure_is_surfaced() {
        let store = Arc::new(ScriptedStore::failing("syntax error"));

        let err = fetch(&store, Params::new().with(keys::QUERY, "q")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Store { .. }));
    }
}
