//! Per-call resolution context and injected collaborators

use crate::error::{ResolveError, ResolveResult};
use cre_item::params::keys;
use cre_item::{AssemblyItem, Container, Params};
use cre_store::{AssemblyCloner, ContentStore, DeepCloner, ItemFilter, TemplateCatalog};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything one `resolve` call knows about its request
///
/// `params` are the caller's parameters laid over the container defaults.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    /// Item being rendered
    pub source: &'a AssemblyItem,
    /// Container being filled
    pub container: &'a Container,
    /// Effective parameters
    pub params: Params,
    /// Result limit, 0 = unlimited
    pub max_results: usize,
    cancel: &'a CancellationToken,
}

impl<'a> ResolveContext<'a> {
    /// Build context, validating the container and `max_results`
    pub fn new(
        source: &'a AssemblyItem,
        container: &'a Container,
        params: &Params,
        cancel: &'a CancellationToken,
    ) -> ResolveResult<Self> {
        if container.name.trim().is_empty() {
            return Err(ResolveError::InvalidArgument(
                "container name must not be blank".to_string(),
            ));
        }
        let params = params.merged_over(&container.params);
        let max_results = parse_max_results(&params)?;
        Ok(Self {
            source,
            container,
            params,
            max_results,
            cancel,
        })
    }

    /// Fail with [`ResolveError::Cancelled`] once the caller has cancelled
    pub fn ensure_active(&self) -> ResolveResult<()> {
        if self.cancel.is_cancelled() {
            tracing::debug!(container = %self.container.name, "resolution cancelled");
            return Err(ResolveError::Cancelled);
        }
        Ok(())
    }

    /// Flattened params with the source item's identity and context added
    ///
    /// Caller-supplied values for the same keys win.
    #[must_use]
    pub fn params_with_source_context(&self, excluded: &[&str]) -> Params {
        let mut params = self.params.without(excluded);
        for (key, value) in self.source_context() {
            if !params.contains(key) {
                params.insert(key, value);
            }
        }
        params
    }

    fn source_context(&self) -> BTreeMap<&'static str, String> {
        let mut context = BTreeMap::new();
        let id = self.source.id();
        context.insert(keys::CONTENT_ID, id.content_id().to_string());
        context.insert(keys::REVISION, id.revision().to_string());
        if let Some(site) = self.source.site_id() {
            context.insert(keys::SITE_ID, site.to_string());
        }
        if let Some(folder) = self.source.folder_id() {
            context.insert(keys::FOLDER_ID, folder.to_string());
        }
        context
    }
}

fn parse_max_results(params: &Params) -> ResolveResult<usize> {
    let Some(raw) = params.first_non_blank(keys::MAX_RESULTS) else {
        return Ok(0);
    };
    let value: i64 = raw.parse().map_err(|_| {
        ResolveError::configuration(format!(
            "{} must be an integer, got '{raw}'",
            keys::MAX_RESULTS
        ))
    })?;
    Ok(usize::try_from(value).unwrap_or(0))
}

/// Collaborators shared by every pipeline
#[derive(Clone)]
pub struct Services {
    /// Backing content store (reorder-by-query)
    pub store: Arc<dyn ContentStore>,
    /// Visibility filter
    pub filter: Arc<dyn ItemFilter>,
    /// Work-order cloner
    pub cloner: Arc<dyn AssemblyCloner>,
    /// Template lookup by name
    pub templates: Arc<dyn TemplateCatalog>,
}

impl Services {
    /// Bundle collaborators, cloning with [`DeepCloner`]
    #[must_use]
    pub fn new(
        store: Arc<dyn ContentStore>,
        filter: Arc<dyn ItemFilter>,
        templates: Arc<dyn TemplateCatalog>,
    ) -> Self {
        Self {
            store,
            filter,
            cloner: Arc::new(DeepCloner),
            templates,
        }
    }

    /// With a different cloner
    #[inline]
    #[must_use]
    pub fn with_cloner(mut self, cloner: Arc<dyn AssemblyCloner>) -> Self {
        self.cloner = cloner;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
