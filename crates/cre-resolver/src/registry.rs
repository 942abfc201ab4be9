//! Resolver registry keyed by container finder name
//!
//! Provides [`ResolverRegistry`] for dispatching a container to the pipeline
//! registered under its `finder`.

use crate::config::ResolverConfig;
use crate::context::Services;
use crate::error::{ResolveError, ResolveResult};
use crate::pipeline::{CandidateSource, ContentResolver};
use crate::strategies::{
    LegacyResourceResolver, NavigationResolver, QueryResolver, RelationshipResolver,
    TranslationResolver,
};
use cre_cache::RelationshipCache;
use cre_item::{AssemblyItem, Container, Params};
use cre_store::{NavigationIndex, RelationshipStore, ResourceInvoker};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Built-in resolution strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Caller-supplied store query
    Query,
    /// Outbound assembly relationships of the source
    Relationship,
    /// Navigation node beside the source
    Navigation,
    /// Named legacy resource
    LegacyResource,
    /// Translations of the source
    Translation,
}

impl StrategyKind {
    /// All built-in kinds
    pub const ALL: [Self; 5] = [
        Self::Query,
        Self::Relationship,
        Self::Navigation,
        Self::LegacyResource,
        Self::Translation,
    ];

    /// Finder name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Relationship => "relationship",
            Self::Navigation => "navigation",
            Self::LegacyResource => "legacy_resource",
            Self::Translation => "translation",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| ResolveError::not_found("finder", s))
    }
}

/// Backing capabilities the built-in strategies read from
#[derive(Clone)]
pub struct Backends {
    /// Relationship edges
    pub relationships: Arc<dyn RelationshipStore>,
    /// Navigation tree
    pub navigation: Arc<dyn NavigationIndex>,
    /// Legacy named resources
    pub resources: Arc<dyn ResourceInvoker>,
    /// Shared relationship cache
    pub cache: Arc<RelationshipCache>,
}

impl Backends {
    /// Create backends with a relationship cache built from `config`
    ///
    /// The returned cache is the one to register with the notification bus.
    #[must_use]
    pub fn from_config(
        relationships: Arc<dyn RelationshipStore>,
        navigation: Arc<dyn NavigationIndex>,
        resources: Arc<dyn ResourceInvoker>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            relationships,
            navigation,
            resources,
            cache: Arc::new(RelationshipCache::with_config(&config.relationship_cache)),
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Registry of resolution pipelines by finder name
#[derive(Debug, Default, Clone)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<ContentResolver>>,
}

impl ResolverRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Create registry with every built-in strategy
    ///
    /// `config` supplies the chunking settings of every pipeline. The
    /// relationship cache is taken from `backends` as is, since it is shared
    /// with the change listener; build it with [`Backends::from_config`] to
    /// apply `config.relationship_cache`.
    #[must_use]
    pub fn with_defaults(
        backends: &Backends,
        services: &Services,
        config: &ResolverConfig,
    ) -> Self {
        if backends.cache.category() != config.relationship_cache.category {
            tracing::warn!(
                cache = backends.cache.category(),
                configured = %config.relationship_cache.category,
                "relationship cache was not built from the resolver config"
            );
        }
        let strategies: [(StrategyKind, Arc<dyn CandidateSource>); 5] = [
            (
                StrategyKind::Query,
                Arc::new(QueryResolver::new(Arc::clone(&services.store))),
            ),
            (
                StrategyKind::Relationship,
                Arc::new(RelationshipResolver::new(
                    Arc::clone(&backends.relationships),
                    Arc::clone(&backends.cache),
                )),
            ),
            (
                StrategyKind::Navigation,
                Arc::new(NavigationResolver::new(Arc::clone(&backends.navigation))),
            ),
            (
                StrategyKind::LegacyResource,
                Arc::new(LegacyResourceResolver::new(Arc::clone(&backends.resources))),
            ),
            (
                StrategyKind::Translation,
                Arc::new(TranslationResolver::new(Arc::clone(&backends.relationships))),
            ),
        ];

        let mut registry = Self::new();
        for (kind, strategy) in strategies {
            registry.register(
                kind.as_str(),
                ContentResolver::new(strategy, services.clone(), config.clone()),
            );
        }
        registry
    }

    /// Register a pipeline under `finder`, replacing any previous one
    pub fn register(&mut self, finder: &str, resolver: ContentResolver) {
        tracing::debug!(finder, strategy = resolver.name(), "registering resolver");
        self.resolvers.insert(finder.to_string(), Arc::new(resolver));
    }

    /// Get pipeline for `finder`
    #[inline]
    #[must_use]
    pub fn get(&self, finder: &str) -> Option<&Arc<ContentResolver>> {
        self.resolvers.get(finder)
    }

    /// Check if `finder` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, finder: &str) -> bool {
        self.resolvers.contains_key(finder)
    }

    /// Registered finder names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get number of registered pipelines
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve `container` with the pipeline named by its finder
    pub async fn resolve(
        &self,
        source: &AssemblyItem,
        container: &Container,
        params: &Params,
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<AssemblyItem>> {
        let resolver = self.get(container.finder.trim()).ok_or_else(|| {
            tracing::warn!(
                finder = %container.finder,
                container = %container.name,
                "unknown finder"
            );
            ResolveError::not_found("finder", container.finder.clone())
        })?;
        resolver.resolve(source, container, params, cancel).await
    }
}
