//! CRE Resolver
//!
//! Decides which content items fill a container on a page being rendered.
//!
//! # Core Concepts
//!
//! - [`CandidateSource`]: Strategy producing raw candidates for a container
//! - [`ContentResolver`]: Fixed pipeline of fetch, chunked filter, order, limit, materialize
//! - [`ChunkedFilter`]: Bounded-batch visibility filtering with early exit
//! - [`RankComparator`]: Rank ordering with relationship / item id tie-break
//! - [`reorder_by_query`]: Optional store-driven `order_by` refinement
//! - [`ResolverRegistry`]: Dispatch by container finder name
//!
//! # Strategies
//!
//! - [`QueryResolver`]: rows of a caller-supplied query
//! - [`RelationshipResolver`]: cached outbound assembly edges
//! - [`NavigationResolver`]: navigation node beside the source
//! - [`LegacyResourceResolver`]: named legacy resource
//! - [`TranslationResolver`]: other translations of the source
//!
//! # Example
//!
//! ```rust,ignore
//! use cre_resolver::prelude::*;
//!
//! let backends = Backends::from_config(relationships, navigation, resources, &config);
//! RelationshipChangeListener::register(bus.as_ref(), Arc::clone(&backends.cache));
//!
//! let registry = ResolverRegistry::with_defaults(&backends, &services, &config);
//! let items = registry
//!     .resolve(&page, &container, &params, &CancellationToken::new())
//!     .await?;
//! if page.had_more() {
//!     // render a "more" link
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod chunk;
pub mod config;
pub mod context;
pub mod error;
pub mod order;
pub mod pipeline;
pub mod registry;
pub mod strategies;

pub use chunk::{ChunkedFilter, FilterOutcome};
pub use config::{ChunkConfig, ResolverConfig};
pub use context::{ResolveContext, Services};
pub use error::{ResolveError, ResolveResult};
pub use order::{is_valid_order_clause, reorder_by_query, ItemComparator, RankComparator};
pub use pipeline::{CandidateSource, ContentResolver};
pub use registry::{Backends, ResolverRegistry, StrategyKind};
pub use strategies::{
    LegacyResourceResolver, NavigationResolver, QueryResolver, RelationshipResolver,
    TranslationResolver, TRANSLATION_CATEGORY,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for resolving containers
    pub use crate::config::ResolverConfig;
    pub use crate::context::Services;
    pub use crate::error::{ResolveError, ResolveResult};
    pub use crate::pipeline::{CandidateSource, ContentResolver};
    pub use crate::registry::{Backends, ResolverRegistry, StrategyKind};
    pub use cre_cache::{RelationshipCache, RelationshipChangeListener};
    pub use cre_item::{AssemblyItem, Container, ContentItem, ContentItemSet, ItemId, Params};
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
}
