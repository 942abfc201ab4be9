//! CRE Store Interfaces
//!
//! Capabilities the resolution engine consumes but does not own.
//!
//! # Capabilities
//!
//! - [`ContentStore`]: query text + parameters → [`RowSet`]
//! - [`ItemFilter`]: candidate list + context → allowed subset
//! - [`RelationshipStore`]: owner/dependent edges by category
//! - [`NotificationBus`]: change-event subscription
//! - [`AssemblyCloner`]: per-item work-order cloning
//! - [`TemplateCatalog`]: template lookup by name
//! - [`NavigationIndex`]: navigation node beside an item
//! - [`ResourceInvoker`]: named legacy resource calls
//!
//! All capabilities are `Send + Sync` and intended to be shared as
//! `Arc<dyn Trait>`.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod assembly;
mod error;
mod events;
mod filter;
mod navigation;
mod query;
mod relationship;
mod resource;

pub use assembly::{AssemblyCloner, DeepCloner, TemplateCatalog};
pub use error::{CloneError, FilterError, ResourceError, StoreError};
pub use events::{ChangeEvent, ChangeHandler, ChangedEdge, EventKind, NotificationBus};
pub use filter::{ItemFilter, PassThroughFilter};
pub use navigation::{NavigationIndex, NavigationNode};
pub use query::{props, ContentStore, PropertyValue, QueryRequest, Row, RowSet, DEFAULT_QUERY_TYPE};
pub use relationship::{edge_props, Relationship, RelationshipQuery, RelationshipStore};
pub use resource::ResourceInvoker;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
