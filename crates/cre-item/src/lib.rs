//! CRE Item Model
//!
//! The values that flow through content resolution.
//!
//! # Core Concepts
//!
//! - [`ItemId`]: Content id + revision pair identifying a piece of content
//! - [`ContentItem`]: A candidate produced by a resolution strategy
//! - [`ContentItemSet`]: Insertion-ordered set keyed by `(item, relationship)`
//! - [`AssemblyItem`]: A render work-order, cloned per resolved item
//! - [`Container`]: Named placeholder resolved by a strategy
//! - [`Params`]: Multi-valued request parameters
//!
//! # Example
//!
//! ```rust
//! use cre_item::{ContentItem, ContentItemSet, ItemId, RelationshipId};
//!
//! let mut set = ContentItemSet::new();
//! set.insert(ContentItem::new(ItemId::new(301, 1)).with_relationship_id(RelationshipId(7)));
//! set.insert(ContentItem::new(ItemId::new(301, 1)).with_relationship_id(RelationshipId(8)));
//!
//! // Same item through two different edges is kept twice
//! assert_eq!(set.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod assembly;
mod container;
mod id;
mod item;
pub mod params;
mod set;

pub use assembly::{AssemblyItem, Bindings, HAD_MORE_BINDING};
pub use container::Container;
pub use id::{
    ContainerId, ContentId, FolderId, IdError, ItemId, RelationshipId, SiteId, TemplateId,
};
pub use item::{ContentItem, ItemKey};
pub use params::Params;
pub use set::ContentItemSet;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
