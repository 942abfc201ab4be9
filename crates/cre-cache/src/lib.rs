//! CRE Relationship Cache
//!
//! Process-wide cache of an owner's outbound relationships, invalidated by
//! change notifications rather than by time.
//!
//! # Architecture
//!
//! ```text
//! resolver ──get_or_load(owner)──► RelationshipCache ──miss──► store
//!                                        ▲
//! NotificationBus ──RelationshipChanged──┘
//!     (RelationshipChangeListener: evict owners / clear)
//! ```
//!
//! Concurrent misses for one owner are collapsed onto a single store read
//! through a per-owner lock map; the map entry is removed when the load
//! finishes, successfully or not.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod config;
pub mod listener;

pub use cache::{CacheStats, RelationshipCache};
pub use config::{CacheConfig, DEFAULT_CATEGORY};
pub use listener::RelationshipChangeListener;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
