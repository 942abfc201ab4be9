//! Candidate sources for each container finder
//!
//! Every strategy only implements [`CandidateSource`](crate::CandidateSource);
//! filtering, ordering, limiting and materialization are shared.

mod legacy;
mod navigation;
mod query;
mod relationship;
mod translation;

pub use legacy::LegacyResourceResolver;
pub use navigation::NavigationResolver;
pub use query::QueryResolver;
pub use relationship::RelationshipResolver;
pub use translation::{TranslationResolver, TRANSLATION_CATEGORY};
