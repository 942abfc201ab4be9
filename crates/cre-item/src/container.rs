//! Container (slot) descriptors

use crate::id::ContainerId;
use crate::params::Params;
use serde::{Deserialize, Serialize};

/// Named placeholder in a template that resolves to a list of items
///
/// `finder` names the resolution strategy; `params` are defaults the caller's
/// parameters are laid over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container id, matched against relationship slot properties
    pub id: ContainerId,
    /// Container name
    pub name: String,
    /// Strategy name
    pub finder: String,
    /// Relationship category override
    pub relationship_category: Option<String>,
    /// Declared default parameters
    #[serde(default)]
    pub params: Params,
}

impl Container {
    /// Create container resolved by `finder`
    #[must_use]
    pub fn new(id: ContainerId, name: impl Into<String>, finder: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            finder: finder.into(),
            relationship_category: None,
            params: Params::new(),
        }
    }

    /// With relationship category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.relationship_category = Some(category.into());
        self
    }

    /// With default parameter
    #[inline]
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }
}
