//! Relationship store capability

use crate::error::StoreError;
use async_trait::async_trait;
use cre_item::{ItemId, RelationshipId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known edge property names
pub mod edge_props {
    /// Container the dependent is placed in
    pub const SLOT_ID: &str = "sys_slotid";
    /// Position of the dependent within the container
    pub const SORT_RANK: &str = "sys_sortrank";
    /// Site context for cross-site links
    pub const SITE_ID: &str = "sys_siteid";
    /// Folder context for cross-site links
    pub const FOLDER_ID: &str = "sys_folderid";
    /// Placeholder widget name
    pub const WIDGET_NAME: &str = "sys_widgetname";
    /// Template the dependent is rendered with
    pub const TEMPLATE_ID: &str = "sys_variantid";
}

/// Owner → dependent edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Edge id
    pub id: RelationshipId,
    /// Owner side
    pub owner: ItemId,
    /// Dependent side
    pub dependent: ItemId,
    /// Edge category (e.g. `ActiveAssembly`, `Translation`)
    pub category: String,
    /// String properties
    pub properties: BTreeMap<String, String>,
}

impl Relationship {
    /// Create edge without properties
    #[must_use]
    pub fn new(
        id: RelationshipId,
        owner: ItemId,
        dependent: ItemId,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner,
            dependent,
            category: category.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Property value, blank treated as absent
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Property parsed as a number or id
    #[must_use]
    pub fn parsed_property<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.property(name).and_then(|v| v.parse().ok())
    }
}

/// Edge lookup by owner and/or dependent within one category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipQuery {
    /// Owner to match
    pub owner: Option<ItemId>,
    /// Dependent to match
    pub dependent: Option<ItemId>,
    /// Category to match
    pub category: String,
}

impl RelationshipQuery {
    /// Edges owned by `owner`
    #[must_use]
    pub fn owned_by(owner: ItemId, category: impl Into<String>) -> Self {
        Self {
            owner: Some(owner),
            dependent: None,
            category: category.into(),
        }
    }

    /// Edges pointing at `dependent`
    #[must_use]
    pub fn depending_on(dependent: ItemId, category: impl Into<String>) -> Self {
        Self {
            owner: None,
            dependent: Some(dependent),
            category: category.into(),
        }
    }

    /// Check whether an edge satisfies this query
    #[must_use]
    pub fn matches(&self, edge: &Relationship) -> bool {
        edge.category == self.category
            && self.owner.map_or(true, |o| o == edge.owner)
            && self.dependent.map_or(true, |d| d == edge.dependent)
    }
}

/// Relationship store
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Edges matching `query`, in store order
    async fn query(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> Relationship {
        Relationship::new(RelationshipId(1), ItemId::new(1, 1), ItemId::new(2, 1), "ActiveAssembly")
            .with_property(edge_props::SORT_RANK, " 4 ")
            .with_property(edge_props::SITE_ID, "")
    }

    #[test]
    fn blank_property_is_absent() {
        let e = edge();
        assert_eq!(e.parsed_property::<i32>(edge_props::SORT_RANK), Some(4));
        assert_eq!(e.property(edge_props::SITE_ID), None);
    }

    #[test]
    fn query_matching() {
        let e = edge();
        assert!(RelationshipQuery::owned_by(ItemId::new(1, 1), "ActiveAssembly").matches(&e));
        assert!(RelationshipQuery::depending_on(ItemId::new(2, 1), "ActiveAssembly").matches(&e));
        assert!(!RelationshipQuery::owned_by(ItemId::new(1, 1), "Translation").matches(&e));
    }
}
