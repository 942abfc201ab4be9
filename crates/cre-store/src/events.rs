//! Change notifications

use crate::relationship::Relationship;
use async_trait::async_trait;
use cre_item::{ItemId, RelationshipId};
use std::sync::Arc;

/// Event categories published on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Relationship edges were added, modified or removed
    RelationshipChanged,
}

/// Edge named by a change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedEdge {
    /// Edge id, when known
    pub id: Option<RelationshipId>,
    /// Owner, when known
    pub owner: Option<ItemId>,
}

/// Published change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Category
    pub kind: EventKind,
    /// Affected edges
    pub edges: Vec<ChangedEdge>,
}

impl ChangeEvent {
    /// Relationship change naming the given edges
    #[must_use]
    pub fn relationships_changed(edges: Vec<ChangedEdge>) -> Self {
        Self {
            kind: EventKind::RelationshipChanged,
            edges,
        }
    }

    /// Relationship change built from full edges
    #[must_use]
    pub fn from_relationships(relationships: &[Relationship]) -> Self {
        Self::relationships_changed(
            relationships
                .iter()
                .map(|r| ChangedEdge {
                    id: Some(r.id),
                    owner: Some(r.owner),
                })
                .collect(),
        )
    }

    /// Owners of all changed edges
    ///
    /// `None` when the event is empty or any edge lacks its owner.
    #[must_use]
    pub fn owners(&self) -> Option<Vec<ItemId>> {
        if self.edges.is_empty() {
            return None;
        }
        self.edges.iter().map(|e| e.owner).collect()
    }
}

/// Receives events from a [`NotificationBus`]
#[async_trait]
pub trait ChangeHandler: Send + Sync {
    /// Handle one event
    async fn handle(&self, event: &ChangeEvent);
}

/// Publish/subscribe bus for change events
pub trait NotificationBus: Send + Sync {
    /// Register `handler` for events of `kind`
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn ChangeHandler>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_requires_complete_information() {
        let full = ChangeEvent::relationships_changed(vec![ChangedEdge {
            id: None,
            owner: Some(ItemId::new(1, 1)),
        }]);
        assert_eq!(full.owners(), Some(vec![ItemId::new(1, 1)]));

        let partial = ChangeEvent::relationships_changed(vec![
            ChangedEdge {
                id: None,
                owner: Some(ItemId::new(1, 1)),
            },
            ChangedEdge {
                id: Some(RelationshipId(3)),
                owner: None,
            },
        ]);
        assert_eq!(partial.owners(), None);

        assert_eq!(ChangeEvent::relationships_changed(vec![]).owners(), None);
    }
}
