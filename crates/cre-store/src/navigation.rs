//! Navigation tree lookup

use crate::error::StoreError;
use async_trait::async_trait;
use cre_item::{FolderId, ItemId, TemplateId};

/// Navigation node found beside an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationNode {
    /// Node content
    pub item: ItemId,
    /// Parent folder
    pub folder: Option<FolderId>,
    /// Template registered for the node
    pub template: Option<TemplateId>,
}

/// Navigation tree index
#[async_trait]
pub trait NavigationIndex: Send + Sync {
    /// The navigation node under the same parent as `item`
    ///
    /// `folder` is the caller's folder context for `item`, if known.
    async fn sibling_node(
        &self,
        item: ItemId,
        folder: Option<FolderId>,
    ) -> Result<Option<NavigationNode>, StoreError>;
}
