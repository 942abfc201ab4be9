//! Content item: the unit flowing through the resolution pipeline

use crate::id::{FolderId, ItemId, RelationshipId, SiteId, TemplateId};
use serde::{Deserialize, Serialize};

/// Identity of a content item inside one resolution
///
/// Two items with the same content revision reached through different
/// relationship edges are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    /// Item identifier
    pub item_id: ItemId,
    /// Originating relationship, if any
    pub relationship_id: Option<RelationshipId>,
}

/// A candidate piece of content to render into a container
///
/// `item_id` is fixed at construction. Rank and relationship are set by the
/// producing strategy; the site may be stamped later when the producer left
/// it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    item_id: ItemId,
    template_id: Option<TemplateId>,
    sort_rank: i32,
    relationship_id: Option<RelationshipId>,
    owner_id: Option<ItemId>,
    site_id: Option<SiteId>,
    folder_id: Option<FolderId>,
    widget_name: Option<String>,
}

impl ContentItem {
    /// Create item with rank 0 and no context
    #[inline]
    #[must_use]
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            template_id: None,
            sort_rank: 0,
            relationship_id: None,
            owner_id: None,
            site_id: None,
            folder_id: None,
            widget_name: None,
        }
    }

    /// With template
    #[inline]
    #[must_use]
    pub fn with_template_id(mut self, template_id: TemplateId) -> Self {
        self.template_id = Some(template_id);
        self
    }

    /// With sort rank
    #[inline]
    #[must_use]
    pub fn with_sort_rank(mut self, sort_rank: i32) -> Self {
        self.sort_rank = sort_rank;
        self
    }

    /// With originating relationship
    #[inline]
    #[must_use]
    pub fn with_relationship_id(mut self, relationship_id: RelationshipId) -> Self {
        self.relationship_id = Some(relationship_id);
        self
    }

    /// With relationship owner
    #[inline]
    #[must_use]
    pub fn with_owner_id(mut self, owner_id: ItemId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// With site
    #[inline]
    #[must_use]
    pub fn with_site_id(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }

    /// With folder
    #[inline]
    #[must_use]
    pub fn with_folder_id(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// With widget name
    #[inline]
    #[must_use]
    pub fn with_widget_name(mut self, widget_name: impl Into<String>) -> Self {
        self.widget_name = Some(widget_name.into());
        self
    }

    /// Item identifier
    #[inline]
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Template to render with
    #[inline]
    #[must_use]
    pub fn template_id(&self) -> Option<TemplateId> {
        self.template_id
    }

    /// Primary ordering key
    #[inline]
    #[must_use]
    pub fn sort_rank(&self) -> i32 {
        self.sort_rank
    }

    /// Originating relationship
    #[inline]
    #[must_use]
    pub fn relationship_id(&self) -> Option<RelationshipId> {
        self.relationship_id
    }

    /// Relationship owner
    #[inline]
    #[must_use]
    pub fn owner_id(&self) -> Option<ItemId> {
        self.owner_id
    }

    /// Site context
    #[inline]
    #[must_use]
    pub fn site_id(&self) -> Option<SiteId> {
        self.site_id
    }

    /// Folder context
    #[inline]
    #[must_use]
    pub fn folder_id(&self) -> Option<FolderId> {
        self.folder_id
    }

    /// Originating widget
    #[inline]
    #[must_use]
    pub fn widget_name(&self) -> Option<&str> {
        self.widget_name.as_deref()
    }

    /// Set site only when none was recorded by the producer
    ///
    /// Returns `true` if the site was stamped.
    #[inline]
    pub fn stamp_site_if_absent(&mut self, site_id: Option<SiteId>) -> bool {
        if self.site_id.is_none() && site_id.is_some() {
            self.site_id = site_id;
            return true;
        }
        false
    }

    /// Set-membership key
    #[inline]
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey {
            item_id: self.item_id,
            relationship_id: self.relationship_id,
        }
    }
}
