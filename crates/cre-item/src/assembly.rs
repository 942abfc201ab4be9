//! Assembly items: per-item render work-orders
//!
//! An [`AssemblyItem`] is cloned from the item being rendered once per
//! resolved content item, with content/template/site/folder overrides.
//! [`Bindings`] are shared by reference between an item and its shallow
//! clones so that resolution can report back to template logic.

use crate::id::{FolderId, ItemId, SiteId, TemplateId};
use crate::params::Params;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Binding set when resolution truncated the result list
pub const HAD_MORE_BINDING: &str = "$sys.hadMore";

/// Shared, mutable result bindings
#[derive(Debug, Clone, Default)]
pub struct Bindings(Arc<RwLock<BTreeMap<String, Value>>>);

impl Bindings {
    /// Create empty bindings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a binding
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.read().get(name).cloned()
    }

    /// Write a binding
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.write().insert(name.into(), value);
    }

    /// Remove a binding
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.write().remove(name)
    }

    /// Independent copy of the current values
    #[must_use]
    pub fn detached(&self) -> Self {
        Self(Arc::new(RwLock::new(self.0.read().clone())))
    }

    /// Check whether two handles share storage
    #[inline]
    #[must_use]
    pub fn shares_with(&self, other: &Bindings) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Render work-order for one piece of content
///
/// `Clone` is shallow with respect to [`Bindings`]; use
/// [`AssemblyItem::deep_clone`] for an independent copy.
#[derive(Debug, Clone)]
pub struct AssemblyItem {
    id: ItemId,
    template_id: Option<TemplateId>,
    site_id: Option<SiteId>,
    folder_id: Option<FolderId>,
    params: Params,
    bindings: Bindings,
}

impl AssemblyItem {
    /// Create work-order for `id` with no template or context
    #[must_use]
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            template_id: None,
            site_id: None,
            folder_id: None,
            params: Params::new(),
            bindings: Bindings::new(),
        }
    }

    /// With template
    #[inline]
    #[must_use]
    pub fn with_template_id(mut self, template_id: TemplateId) -> Self {
        self.template_id = Some(template_id);
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

    /// With params
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Content being rendered
    #[inline]
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Template in use
    #[inline]
    #[must_use]
    pub fn template_id(&self) -> Option<TemplateId> {
        self.template_id
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

    /// Request parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Mutable request parameters
    #[inline]
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Result bindings
    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Override content
    #[inline]
    pub fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    /// Override template
    #[inline]
    pub fn set_template_id(&mut self, template_id: Option<TemplateId>) {
        self.template_id = template_id;
    }

    /// Override site
    #[inline]
    pub fn set_site_id(&mut self, site_id: Option<SiteId>) {
        self.site_id = site_id;
    }

    /// Override folder
    #[inline]
    pub fn set_folder_id(&mut self, folder_id: Option<FolderId>) {
        self.folder_id = folder_id;
    }

    /// Whether the last resolution on this item truncated its results
    #[must_use]
    pub fn had_more(&self) -> bool {
        self.bindings
            .get(HAD_MORE_BINDING)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Record truncation state
    pub fn set_had_more(&self, had_more: bool) {
        self.bindings.set(HAD_MORE_BINDING, Value::Bool(had_more));
    }

    /// Copy with independent params and bindings
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            id: self.id,
            template_id: self.template_id,
            site_id: self.site_id,
            folder_id: self.folder_id,
            params: self.params.clone(),
            bindings: self.bindings.detached(),
        }
    }
}
