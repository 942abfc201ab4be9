//! Work-order cloning and template lookup

use crate::error::{CloneError, StoreError};
use async_trait::async_trait;
use cre_item::{AssemblyItem, TemplateId};

/// Clones the item being rendered into a per-candidate work-order
pub trait AssemblyCloner: Send + Sync {
    /// Produce an independent copy of `source`
    fn clone_item(&self, source: &AssemblyItem) -> Result<AssemblyItem, CloneError>;
}

/// Cloner using [`AssemblyItem::deep_clone`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCloner;

impl AssemblyCloner for DeepCloner {
    fn clone_item(&self, source: &AssemblyItem) -> Result<AssemblyItem, CloneError> {
        Ok(source.deep_clone())
    }
}

/// Template lookup by name
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Template id for `name`, if one exists
    async fn find_by_name(&self, name: &str) -> Result<Option<TemplateId>, StoreError>;
}
