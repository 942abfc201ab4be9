//! Legacy named-resource invocation

use crate::error::ResourceError;
use async_trait::async_trait;
use cre_item::Params;

/// Calls a named resource and returns its JSON document
#[async_trait]
pub trait ResourceInvoker: Send + Sync {
    /// Invoke `path` with `params`
    async fn invoke(&self, path: &str, params: &Params) -> Result<serde_json::Value, ResourceError>;
}
