//! Error types for content resolution
//!
//! Every variant except [`ResolveError::Cancelled`] is a failure of the
//! current `resolve` call. Nothing here is retried internally.

use cre_store::{CloneError, FilterError, ResourceError, StoreError};

/// Resolution error
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Missing or malformed parameter or configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller passed an unusable argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Named template, finder or container does not exist
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up
        kind: &'static str,
        /// Name that failed to resolve
        name: String,
    },

    /// Store query or relationship lookup failed
    #[error("store failure while {context}: {source}")]
    Store {
        /// What the resolver was doing
        context: String,
        /// Store error
        #[source]
        source: StoreError,
    },

    /// Filter capability failed
    #[error("filter failed: {0}")]
    Filter(#[from] FilterError),

    /// Work-order cloning failed
    #[error("materialization failed: {0}")]
    Clone(#[from] CloneError),

    /// Legacy resource failed or returned an unexpected shape
    #[error("resource {path} failed: {message}")]
    Resource {
        /// Resource path
        path: String,
        /// Reason
        message: String,
    },

    /// Caller cancelled the resolution
    #[error("resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    /// Create configuration error
    #[inline]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create not-found error
    #[inline]
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create store error with context
    #[inline]
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Create resource error
    #[inline]
    pub fn resource(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if the call was cancelled rather than failed
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the error stems from caller configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidArgument(_))
    }
}

impl From<ResourceError> for ResolveError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(path) => Self::not_found("resource", path),
            ResourceError::Failed { path, message } => Self::Resource { path, message },
        }
    }
}

/// Result type alias for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = ResolveError::not_found("template", "snippet");
        assert_eq!(err.to_string(), "template not found: snippet");
    }

    #[test]
    fn cancellation_is_distinguishable() {
        assert!(ResolveError::Cancelled.is_cancelled());
        assert!(!ResolveError::configuration("x").is_cancelled());
        assert!(ResolveError::configuration("x").is_configuration());
    }

    #[test]
    fn resource_errors_convert() {
        let err: ResolveError = ResourceError::NotFound("/nav".to_string()).into();
        assert!(matches!(err, ResolveError::NotFound { kind: "resource", .. }));
    }

    #[test]
    fn store_error_keeps_source() {
        let err = ResolveError::store(
            "running slot query",
            StoreError::Unavailable("down".to_string()),
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
