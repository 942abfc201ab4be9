//! Error types reported by consumed capabilities

/// Backing store failures (queries and relationship lookups)
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Query could not be executed
    #[error("query failed: {message} (query: {query})")]
    QueryFailed {
        /// Query text or lookup description
        query: String,
        /// Store-provided reason
        message: String,
    },

    /// Query text is malformed
    #[error("malformed query: {0}")]
    Malformed(String),

    /// Store cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create query failure
    #[inline]
    pub fn query_failed(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed {
            query: query.into(),
            message: message.into(),
        }
    }
}

/// Filter capability failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum FilterError {
    /// Named filter does not exist
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Filter execution failed
    #[error("filter failed: {0}")]
    Failed(String),
}

/// Assembly item cloning failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("clone failed for {item}: {message}")]
pub struct CloneError {
    /// Item being cloned
    pub item: String,
    /// Reason
    pub message: String,
}

impl CloneError {
    /// Create clone error
    #[inline]
    pub fn new(item: impl ToString, message: impl Into<String>) -> Self {
        Self {
            item: item.to_string(),
            message: message.into(),
        }
    }
}

/// Legacy resource invocation failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceError {
    /// No resource registered at path
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Resource call failed
    #[error("resource {path} failed: {message}")]
    Failed {
        /// Resource path
        path: String,
        /// Reason
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::query_failed("select 1", "timeout");
        assert_eq!(err.to_string(), "query failed: timeout (query: select 1)");
    }

    #[test]
    fn clone_error_display() {
        let err = CloneError::new("301-1", "no template");
        assert_eq!(err.to_string(), "clone failed for 301-1: no template");
    }
}
