//! Content store query capability

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query language used when the caller does not name one
pub const DEFAULT_QUERY_TYPE: &str = "sql";

/// Well-known row property names
pub mod props {
    /// Content id column
    pub const CONTENT_ID: &str = "sys_contentid";
    /// Revision column
    pub const REVISION: &str = "sys_revision";
    /// Folder id column
    pub const FOLDER_ID: &str = "sys_folderid";
    /// Site id column
    pub const SITE_ID: &str = "sys_siteid";
}

/// Typed property value in a result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Integer value
    Int(i64),
    /// Text value
    Text(String),
    /// Missing / SQL null
    Null,
}

impl PropertyValue {
    /// Interpret as unsigned integer; numeric text is accepted
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(v) => u64::try_from(*v).ok(),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Interpret as text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One result row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    values: BTreeMap<String, PropertyValue>,
}

impl Row {
    /// Create empty row
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Raw property
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Property as unsigned integer
    #[inline]
    #[must_use]
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(PropertyValue::as_u64)
    }

    /// Whether the projection included `name`
    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Query result rows in store order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSet {
    /// Rows
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Wrap rows
    #[inline]
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

/// Query submitted to the backing store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Query text
    pub text: String,
    /// Query language (e.g. `sql`)
    pub query_type: String,
    /// Bind parameters
    pub params: BTreeMap<String, String>,
    /// Collation locale
    pub locale: Option<String>,
}

impl QueryRequest {
    /// Create request in the default language with no parameters
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            query_type: DEFAULT_QUERY_TYPE.to_string(),
            params: BTreeMap::new(),
            locale: None,
        }
    }

    /// With query language
    #[inline]
    #[must_use]
    pub fn with_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = query_type.into();
        self
    }

    /// With bind parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// With collation locale
    #[inline]
    #[must_use]
    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }
}

/// Backing content repository query facility
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Execute a query and return its rows in store order
    async fn query(&self, request: QueryRequest) -> Result<RowSet, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_value_numeric_text() {
        assert_eq!(PropertyValue::from("17").as_u64(), Some(17));
        assert_eq!(PropertyValue::Int(-1).as_u64(), None);
        assert_eq!(PropertyValue::Null.as_u64(), None);
    }

    #[test]
    fn row_projection() {
        let row = Row::new().with(props::CONTENT_ID, 301).with(props::REVISION, 2);
        assert_eq!(row.get_u64(props::CONTENT_ID), Some(301));
        assert!(!row.has(props::FOLDER_ID));
    }

    #[test]
    fn request_defaults_to_sql() {
        let req = QueryRequest::new("select 1");
        assert_eq!(req.query_type, DEFAULT_QUERY_TYPE);
        assert!(req.locale.is_none());
    }
}
