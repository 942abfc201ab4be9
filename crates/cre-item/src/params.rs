//! Multi-valued request parameters
//!
//! Callers pass parameters as `name -> [values]`. Most consumers only look at
//! the first value; [`Params::flatten`] produces that view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known parameter names
pub mod keys {
    /// Maximum number of resolved items (0 or negative = unlimited)
    pub const MAX_RESULTS: &str = "max_results";
    /// Explicit template name, overrides per-item templates
    pub const TEMPLATE: &str = "template";
    /// Reorder clause for reorder-by-query
    pub const ORDER_BY: &str = "order_by";
    /// Collation locale for reorder-by-query
    pub const LOCALE: &str = "locale";
    /// Query text for query-based resolution
    pub const QUERY: &str = "query";
    /// Query language
    pub const QUERY_TYPE: &str = "type";
    /// Stamp sites on query results
    pub const MAY_HAVE_CROSS_SITE_LINKS: &str = "mayHaveCrossSiteLinks";
    /// Resource path for legacy resource resolution
    pub const RESOURCE: &str = "resource";
    /// Relationship id carried on an assembly item
    pub const RELATIONSHIP_ID: &str = "sys_relationshipid";
    /// Content id of the source item
    pub const CONTENT_ID: &str = "sys_contentid";
    /// Revision of the source item
    pub const REVISION: &str = "sys_revision";
    /// Site of the source item
    pub const SITE_ID: &str = "sys_siteid";
    /// Folder of the source item
    pub const FOLDER_ID: &str = "sys_folderid";
}

/// Ordered multi-valued parameter map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Vec<String>>);

impl Params {
    /// Create empty parameters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style single value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Replace all values of `key` with one value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Append a value to `key`
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Remove `key`, returning its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    /// First value of `key`
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// First value of `key`, ignoring blank values
    #[must_use]
    pub fn first_non_blank(&self, key: &str) -> Option<&str> {
        self.first(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// All values of `key`
    #[must_use]
    pub fn all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check presence of `key`
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Boolean flag: `true`, `yes` or `1` (case-insensitive)
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.first(key).is_some_and(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v == "1"
        })
    }

    /// First-value view
    #[must_use]
    pub fn flatten(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.first().map(|first| (k.clone(), first.clone())))
            .collect()
    }

    /// Copy without the given keys
    #[must_use]
    pub fn without(&self, excluded: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| !excluded.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Overlay these params on `defaults`; keys present here win
    #[must_use]
    pub fn merged_over(&self, defaults: &Params) -> Self {
        let mut merged = defaults.clone();
        for (k, v) in &self.0 {
            merged.0.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate keys and values
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.push(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_takes_first_value() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("a", "2");
        params.insert("b", "x");

        let flat = params.flatten();
        assert_eq!(flat.get("a").map(String::as_str), Some("1"));
        assert_eq!(flat.get("b").map(String::as_str), Some("x"));
        assert_eq!(params.all("a").len(), 2);
    }

    #[test]
    fn flag_parsing() {
        let params = Params::new()
            .with("t", "TRUE")
            .with("y", "yes")
            .with("one", "1")
            .with("f", "no");
        assert!(params.flag("t"));
        assert!(params.flag("y"));
        assert!(params.flag("one"));
        assert!(!params.flag("f"));
        assert!(!params.flag("missing"));
    }

    #[test]
    fn without_and_merge() {
        let caller = Params::new().with("query", "q").with("x", "caller");
        let defaults = Params::new().with("x", "default").with("y", "kept");

        let merged = caller.merged_over(&defaults);
        assert_eq!(merged.first("x"), Some("caller"));
        assert_eq!(merged.first("y"), Some("kept"));

        let stripped = merged.without(&[keys::QUERY]);
        assert!(!stripped.contains("query"));
        assert_eq!(stripped.len(), 2);
    }

    #[test]
    fn blank_values_are_ignored() {
        let params = Params::new().with("query", "   ");
        assert_eq!(params.first("query"), Some("   "));
        assert_eq!(params.first_non_blank("query"), None);
    }
}
