//! Identifier newtypes
//!
//! Numeric identifiers for content, templates, sites, folders, relationships
//! and containers. Ordering on every id is its numeric value.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Error parsing an identifier from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// Input was empty
    #[error("empty identifier")]
    Empty,

    /// Input was not a valid number
    #[error("invalid identifier: '{0}'")]
    Invalid(String),
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Numeric value
            #[inline]
            #[must_use]
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(IdError::Empty);
                }
                s.parse::<u64>()
                    .map(Self)
                    .map_err(|_| IdError::Invalid(s.to_string()))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Content identifier (revision-independent)
    ContentId
);
numeric_id!(
    /// Template identifier
    TemplateId
);
numeric_id!(
    /// Site identifier
    SiteId
);
numeric_id!(
    /// Folder identifier
    FolderId
);
numeric_id!(
    /// Relationship edge identifier
    RelationshipId
);
numeric_id!(
    /// Container (slot) identifier
    ContainerId
);

/// Identifier of a specific revision of a piece of content
///
/// Displayed as `content-revision`, e.g. `301-2`. Orders by content id,
/// then revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId {
    content_id: ContentId,
    revision: u32,
}

impl ItemId {
    /// Create item id from raw content id and revision
    #[inline]
    #[must_use]
    pub fn new(content_id: u64, revision: u32) -> Self {
        Self {
            content_id: ContentId(content_id),
            revision,
        }
    }

    /// Content id part
    #[inline]
    #[must_use]
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// Revision part
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.content_id, self.revision)
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    /// Parses `content-revision`, or a bare content id (revision 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            Some((content, revision)) => {
                let content_id = content.parse::<ContentId>()?;
                let revision = revision
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| IdError::Invalid(s.to_string()))?;
                Ok(Self {
                    content_id,
                    revision,
                })
            }
            None => Ok(Self {
                content_id: s.parse()?,
                revision: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_display_and_parse() {
        let id = ItemId::new(301, 2);
        assert_eq!(id.to_string(), "301-2");
        assert_eq!("301-2".parse::<ItemId>().unwrap(), id);
        assert_eq!("301".parse::<ItemId>().unwrap(), ItemId::new(301, 0));
    }

    #[test]
    fn item_id_orders_numerically() {
        assert!(ItemId::new(9, 5) < ItemId::new(10, 1));
        assert!(ItemId::new(10, 1) < ItemId::new(10, 2));
    }

    #[test]
    fn numeric_id_rejects_garbage() {
        assert_eq!("".parse::<SiteId>(), Err(IdError::Empty));
        assert!(matches!("abc".parse::<SiteId>(), Err(IdError::Invalid(_))));
        assert_eq!(" 42 ".parse::<SiteId>(), Ok(SiteId(42)));
    }
}
