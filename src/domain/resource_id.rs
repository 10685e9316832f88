//! Opaque record identifier shared by every resource collection.
//!
//! [`ResourceId`] is a string newtype. The server mints UUID v4 strings;
//! the client-side fallback cache mints decimal millisecond timestamps so
//! that records created offline carry a positive integer id.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier of a record within its collection.
///
/// Ids are compared as plain strings. Uniqueness is only guaranteed
/// within a single collection (a blog post and a gallery image may share
/// the id `"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a new random id (UUID v4, hyphenated).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Creates an id from a millisecond timestamp, as minted by the
    /// client-side fallback cache.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    /// Returns the numeric value of the id if it is a positive decimal
    /// integer, `None` otherwise.
    #[must_use]
    pub fn as_millis(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse::<u64>().ok().filter(|n| *n > 0)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = ResourceId::new();
        let b = ResourceId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn millis_ids_are_numeric() {
        let id = ResourceId::from_millis(1_705_312_200_000);
        assert_eq!(id.as_str(), "1705312200000");
        assert_eq!(id.as_millis(), Some(1_705_312_200_000));
    }

    #[test]
    fn uuid_ids_are_not_numeric() {
        assert_eq!(ResourceId::new().as_millis(), None);
        assert_eq!(ResourceId::from("0").as_millis(), None);
        assert_eq!(ResourceId::from("-5").as_millis(), None);
        assert_eq!(ResourceId::from("").as_millis(), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ResourceId::from("42");
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"42\"");

        let Ok(back) = serde_json::from_str::<ResourceId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, id);
    }
}
