//! Generated slide identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable identifier minted for each successful generation.
///
/// The id is a UUID v4 string so it can be handed to the persistence
/// layer without coordination between concurrent generations.
#[derive(Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    /// Mint a fresh unique id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap a raw string (for deserialization/testing)
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SlideId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlideId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = SlideId::new();
        let b = SlideId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_raw_roundtrip() {
        let id = SlideId::from_raw("slide-123");
        assert_eq!(id.as_str(), "slide-123");
        assert_eq!(id.to_string(), "slide-123");
    }
}
