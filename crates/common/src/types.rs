use serde::{Deserialize, Serialize};

/// Identifier of the entity an event stream belongs to.
///
/// Stream keys are plain strings such as `"cart-7"` or `"product-SKU-001"`,
/// so callers can derive them from domain identifiers without a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Creates an aggregate ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AggregateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AggregateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AggregateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_preserves_value() {
        let id = AggregateId::new("cart-1");
        assert_eq!(id.as_str(), "cart-1");
        assert_eq!(id.to_string(), "cart-1");
    }

    #[test]
    fn aggregate_id_equality() {
        assert_eq!(AggregateId::from("cart-1"), AggregateId::new("cart-1"));
        assert_ne!(AggregateId::from("cart-1"), AggregateId::from("cart-2"));
    }

    #[test]
    fn aggregate_id_serialization_roundtrip() {
        let id = AggregateId::new("product-SKU-001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"product-SKU-001\"");
        let deserialized: AggregateId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
