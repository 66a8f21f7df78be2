//! Product identifier shared by cart lines and order snapshots.

use serde::{Deserialize, Serialize};

/// Product identifier.
///
/// Products are owned by the external catalog; the cart and order layers
/// only ever hold this foreign reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_string_conversion() {
        let id = ProductId::new("e43638ce-6aa0-4b85-b27f-e1d07eb678c6");
        assert_eq!(id.as_str(), "e43638ce-6aa0-4b85-b27f-e1d07eb678c6");

        let id2: ProductId = "15b6fc6f-327a-4ec4-896f-486349e85a3d".into();
        assert_eq!(id2.as_str(), "15b6fc6f-327a-4ec4-896f-486349e85a3d");
    }
}
