//! Product entity type (owner of a grade hierarchy)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A product line whose pieces are graded against one ranked hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: EntityId,

    /// Product name (e.g., "Radiata 2x4")
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the product is selectable for new inspections
    #[serde(default = "default_active")]
    pub active: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this record)
    pub author: String,
}

fn default_active() -> bool {
    true
}

impl Entity for Product {
    const PREFIX: &'static str = "PROD";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Product {
    /// Create a new product with the given name
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prod),
            name,
            description: None,
            active: true,
            created: Utc::now(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_creation() {
        let product = Product::new("Radiata 2x4".to_string(), "test".to_string());
        assert!(product.id.to_string().starts_with("PROD-"));
        assert_eq!(product.name, "Radiata 2x4");
    }

    #[test]
    fn test_product_roundtrip() {
        let product = Product::new("Moulding Blank".to_string(), "test".to_string());
        let yaml = serde_yml::to_string(&product).unwrap();
        let parsed: Product = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(product.id, parsed.id);
        assert_eq!(product.name, parsed.name);
    }
}
