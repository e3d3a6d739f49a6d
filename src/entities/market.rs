//! Market entity type (destination market for graded lumber)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A destination market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Unique identifier
    pub id: EntityId,

    /// Market name (e.g., "Domestic", "Japan")
    pub name: String,

    /// Optional notes about the market
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the market is selectable for new inspections
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

impl Entity for Market {
    const PREFIX: &'static str = "MKT";

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

impl Market {
    /// Create a new market with the given name
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Mkt),
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
    fn test_market_creation() {
        let market = Market::new("Japan".to_string(), "test".to_string());

        assert!(market.id.to_string().starts_with("MKT-"));
        assert_eq!(market.name, "Japan");
        assert!(market.active);
    }

    #[test]
    fn test_market_roundtrip() {
        let market = Market::new("Domestic".to_string(), "test".to_string());

        let yaml = serde_yml::to_string(&market).unwrap();
        let parsed: Market = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(market.id, parsed.id);
        assert_eq!(market.name, parsed.name);
        assert_eq!(parsed.active, true);
    }

    #[test]
    fn test_missing_active_defaults_true() {
        let market = Market::new("EU".to_string(), "test".to_string());
        let yaml = serde_yml::to_string(&market).unwrap();
        let stripped: String = yaml
            .lines()
            .filter(|l| !l.starts_with("active"))
            .collect::<Vec<_>>()
            .join("\n");

        let parsed: Market = serde_yml::from_str(&stripped).unwrap();
        assert!(parsed.active);
    }
}
