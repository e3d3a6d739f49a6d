//! Grade entity type (one rung of a product's quality hierarchy)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::grading::Rank;

/// A grade within one product's ranked hierarchy.
///
/// Rank 1 is the best grade; higher ranks are worse. Two grades of the same
/// product may share a rank, in which case they count as equal quality for
/// scanner comparison. Ranks are only meaningful within one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    /// Unique identifier
    pub id: EntityId,

    /// The product whose hierarchy this grade belongs to
    pub product: EntityId,

    /// Grade name (e.g., "Clear", "Standard & Better")
    pub name: String,

    /// Position in the hierarchy, 1 = best
    pub rank: Rank,

    /// Defect types admissible within this grade
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defects: Vec<EntityId>,

    /// Whether the grade is selectable on new records
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

impl Entity for Grade {
    const PREFIX: &'static str = "GRD";

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

impl Grade {
    /// Create a new grade in a product's hierarchy
    pub fn new(name: String, product: EntityId, rank: Rank, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Grd),
            product,
            name,
            rank,
            defects: Vec::new(),
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
    fn test_grade_creation() {
        let product = EntityId::new(EntityPrefix::Prod);
        let grade = Grade::new("Clear".to_string(), product.clone(), 1, "test".to_string());

        assert!(grade.id.to_string().starts_with("GRD-"));
        assert_eq!(grade.product, product);
        assert_eq!(grade.rank, 1);
        assert!(grade.defects.is_empty());
    }

    #[test]
    fn test_grade_roundtrip() {
        let product = EntityId::new(EntityPrefix::Prod);
        let mut grade = Grade::new("Economy".to_string(), product, 4, "test".to_string());
        grade.defects.push(EntityId::new(EntityPrefix::Dfct));

        let yaml = serde_yml::to_string(&grade).unwrap();
        let parsed: Grade = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(grade.id, parsed.id);
        assert_eq!(parsed.rank, 4);
        assert_eq!(parsed.defects.len(), 1);
    }

    #[test]
    fn test_empty_defects_not_serialized() {
        let product = EntityId::new(EntityPrefix::Prod);
        let grade = Grade::new("Clear".to_string(), product, 1, "test".to_string());

        let yaml = serde_yml::to_string(&grade).unwrap();
        assert!(!yaml.contains("defects"));
    }
}
