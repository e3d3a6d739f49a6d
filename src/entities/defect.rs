//! Defect entity type (defect catalog for rejection typing)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A defect type that can downgrade a piece
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defect {
    /// Unique identifier
    pub id: EntityId,

    /// Defect name (e.g., "Knot", "Wane", "Blue Stain")
    pub name: String,

    /// What the defect looks like and how to call it
    #[serde(default)]
    pub description: String,

    /// Whether the defect is selectable on new results
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

impl Entity for Defect {
    const PREFIX: &'static str = "DFCT";

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

impl Defect {
    /// Create a new defect with the given name and description
    pub fn new(name: String, description: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Dfct),
            name,
            description,
            active: true,
            created: Utc::now(),
            author,
        }
    }
}
