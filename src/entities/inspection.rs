//! Inspection entity type (per-shift grading inspection record)
//!
//! The three inspection flavors the mill runs (finished product, in-line
//! grading, rejection typing) share every attribute, so they are one record
//! type with a `kind` tag rather than a type hierarchy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Which flavor of inspection was run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InspectionKind {
    #[default]
    FinishedProduct,
    LineGrading,
    RejectionTyping,
}

impl std::fmt::Display for InspectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionKind::FinishedProduct => write!(f, "finished_product"),
            InspectionKind::LineGrading => write!(f, "line_grading"),
            InspectionKind::RejectionTyping => write!(f, "rejection_typing"),
        }
    }
}

impl std::str::FromStr for InspectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "finished_product" | "finished" => Ok(InspectionKind::FinishedProduct),
            "line_grading" | "line" => Ok(InspectionKind::LineGrading),
            "rejection_typing" | "rejection" => Ok(InspectionKind::RejectionTyping),
            _ => Err(format!("Unknown inspection kind: {}", s)),
        }
    }
}

/// One tally line: how many pieces fell into a grade, optionally by defect.
///
/// `defect: None` means clean pieces in the base grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionResult {
    pub grade: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect: Option<EntityId>,

    pub pieces: u32,
}

/// A grading inspection record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    /// Unique identifier
    pub id: EntityId,

    /// Inspection flavor
    #[serde(default)]
    pub kind: InspectionKind,

    /// Date the inspection was performed
    pub date: NaiveDate,

    /// Date the inspected lot was produced
    pub production_date: NaiveDate,

    pub shift: String,
    pub supervisor: String,
    pub responsible: String,

    pub area: String,
    pub machine: String,
    pub origin: String,

    /// Lot number, unique across inspections
    pub lot: String,

    /// Destination market
    pub market: EntityId,

    /// Product being graded (owner of the grade hierarchy used)
    pub product: EntityId,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub termination: String,

    /// Nominal dimensions as written on the line sheet
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thickness: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub width: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub length: String,

    /// Planned number of pieces to inspect
    #[serde(default)]
    pub pieces_planned: u32,

    /// Per-grade/defect tallies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<InspectionResult>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this record)
    pub author: String,
}

impl Entity for Inspection {
    const PREFIX: &'static str = "INSP";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.lot
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Inspection {
    /// Create a new inspection for a lot
    pub fn new(
        kind: InspectionKind,
        lot: String,
        market: EntityId,
        product: EntityId,
        author: String,
    ) -> Self {
        let today = Utc::now().date_naive();
        Self {
            id: EntityId::new(EntityPrefix::Insp),
            kind,
            date: today,
            production_date: today,
            shift: String::new(),
            supervisor: String::new(),
            responsible: String::new(),
            area: String::new(),
            machine: String::new(),
            origin: String::new(),
            lot,
            market,
            product,
            state: String::new(),
            termination: String::new(),
            thickness: String::new(),
            width: String::new(),
            length: String::new(),
            pieces_planned: 0,
            results: Vec::new(),
            created: Utc::now(),
            author,
        }
    }

    /// Add pieces to the tally for a (grade, defect) pair.
    ///
    /// An existing line for the same pair is incremented; otherwise a new
    /// line is appended.
    pub fn add_result(&mut self, grade: EntityId, defect: Option<EntityId>, pieces: u32) {
        if let Some(existing) = self
            .results
            .iter_mut()
            .find(|r| r.grade == grade && r.defect == defect)
        {
            existing.pieces += pieces;
        } else {
            self.results.push(InspectionResult {
                grade,
                defect,
                pieces,
            });
        }
    }

    /// Replace the tally for a (grade, defect) pair with an absolute count
    pub fn set_result(&mut self, grade: EntityId, defect: Option<EntityId>, pieces: u32) {
        if let Some(existing) = self
            .results
            .iter_mut()
            .find(|r| r.grade == grade && r.defect == defect)
        {
            existing.pieces = pieces;
        } else {
            self.results.push(InspectionResult {
                grade,
                defect,
                pieces,
            });
        }
    }

    /// Total pieces tallied so far
    pub fn pieces_counted(&self) -> u32 {
        self.results.iter().map(|r| r.pieces).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Inspection {
        Inspection::new(
            InspectionKind::LineGrading,
            "L-2208".to_string(),
            EntityId::new(EntityPrefix::Mkt),
            EntityId::new(EntityPrefix::Prod),
            "test".to_string(),
        )
    }

    #[test]
    fn test_inspection_creation() {
        let insp = sample();
        assert!(insp.id.to_string().starts_with("INSP-"));
        assert_eq!(insp.kind, InspectionKind::LineGrading);
        assert_eq!(insp.lot, "L-2208");
        assert_eq!(insp.pieces_counted(), 0);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let insp = sample();
        let yaml = serde_yml::to_string(&insp).unwrap();
        assert!(yaml.contains("kind: line_grading"));
    }

    #[test]
    fn test_kind_parses_aliases() {
        assert_eq!(
            "finished".parse::<InspectionKind>().unwrap(),
            InspectionKind::FinishedProduct
        );
        assert_eq!(
            "rejection_typing".parse::<InspectionKind>().unwrap(),
            InspectionKind::RejectionTyping
        );
        assert!("junk".parse::<InspectionKind>().is_err());
    }

    #[test]
    fn test_add_result_merges_same_pair() {
        let mut insp = sample();
        let grade = EntityId::new(EntityPrefix::Grd);
        let defect = EntityId::new(EntityPrefix::Dfct);

        insp.add_result(grade.clone(), Some(defect.clone()), 3);
        insp.add_result(grade.clone(), Some(defect.clone()), 2);
        insp.add_result(grade.clone(), None, 4);

        assert_eq!(insp.results.len(), 2);
        assert_eq!(insp.pieces_counted(), 9);
        assert_eq!(insp.results[0].pieces, 5);
    }

    #[test]
    fn test_set_result_replaces_count() {
        let mut insp = sample();
        let grade = EntityId::new(EntityPrefix::Grd);

        insp.add_result(grade.clone(), None, 3);
        insp.set_result(grade.clone(), None, 10);

        assert_eq!(insp.results.len(), 1);
        assert_eq!(insp.pieces_counted(), 10);
    }

    #[test]
    fn test_inspection_roundtrip() {
        let mut insp = sample();
        insp.shift = "A".to_string();
        insp.add_result(EntityId::new(EntityPrefix::Grd), None, 7);

        let yaml = serde_yml::to_string(&insp).unwrap();
        let parsed: Inspection = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(insp.id, parsed.id);
        assert_eq!(parsed.shift, "A");
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].pieces, 7);
    }
}
