//! Scanner session entity type (one scanner agreement study)
//!
//! A session is a batch of pieces graded twice, once by the inspector and
//! once by the scanner. Items are appended over the session's life and
//! carry their classification from the moment they are recorded; an item is
//! never edited afterwards - a corrected piece is recorded as a new item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::grading::{Classification, SessionStats};

/// One graded piece within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionItem {
    /// Sequential position within the session, starting at 1
    pub item_number: u32,

    /// Grade the human inspector assigned
    pub inspector_grade: EntityId,

    /// Grade the scanner assigned
    pub scanner_grade: EntityId,

    /// Measured dimensions of the piece, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Computed at append time, immutable thereafter
    pub classification: Classification,
}

/// A scanner agreement session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerSession {
    /// Unique identifier
    pub id: EntityId,

    /// When the study was run
    pub date: DateTime<Utc>,

    pub supervisor: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub responsible: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shift: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub area: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub machine: String,

    /// Destination market context
    pub market: EntityId,

    /// Product whose grade hierarchy both gradings use
    pub product: EntityId,

    /// Default piece dimensions, pre-filled onto new items for fluid entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_length: Option<f64>,

    /// Graded pieces, in recording order; owned exclusively by the session
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SessionItem>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this record)
    pub author: String,
}

impl Entity for ScannerSession {
    const PREFIX: &'static str = "SCAN";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.supervisor
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl ScannerSession {
    /// Create a new session for a market/product pairing
    pub fn new(
        supervisor: String,
        market: EntityId,
        product: EntityId,
        author: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Scan),
            date: now,
            supervisor,
            responsible: String::new(),
            shift: String::new(),
            area: String::new(),
            machine: String::new(),
            market,
            product,
            default_thickness: None,
            default_width: None,
            default_length: None,
            items: Vec::new(),
            created: now,
            author,
        }
    }

    /// Item number the next appended piece will receive
    pub fn next_item_number(&self) -> u32 {
        self.items.last().map_or(1, |i| i.item_number + 1)
    }

    /// Append a classified piece, assigning its item number.
    ///
    /// Dimensions fall back to the session defaults when not given.
    pub fn append_item(
        &mut self,
        inspector_grade: EntityId,
        scanner_grade: EntityId,
        classification: Classification,
        thickness: Option<f64>,
        width: Option<f64>,
        length: Option<f64>,
    ) -> &SessionItem {
        let item = SessionItem {
            item_number: self.next_item_number(),
            inspector_grade,
            scanner_grade,
            thickness: thickness.or(self.default_thickness),
            width: width.or(self.default_width),
            length: length.or(self.default_length),
            classification,
        };
        let idx = self.items.len();
        self.items.push(item);
        &self.items[idx]
    }

    /// Summary statistics over the session's classified items
    pub fn stats(&self) -> SessionStats {
        self.items.iter().map(|i| i.classification).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Classification::{Match, Overgrade, Undergrade};

    fn sample() -> ScannerSession {
        ScannerSession::new(
            "R. Soto".to_string(),
            EntityId::new(EntityPrefix::Mkt),
            EntityId::new(EntityPrefix::Prod),
            "test".to_string(),
        )
    }

    #[test]
    fn test_session_creation() {
        let session = sample();
        assert!(session.id.to_string().starts_with("SCAN-"));
        assert!(session.items.is_empty());
        assert_eq!(session.next_item_number(), 1);
    }

    #[test]
    fn test_append_assigns_sequential_numbers() {
        let mut session = sample();
        let g = EntityId::new(EntityPrefix::Grd);

        session.append_item(g.clone(), g.clone(), Match, None, None, None);
        session.append_item(g.clone(), g.clone(), Undergrade, None, None, None);
        let third = session.append_item(g.clone(), g.clone(), Overgrade, None, None, None);

        assert_eq!(third.item_number, 3);
        assert_eq!(session.next_item_number(), 4);
    }

    #[test]
    fn test_append_uses_session_default_dimensions() {
        let mut session = sample();
        session.default_thickness = Some(25.0);
        session.default_length = Some(3200.0);
        let g = EntityId::new(EntityPrefix::Grd);

        let item = session.append_item(g.clone(), g.clone(), Match, None, Some(120.0), None);

        assert_eq!(item.thickness, Some(25.0));
        assert_eq!(item.width, Some(120.0));
        assert_eq!(item.length, Some(3200.0));
    }

    #[test]
    fn test_explicit_dimensions_beat_defaults() {
        let mut session = sample();
        session.default_thickness = Some(25.0);
        let g = EntityId::new(EntityPrefix::Grd);

        let item = session.append_item(g.clone(), g.clone(), Match, Some(19.0), None, None);
        assert_eq!(item.thickness, Some(19.0));
    }

    #[test]
    fn test_session_stats() {
        let mut session = sample();
        let g = EntityId::new(EntityPrefix::Grd);
        for c in [Match, Match, Overgrade, Undergrade, Match] {
            session.append_item(g.clone(), g.clone(), c, None, None, None);
        }

        let stats = session.stats();
        assert_eq!(stats.pieces_evaluated, 5);
        assert_eq!(stats.pieces_in_grade, 3);
        assert_eq!(stats.assertiveness, 0.6);
        assert_eq!(stats.error, 0.4);
    }

    #[test]
    fn test_session_roundtrip() {
        let mut session = sample();
        let g = EntityId::new(EntityPrefix::Grd);
        session.append_item(g.clone(), g.clone(), Match, Some(25.0), None, None);

        let yaml = serde_yml::to_string(&session).unwrap();
        let parsed: ScannerSession = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(session.id, parsed.id);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].classification, Match);
        assert_eq!(parsed.items[0].thickness, Some(25.0));
    }
}
