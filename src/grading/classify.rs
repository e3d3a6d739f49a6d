//! Scanner-vs-inspector classification
//!
//! A grade's rank orders quality within one product hierarchy: 1 is the best
//! grade, higher ranks are worse. Each graded piece carries the grade the
//! human inspector assigned and the grade the scanner assigned; comparing
//! their ranks classifies the scanner's call for that piece.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Position of a grade within its product hierarchy (1 = best)
pub type Rank = u32;

/// Outcome of comparing the scanner's grade against the inspector's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Scanner and inspector assigned equally ranked grades
    Match,
    /// Scanner assigned a better (lower-rank) grade than the inspector
    Overgrade,
    /// Scanner assigned a worse (higher-rank) grade than the inspector
    Undergrade,
}

impl Classification {
    /// Classify one piece from the two resolved ranks.
    ///
    /// Pure and total: every pair of ranks maps to exactly one outcome.
    /// Ties in rank count as a match even across distinct grades.
    pub fn classify(inspector_rank: Rank, scanner_rank: Rank) -> Self {
        match scanner_rank.cmp(&inspector_rank) {
            Ordering::Less => Classification::Overgrade,
            Ordering::Greater => Classification::Undergrade,
            Ordering::Equal => Classification::Match,
        }
    }

    /// True when scanner and inspector agreed
    pub fn is_match(&self) -> bool {
        matches!(self, Classification::Match)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Match => write!(f, "match"),
            Classification::Overgrade => write!(f, "overgrade"),
            Classification::Undergrade => write!(f, "undergrade"),
        }
    }
}
