//! Entity type definitions
//!
//! SGT records the following entity types:
//!
//! **Registry (master data):**
//! - [`Market`] - destination markets
//! - [`Product`] - product lines, each owning a ranked grade hierarchy
//! - [`Grade`] - grades within a product hierarchy (rank 1 = best)
//! - [`Defect`] - defect catalog
//!
//! **Records:**
//! - [`Inspection`] - per-shift grading inspections with grade/defect tallies
//! - [`ScannerSession`] - scanner agreement studies with classified items

pub mod defect;
pub mod grade;
pub mod inspection;
pub mod market;
pub mod product;
pub mod session;

pub use defect::Defect;
pub use grade::Grade;
pub use inspection::{Inspection, InspectionKind, InspectionResult};
pub use market::Market;
pub use product::Product;
pub use session::{ScannerSession, SessionItem};
