//! Grading comparison core
//!
//! The scanner-vs-inspector engine: pure rank comparison
//! ([`Classification::classify`]), session aggregation ([`SessionStats`]),
//! and the grade-id-to-rank resolver ([`GradeBook`]). Everything here is
//! synchronous, stateless between calls, and free of filesystem access;
//! the CLI layer loads entities and hands resolved data in.

pub mod classify;
pub mod resolver;
pub mod stats;

pub use classify::{Classification, Rank};
pub use resolver::{GradeBook, GradeRef};
pub use stats::SessionStats;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the grading core
///
/// Lookup failures are data-integrity problems, never transient faults, so
/// nothing here is retried. A failure classifies as fatal to the single
/// piece being processed and leaves every other piece untouched.
#[derive(Debug, Error, Diagnostic)]
pub enum GradingError {
    /// The resolver has no grade with this id
    #[error("grade not found: {id}")]
    #[diagnostic(
        code(sgt::grading::grade_not_found),
        help("run 'sgt grade list' to see registered grades")
    )]
    GradeNotFound { id: String },

    /// A classification was attempted with a grade id that does not resolve
    #[error("invalid grade reference: {id}")]
    #[diagnostic(
        code(sgt::grading::invalid_grade_reference),
        help("both the inspector and scanner grade must exist in the registry")
    )]
    InvalidGradeReference { id: String },

    /// The grade exists but belongs to a different product hierarchy
    #[error("grade {grade} does not belong to product {expected}")]
    #[diagnostic(
        code(sgt::grading::product_mismatch),
        help("ranks are only ordered within one product; pick a grade from the session's product")
    )]
    ProductMismatch { grade: String, expected: String },
}
