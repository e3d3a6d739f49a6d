//! CLI command implementations

pub mod completions;
pub mod defect;
pub mod grade;
pub mod init;
pub mod insp;
pub mod market;
pub mod product;
pub mod report;
pub mod scan;
