//! SGT: Sierra Grading Toolkit
//!
//! A Unix-style toolkit for recording lumber grading inspections and
//! scanner agreement studies as plain text files under git version control.

pub mod cli;
pub mod core;
pub mod entities;
pub mod grading;
pub mod yaml;
