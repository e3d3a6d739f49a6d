//! Shared helper functions for CLI commands

use miette::Result;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::shortid::parse_entity_reference;

/// Locate the project, honoring an explicit `--project` root when given
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let found = match &global.project {
        Some(root) => Project::discover_from(root),
        None => Project::discover(),
    };
    found.map_err(|e| miette::miette!("{}", e))
}

/// Format an EntityId for a list column: shortened unless `--verbose`
pub fn display_id(id: &EntityId, global: &GlobalOpts) -> String {
    if global.verbose {
        id.to_string()
    } else {
        format_short_id(id)
    }
}

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts chars rather than bytes so multibyte names never split mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Escape a string for CSV output (RFC 4180)
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Resolve a user-supplied reference (@N, full or partial ID) to an entity
/// file of the given type, loading it.
///
/// Fails with a helpful message when nothing matches.
pub fn find_one<T: DeserializeOwned + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    reference: &str,
) -> Result<(PathBuf, T)> {
    let resolved = parse_entity_reference(reference, project);
    let dir = project.entity_dir(prefix);

    loader::load_entity::<T>(&dir, &resolved)?.ok_or_else(|| {
        miette::miette!(
            "no {} found matching '{}'. Use 'sgt {} list' to see available records.",
            prefix.as_str(),
            reference,
            prefix.as_str().to_lowercase()
        )
    })
}
