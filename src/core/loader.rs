//! Entity loading utilities
//!
//! Generic helpers for loading entities from the filesystem, reducing
//! boilerplate in command implementations.

use miette::{IntoDiagnostic, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::identity::EntityPrefix;
use crate::core::project::Project;

/// Load all entities of type T from a directory
///
/// Scans the directory recursively for .sgt.yaml files and deserializes them.
/// Files that fail to parse are reported to stderr and skipped.
pub fn load_all<T: DeserializeOwned + 'static>(dir: &Path) -> Result<Vec<T>> {
    let mut entities = Vec::new();

    if !dir.exists() {
        return Ok(entities);
    }

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().to_string_lossy().ends_with(".sgt.yaml"))
    {
        match crate::yaml::parse_yaml_file::<T>(entry.path()) {
            Ok(entity) => entities.push(entity),
            Err(e) => {
                eprintln!("! Failed to parse {}: {}", entry.path().display(), e);
            }
        }
    }

    Ok(entities)
}

/// Load all entities of a given prefix type from a project
pub fn load_all_of<T: DeserializeOwned + 'static>(project: &Project, prefix: EntityPrefix) -> Result<Vec<T>> {
    load_all(&project.entity_dir(prefix))
}

/// Find an entity file by ID (supports partial matching)
///
/// Searches for a file whose stem contains the given ID.
/// Returns the first match found.
pub fn find_entity_file(dir: &Path, id: &str) -> Option<PathBuf> {
    if !dir.exists() {
        return None;
    }

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.to_string_lossy().ends_with(".sgt.yaml") {
            let filename = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if filename.contains(id) || filename.starts_with(id) {
                return Some(path.to_path_buf());
            }
        }
    }

    None
}

/// Load a single entity by ID
///
/// Searches for an entity file matching the ID and deserializes it.
/// Returns the path and entity if found.
pub fn load_entity<T: DeserializeOwned + 'static>(dir: &Path, id: &str) -> Result<Option<(PathBuf, T)>> {
    if let Some(path) = find_entity_file(dir, id) {
        let content = fs::read_to_string(&path).into_diagnostic()?;
        let entity: T = serde_yml::from_str(&content).into_diagnostic()?;
        return Ok(Some((path, entity)));
    }
    Ok(None)
}
