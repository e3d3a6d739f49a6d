//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Represents an SGT project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .sgt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let sgt_dir = current.join(".sgt");
            if sgt_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let sgt_dir = root.join(".sgt");
        if sgt_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::write_skeleton(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .sgt/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_skeleton(&root)?;
        Ok(Self { root })
    }

    fn write_skeleton(root: &Path) -> Result<(), ProjectError> {
        let sgt_dir = root.join(".sgt");
        std::fs::create_dir_all(&sgt_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = sgt_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Self::create_entity_dirs(root)
    }

    fn default_config() -> &'static str {
        r#"# SGT Project Configuration

# Default author for new records (can be overridden by global config)
# author: ""

# Editor to use for `sgt <entity> edit` commands (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    fn create_entity_dirs(root: &Path) -> Result<(), ProjectError> {
        let dirs = [
            "registry/markets",
            "registry/products",
            "registry/grades",
            "registry/defects",
            "inspections",
            "scanner/sessions",
        ];

        for dir in dirs {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .sgt configuration directory
    pub fn sgt_dir(&self) -> PathBuf {
        self.root.join(".sgt")
    }

    /// Get the path for a new entity file
    pub fn entity_path(&self, prefix: EntityPrefix, id: &EntityId) -> PathBuf {
        self.root
            .join(Self::entity_directory(prefix))
            .join(format!("{}.sgt.yaml", id))
    }

    /// Get the directory for a given entity prefix, relative to the root
    pub fn entity_directory(prefix: EntityPrefix) -> &'static str {
        match prefix {
            EntityPrefix::Mkt => "registry/markets",
            EntityPrefix::Prod => "registry/products",
            EntityPrefix::Grd => "registry/grades",
            EntityPrefix::Dfct => "registry/defects",
            EntityPrefix::Insp => "inspections",
            EntityPrefix::Scan => "scanner/sessions",
        }
    }

    /// Absolute directory for a given entity prefix
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(Self::entity_directory(prefix))
    }

    /// Iterate all entity files of a given prefix type
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.entity_dir(prefix);
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".sgt.yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an SGT project (searched from {searched_from:?}). Run 'sgt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("SGT project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.sgt_dir().exists());
        assert!(project.sgt_dir().join("config.yaml").exists());
        assert!(project.root().join("registry/markets").is_dir());
        assert!(project.root().join("registry/grades").is_dir());
        assert!(project.root().join("inspections").is_dir());
        assert!(project.root().join("scanner/sessions").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_sgt_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_sgt_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_lands_in_prefix_directory() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let id = EntityId::new(EntityPrefix::Grd);
        let path = project.entity_path(EntityPrefix::Grd, &id);
        assert!(path.starts_with(project.root().join("registry/grades")));
        assert!(path.to_string_lossy().ends_with(".sgt.yaml"));
    }
}
