//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory holding the document store collections
const REGISTER_DIR: &str = "register";

/// Represents an RRT project (a directory tree with a `.rrt/` marker)
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .rrt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let rrt_dir = current.join(".rrt");
            if rrt_dir.is_dir() {
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

        let rrt_dir = root.join(".rrt");
        if rrt_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&rrt_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = rrt_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::create_dir_all(root.join(REGISTER_DIR))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# RRT Project Configuration

# Register owner for new entities (can be overridden by global config or RRT_USER)
# user: ""

# Active register period, e.g. "2025" (can be overridden by RRT_PERIOD)
# period: ""

# Default output format (auto, yaml, json, tsv, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .rrt configuration directory
    pub fn rrt_dir(&self) -> PathBuf {
        self.root.join(".rrt")
    }

    /// Root directory of the document store
    pub fn register_dir(&self) -> PathBuf {
        self.root.join(REGISTER_DIR)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an RRT project (searched from {searched_from:?}). Run 'rrt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("RRT project already exists at {0:?}")]
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

        assert!(project.rrt_dir().exists());
        assert!(project.rrt_dir().join("config.yaml").exists());
        assert!(project.register_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_rrt_dir() {
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
    fn test_project_discover_fails_without_rrt_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
