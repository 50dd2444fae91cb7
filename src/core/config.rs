//! Configuration management with layered hierarchy
//!
//! Supplies the identity collaborator's two values: the register owner
//! (`user`) and the active `period`. Priority: built-in defaults, then global
//! user config, then project config, then environment variables.

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::project::Project;

/// RRT configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Register owner for new entities
    pub user: Option<String>,

    /// Active register period (e.g. "2025")
    pub period: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/rrt/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Project config (.rrt/config.yaml)
        if let Ok(project) = Project::discover() {
            let project_config_path = project.rrt_dir().join("config.yaml");
            if project_config_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&project_config_path) {
                    if let Ok(project_config) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(project_config);
                    }
                }
            }
        }

        // 4. Environment variables
        if let Ok(user) = std::env::var("RRT_USER") {
            config.user = Some(user);
        }
        if let Ok(period) = std::env::var("RRT_PERIOD") {
            config.period = Some(period);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rrt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.period.is_some() {
            self.period = other.period;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the register owner, falling back to the OS username
    pub fn user(&self) -> String {
        if let Some(ref user) = self.user {
            return user.clone();
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get the active period, falling back to the current calendar year
    pub fn period(&self) -> String {
        if let Some(ref period) = self.period {
            return period.clone();
        }

        chrono::Utc::now().format("%Y").to_string()
    }
}
