//! Config store for loading `.pushrc` and the global defaults.

use std::path::{Path, PathBuf};

use crate::error::PushError;

use super::{
    GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE, PushConfig, merge_configs, parser::parse_push_toml,
};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    project_dir: PathBuf,
    global_config_dir: Option<PathBuf>,
}

impl ConfigStore {
    /// Store rooted at `project_dir`, with global defaults from the platform
    /// config directory.
    pub fn new(project_dir: PathBuf) -> Self {
        let global_config_dir = dirs::config_dir().map(|p| p.join("push"));
        Self {
            project_dir,
            global_config_dir,
        }
    }

    /// Store with an explicit global directory (or none), for tests.
    pub fn from_paths(project_dir: PathBuf, global_config_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_config_dir,
        }
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir.join(PROJECT_CONFIG_FILE)
    }

    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|dir| dir.join(GLOBAL_CONFIG_FILE))
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Load and merge both layers.
    ///
    /// The project file is required; there is no usable default project.
    pub fn load(&self) -> anyhow::Result<PushConfig> {
        let project_path = self.project_config_path();
        if !project_path.is_file() {
            return Err(PushError::MissingConfig {
                dir: self.project_dir.clone(),
            }
            .into());
        }
        let project = parse_push_toml(&project_path)?;

        let global = match self.global_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading global defaults");
                Some(parse_push_toml(&path)?)
            }
            _ => None,
        };

        Ok(merge_configs(global, project))
    }
}
