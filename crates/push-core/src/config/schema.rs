//! Configuration schema for `.pushrc` and the global `push.toml`.
//!
//! Every field is optional so that layers can be merged; defaults are applied
//! when the merged result is turned into [`Settings`](super::Settings).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PushError;
use crate::tasks::TaskKind;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    /// Host that serves the clone mirror
    #[serde(default)]
    pub clone_host: Option<String>,

    /// Directory on the clone host that holds every project's sources
    #[serde(default)]
    pub clone_base_dir: Option<String>,

    /// This project's directory under `clone_base_dir`
    #[serde(default)]
    pub clone_path: Option<String>,

    /// Remote user that owns deployed files
    #[serde(default)]
    pub host_user: Option<String>,

    /// Remote directory the archive is unpacked into
    #[serde(default)]
    pub host_path: Option<String>,

    #[serde(default)]
    pub skip_tests: Option<bool>,

    /// Disable the tag/dirty check before clone deploys
    #[serde(default)]
    pub no_tag: Option<bool>,

    /// Remove remote paths without asking
    #[serde(default)]
    pub force_clean_remote: Option<bool>,

    /// Executable that serves the host registry and registrations
    #[serde(default)]
    pub registry_tool: Option<String>,

    /// File in the project directory handed to `<registry_tool> register -`
    #[serde(default)]
    pub registration_file: Option<String>,

    /// SSH connect timeout in seconds
    #[serde(default)]
    pub connect_timeout: Option<u32>,

    /// Explicit executable paths, keyed by tool name
    #[serde(default)]
    pub tools: BTreeMap<String, PathBuf>,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    /// Shell commands run around tasks, keyed by task name
    #[serde(default)]
    pub hooks: BTreeMap<String, HookCommands>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directories copied from the build tree into the release tree
    #[serde(default)]
    pub copy: Option<Vec<String>>,

    /// Also copy the conventional `bin sbin lib etc web www` directories
    #[serde(default)]
    pub standard_layout: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Paths under the remote destination removed before unpacking
    #[serde(default)]
    pub purge: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommands {
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl PushConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> anyhow::Result<()> {
        for name in self.hooks.keys() {
            if TaskKind::from_name(name).is_none() {
                return Err(PushError::InvalidConfig(format!(
                    "hooks.{name}: no task named '{name}'"
                ))
                .into());
            }
        }

        if self.connect_timeout == Some(0) {
            return Err(
                PushError::InvalidConfig("connect_timeout must be at least 1".into()).into(),
            );
        }

        if let Some(path) = &self.host_path {
            if !path.starts_with('/') {
                return Err(PushError::InvalidConfig(format!(
                    "host_path must be absolute, got '{path}'"
                ))
                .into());
            }
        }

        for entry in self.deploy.purge.iter().flatten() {
            if entry.is_empty() || entry.starts_with('/') || entry.split('/').any(|c| c == "..")
            {
                return Err(PushError::InvalidConfig(format!(
                    "deploy.purge entries must be relative paths inside host_path, got '{entry}'"
                ))
                .into());
            }
        }

        Ok(())
    }
}
