//! Locating the external executables push shells out to.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::PushError;

/// Tools every run needs. Missing any of these is fatal before a task starts.
pub const REQUIRED_TOOLS: [&str; 6] = ["tar", "rsync", "ssh", "scp", "find", "sh"];

/// Resolved executable paths, keyed by tool name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tools {
    paths: BTreeMap<String, PathBuf>,
}

impl Tools {
    /// Build a tool table from explicit paths (tests, overrides).
    pub fn from_paths<I, K, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        }
    }

    /// Path to a tool that was required at startup.
    pub fn get(&self, name: &str) -> anyhow::Result<&Path> {
        self.paths
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| PushError::MissingTool(name.to_string()).into())
    }

    /// Path to a tool that may legitimately be absent.
    pub fn optional(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(name.into(), path.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

/// Searches PATH, honouring explicit overrides from configuration.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    search_path: Vec<PathBuf>,
    overrides: BTreeMap<String, PathBuf>,
}

impl ToolLocator {
    /// Locator over the current process's PATH.
    pub fn from_env() -> Self {
        let search_path = env::var_os("PATH")
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default();
        Self::new(search_path)
    }

    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: BTreeMap<String, PathBuf>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Find a single tool, or `None`.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        if let Some(path) = self.overrides.get(name) {
            return is_executable(path).then(|| path.clone());
        }
        self.search_path
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    /// Resolve every required tool, failing on the first one that is missing.
    pub fn require(&self, names: &[&str]) -> anyhow::Result<Tools> {
        let mut tools = Tools::default();
        for name in names {
            let path = self
                .locate(name)
                .ok_or_else(|| PushError::MissingTool((*name).to_string()))?;
            tracing::debug!(tool = name, path = %path.display(), "located tool");
            tools.insert(*name, path);
        }
        Ok(tools)
    }

    /// Resolve a tool that is only needed for optional features.
    ///
    /// Returns whether it was found; a missing tool is left out of `tools`.
    pub fn locate_optional(&self, tools: &mut Tools, name: &str) -> bool {
        match self.locate(name) {
            Some(path) => {
                tools.insert(name, path);
                true
            }
            None => {
                tracing::debug!(tool = name, "optional tool not found");
                false
            }
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_reported_by_name() {
        let locator = ToolLocator::new(Vec::new());
        let err = locator.require(&["tar"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PushError>(),
            Some(PushError::MissingTool(name)) if name == "tar"
        ));
    }

    #[test]
    fn tools_get_fails_for_unknown_tool() {
        let tools = Tools::from_paths([("ssh", "/usr/bin/ssh")]);
        assert_eq!(tools.get("ssh").unwrap(), Path::new("/usr/bin/ssh"));
        assert!(tools.get("scp").is_err());
        assert!(tools.optional("dart-config").is_none());
    }
}
