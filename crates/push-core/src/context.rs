//! Run context for dependency injection.

use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, ProjectLayout, PushConfig, Settings};
use crate::git::{self, RepoMetadata};
use crate::tools::{REQUIRED_TOOLS, ToolLocator, Tools};

/// Everything tasks read about the project and its environment.
///
/// Built once at startup and passed by reference. Tasks never discover state
/// on their own, so ordering of startup checks is explicit here.
#[derive(Debug, Clone)]
pub struct Context {
    layout: ProjectLayout,
    repo: RepoMetadata,
    tools: Tools,
    settings: Settings,
    config: PushConfig,
}

impl Context {
    /// Create a context from already-resolved parts.
    pub fn new(
        layout: ProjectLayout,
        repo: RepoMetadata,
        tools: Tools,
        settings: Settings,
        config: PushConfig,
    ) -> Self {
        Self {
            layout,
            repo,
            tools,
            settings,
            config,
        }
    }

    /// Probe the filesystem, repository and PATH for a run in `current_dir`.
    ///
    /// Order matters: the repository must exist before anything else is
    /// checked, and configuration must load before tools, because it may
    /// override tool paths.
    pub fn discover(current_dir: PathBuf, store: &ConfigStore) -> anyhow::Result<Self> {
        let repo = git::inspect(&current_dir)?;
        let config = store.load()?;
        let settings = Settings::from_config(&config, |key| std::env::var(key).ok());
        let tools = locate_tools(&ToolLocator::from_env(), &config, &settings)?;
        let layout = ProjectLayout::new(current_dir);

        Ok(Self::new(layout, repo, tools, settings, config))
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn repo(&self) -> &RepoMetadata {
        &self.repo
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings can be adjusted after loading, e.g. by command-line flags.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The merged configuration the settings were derived from.
    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn current_dir(&self) -> &Path {
        self.layout.current_dir()
    }

    /// Path of the archive this run produces.
    pub fn archive_path(&self) -> PathBuf {
        self.layout.archive_dir().join(self.repo.archive_name())
    }
}

/// Resolve required tools (fatal if missing) and the optional registry tool.
pub fn locate_tools(
    locator: &ToolLocator,
    config: &PushConfig,
    settings: &Settings,
) -> anyhow::Result<Tools> {
    let locator = locator.clone().with_overrides(config.tools.clone());
    let mut tools = locator.require(&REQUIRED_TOOLS)?;
    // only `live` needs it, and warns there
    if !locator.locate_optional(&mut tools, &settings.registry_tool) {
        tracing::debug!(tool = %settings.registry_tool, "host registry tool not found");
    }
    Ok(tools)
}
