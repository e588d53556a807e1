//! Resolved settings: merged configuration with defaults and environment
//! fallbacks applied.

use super::schema::PushConfig;

pub const DEFAULT_CLONE_HOST: &str = "localhost";
pub const DEFAULT_CLONE_BASE_DIR: &str = "/clone/sources";
pub const DEFAULT_CLONE_PATH: &str = "push/common";
pub const DEFAULT_HOST_USER: &str = "data";
pub const DEFAULT_HOST_PATH: &str = "/srv/data";
pub const DEFAULT_REGISTRY_TOOL: &str = "dart-config";
pub const DEFAULT_REGISTRATION_FILE: &str = ".dartrc";
pub const DEFAULT_CONNECT_TIMEOUT: u32 = 10;

/// Directories copied into the release tree when `standard_layout` is set.
pub const STANDARD_LAYOUT_DIRS: [&str; 6] = ["bin", "sbin", "lib", "etc", "web", "www"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub clone_host: String,
    pub clone_base_dir: String,
    pub clone_path: String,
    pub host_user: String,
    pub host_path: String,
    pub skip_tests: bool,
    pub no_tag: bool,
    pub force_clean_remote: bool,
    pub registry_tool: String,
    pub registration_file: String,
    pub connect_timeout: u32,
    pub copy_dirs: Vec<String>,
    pub purge: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&PushConfig::default(), |_| None)
    }
}

impl Settings {
    /// Apply defaults to a merged configuration.
    ///
    /// Boolean flags the configuration leaves unset fall back to the
    /// `SKIP_TESTS`, `NO_TAG` and `FORCE_CLEAN_REMOTE` variables, looked up
    /// through `env` so callers control the environment.
    pub fn from_config(config: &PushConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |value: Option<bool>, var: &str| {
            value.unwrap_or_else(|| env(var).is_some_and(|v| is_truthy(&v)))
        };

        let mut copy_dirs = Vec::new();
        if config.build.standard_layout.unwrap_or(false) {
            copy_dirs.extend(STANDARD_LAYOUT_DIRS.iter().map(|d| d.to_string()));
        }
        for dir in config.build.copy.iter().flatten() {
            if !copy_dirs.contains(dir) {
                copy_dirs.push(dir.clone());
            }
        }

        Self {
            clone_host: or_default(&config.clone_host, DEFAULT_CLONE_HOST),
            clone_base_dir: or_default(&config.clone_base_dir, DEFAULT_CLONE_BASE_DIR),
            clone_path: or_default(&config.clone_path, DEFAULT_CLONE_PATH),
            host_user: or_default(&config.host_user, DEFAULT_HOST_USER),
            host_path: or_default(&config.host_path, DEFAULT_HOST_PATH),
            skip_tests: flag(config.skip_tests, "SKIP_TESTS"),
            no_tag: flag(config.no_tag, "NO_TAG"),
            force_clean_remote: flag(config.force_clean_remote, "FORCE_CLEAN_REMOTE"),
            registry_tool: or_default(&config.registry_tool, DEFAULT_REGISTRY_TOOL),
            registration_file: or_default(&config.registration_file, DEFAULT_REGISTRATION_FILE),
            connect_timeout: config.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            copy_dirs,
            purge: config.deploy.purge.clone().unwrap_or_default(),
        }
    }

    /// Destination directory on the clone host.
    ///
    /// `host_path` is absolute, so it is appended verbatim:
    /// `/clone/sources` + `push/common` + `/srv/data`.
    pub fn clone_destination(&self) -> String {
        format!("{}/{}{}", self.clone_base_dir, self.clone_path, self.host_path)
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

/// `True` and `1` switch a flag on; anything else leaves it off.
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "True" | "1")
}
