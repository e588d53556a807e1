//! Configuration for push runs
//!
//! Two layers are merged field by field:
//! - Global: `<config_dir>/push/push.toml` (optional defaults)
//! - Project: `./.pushrc` (required)

pub mod layout;
pub mod merge;
pub mod parser;
pub mod schema;
pub mod settings;
pub mod store;

pub use layout::ProjectLayout;
pub use merge::merge_configs;
pub use parser::{parse_push_toml, parse_push_toml_str};
pub use schema::{BuildConfig, DeployConfig, HookCommands, PushConfig};
pub use settings::Settings;
pub use store::ConfigStore;

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = ".pushrc";

/// Name of the global defaults file inside the push config directory.
pub const GLOBAL_CONFIG_FILE: &str = "push.toml";
