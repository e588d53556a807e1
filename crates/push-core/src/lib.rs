//! Push Core Library
//!
//! Builds a project into a release tree, packs it into a gzip tarball and
//! unpacks that tarball on remote hosts. Tasks run in dependency order and
//! each one runs at most once per process unless `clean` resets the record.

pub mod config;
pub mod confirm;
pub mod context;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod git;
pub mod hosts;
pub mod tasks;
pub mod tools;
pub mod ui;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, ProjectLayout, PushConfig, Settings};
    pub use crate::context::Context;

    // Execution seams
    pub use crate::confirm::{AssumeNo, AssumeYes, Confirmer};
    pub use crate::exec::{CommandOutput, CommandRunner, Invocation, SystemRunner};

    // Domain
    pub use crate::deploy::{DeployDescriptor, DeployExecutor};
    pub use crate::error::PushError;
    pub use crate::git::RepoMetadata;
    pub use crate::hosts::{HostResolver, HostTable};
    pub use crate::tasks::{Hooks, Task, TaskKind, TaskRunner};
    pub use crate::tools::{ToolLocator, Tools};
}
