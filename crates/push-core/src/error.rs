//! Error types for push operations.
//!
//! Functions return `anyhow::Result`; these variants are the failures callers
//! and tests need to tell apart.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    /// The per-project `.pushrc` file is absent
    #[error("Could not find .pushrc file in {}.", dir.display())]
    MissingConfig { dir: PathBuf },

    /// The configuration parsed but holds values we cannot use
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The working directory is not inside a git work tree
    #[error("Could not find root of git repository. Is {} a git repository?", path.display())]
    NotARepository { path: PathBuf },

    #[error("Could not find .gitignore file in project root {}.", root.display())]
    MissingGitignore { root: PathBuf },

    #[error("Could not find the origin for this git repository.")]
    MissingOrigin,

    #[error("Could not extract project name from origin {0}.")]
    UnparseableOrigin(String),

    /// A required executable is not on PATH and not configured
    #[error("Could not find required tool '{0}'.")]
    MissingTool(String),

    #[error("No archive file found at {}. Cannot distribute project.", path.display())]
    MissingArchive { path: PathBuf },

    #[error("No release directory found at {}. Cannot create archive.", path.display())]
    MissingReleaseDir { path: PathBuf },

    /// The operator answered "no" to a policy prompt
    #[error("Aborting at user request.")]
    Declined,

    #[error("Command '{command}' failed with exit code {code:?}{}", format_stderr(.stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Unknown task '{0}'. Run with --list to see available tasks.")]
    UnknownTask(String),

    #[error("Task '{task}' requires an argument: {argument}")]
    MissingTaskArgument {
        task: &'static str,
        argument: &'static str,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
