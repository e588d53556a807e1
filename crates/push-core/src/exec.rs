//! External process execution.
//!
//! Everything push does to the outside world (rsync, tar, ssh, scp, hook
//! commands) goes through [`CommandRunner`], so tests can record invocations
//! instead of spawning processes.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::error::PushError;

/// A fully described process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// File whose contents are piped to stdin
    pub stdin_file: Option<PathBuf>,
    /// Capture stdout/stderr instead of passing them through to the terminal
    pub capture: bool,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
            stdin_file: None,
            capture: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin_file = Some(path.into());
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    /// The program name without its directory, e.g. `ssh` for `/usr/bin/ssh`.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Human-readable command line for logs and error messages.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

/// Result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with no output.
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Self::default()
        }
    }
}

/// Runs external processes.
pub trait CommandRunner {
    /// Run the invocation to completion. A non-zero exit is reported in the
    /// output, not as an error; only failing to start the process is an error.
    fn run(&self, invocation: &Invocation) -> anyhow::Result<CommandOutput>;

    /// Run the invocation and fail with [`PushError::CommandFailed`] unless it
    /// exits successfully.
    fn run_checked(&self, invocation: &Invocation) -> anyhow::Result<CommandOutput> {
        let output = self.run(invocation)?;
        if !output.success {
            return Err(PushError::CommandFailed {
                command: invocation.display(),
                code: output.code,
                stderr: output.stderr,
            }
            .into());
        }
        Ok(output)
    }
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<CommandOutput> {
        tracing::debug!(
            command = %invocation.display(),
            cwd = ?invocation.current_dir,
            "running command"
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        match &invocation.stdin_file {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open {} for stdin", path.display()))?;
                cmd.stdin(Stdio::from(file));
            }
            None => {
                cmd.stdin(Stdio::inherit());
            }
        }

        if invocation.capture {
            let output = cmd
                .output()
                .with_context(|| format!("Failed to run {}", invocation.program.display()))?;
            Ok(CommandOutput {
                success: output.status.success(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .with_context(|| format!("Failed to run {}", invocation.program.display()))?;
            Ok(CommandOutput {
                success: status.success(),
                code: status.code(),
                ..CommandOutput::default()
            })
        }
    }
}

/// Quote a string for a POSIX shell.
///
/// Plain words pass through untouched so logged command lines stay readable.
pub fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Quote a path for a POSIX shell.
pub fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}
