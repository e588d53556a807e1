//! Before/after extension points around task bodies.
//!
//! Callers attach closures to a [`TaskKind`]; the runner calls them around
//! the body of every task of that kind, in registration order. A failing hook
//! fails the task.

use std::collections::HashMap;
use std::fmt;

use crate::config::PushConfig;
use crate::context::Context;
use crate::deploy::DeployDescriptor;
use crate::exec::{CommandRunner, Invocation};

use super::TaskKind;

/// What a hook can see while it runs.
pub struct HookContext<'a> {
    pub context: &'a Context,
    pub runner: &'a dyn CommandRunner,
    /// Hosts the task is deploying to (`live`, `clone`, `deploy`, `cleanup`)
    pub hosts: &'a [String],
    /// The per-host deploy in progress (`deploy` hooks only)
    pub deploy: Option<&'a DeployDescriptor>,
}

type Hook = Box<dyn FnMut(&HookContext<'_>) -> anyhow::Result<()>>;

#[derive(Default)]
pub struct Hooks {
    before: HashMap<TaskKind, Vec<Hook>>,
    after: HashMap<TaskKind, Vec<Hook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` before the body of every `kind` task.
    pub fn before<F>(&mut self, kind: TaskKind, hook: F) -> &mut Self
    where
        F: FnMut(&HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.before.entry(kind).or_default().push(Box::new(hook));
        self
    }

    /// Run `hook` after the body of every `kind` task.
    pub fn after<F>(&mut self, kind: TaskKind, hook: F) -> &mut Self
    where
        F: FnMut(&HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.after.entry(kind).or_default().push(Box::new(hook));
        self
    }

    /// Register the shell commands declared under `[hooks.<task>]`.
    ///
    /// Keys were validated when the configuration was parsed; unknown ones
    /// are skipped here.
    pub fn from_config(config: &PushConfig) -> Self {
        let mut hooks = Self::new();
        for (name, commands) in &config.hooks {
            let Some(kind) = TaskKind::from_name(name) else {
                continue;
            };
            for command in commands.before.iter().cloned() {
                hooks.before(kind, move |hctx| run_shell_hook(hctx, &command));
            }
            for command in commands.after.iter().cloned() {
                hooks.after(kind, move |hctx| run_shell_hook(hctx, &command));
            }
        }
        hooks
    }

    pub fn count(&self, kind: TaskKind) -> usize {
        self.before.get(&kind).map_or(0, Vec::len) + self.after.get(&kind).map_or(0, Vec::len)
    }

    pub(crate) fn run_before(&mut self, kind: TaskKind, hctx: &HookContext<'_>) -> anyhow::Result<()> {
        run_all(self.before.get_mut(&kind), kind, "before", hctx)
    }

    pub(crate) fn run_after(&mut self, kind: TaskKind, hctx: &HookContext<'_>) -> anyhow::Result<()> {
        run_all(self.after.get_mut(&kind), kind, "after", hctx)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = |map: &HashMap<TaskKind, Vec<Hook>>| {
            let mut counts: Vec<_> = map.iter().map(|(k, v)| (k.name(), v.len())).collect();
            counts.sort();
            counts
        };
        f.debug_struct("Hooks")
            .field("before", &counts(&self.before))
            .field("after", &counts(&self.after))
            .finish()
    }
}

fn run_all(
    hooks: Option<&mut Vec<Hook>>,
    kind: TaskKind,
    phase: &str,
    hctx: &HookContext<'_>,
) -> anyhow::Result<()> {
    for hook in hooks.into_iter().flatten() {
        tracing::debug!(task = kind.name(), phase, "running hook");
        hook(hctx)?;
    }
    Ok(())
}

/// Run a configured hook command with `sh -c` in the project directory.
///
/// The layout, archive and targets are exported as `PUSH_*` variables.
fn run_shell_hook(hctx: &HookContext<'_>, command: &str) -> anyhow::Result<()> {
    let context = hctx.context;
    let layout = context.layout();
    let mut invocation = Invocation::new(context.tools().get("sh")?)
        .arg("-c")
        .arg(command)
        .current_dir(layout.current_dir())
        .env("PUSH_PROJECT_DIR", layout.current_dir().to_string_lossy())
        .env("PUSH_BUILD_DIR", layout.build_dir().to_string_lossy())
        .env("PUSH_RELEASE_DIR", layout.release_dir().to_string_lossy())
        .env("PUSH_TEST_DIR", layout.test_dir().to_string_lossy())
        .env("PUSH_ARCHIVE", context.archive_path().to_string_lossy())
        .env("PUSH_HOSTS", hctx.hosts.join(" "));
    if let Some(deploy) = hctx.deploy {
        invocation = invocation
            .env("PUSH_REMOTE_HOST", deploy.remote_host.as_str())
            .env("PUSH_REMOTE_USER", deploy.remote_user.as_str())
            .env("PUSH_REMOTE_PATH", deploy.remote_path.as_str());
    }
    hctx.runner.run_checked(&invocation)?;
    Ok(())
}
