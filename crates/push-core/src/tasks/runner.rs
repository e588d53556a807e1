//! Dependency-ordered, run-once task execution.

use std::collections::BTreeSet;

use crate::confirm::Confirmer;
use crate::context::Context;
use crate::deploy::DeployDescriptor;
use crate::exec::CommandRunner;
use crate::hosts::HostTable;

use super::hooks::{HookContext, Hooks};
use super::{Task, TaskKind};

/// Where a task instance is within this process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    NotStarted,
    Running,
    Completed,
}

/// Executes tasks against a [`Context`].
///
/// Owns the completion record. A task is recorded only once its body has
/// finished, so a failure never makes a later request skip the work.
pub struct TaskRunner<'a> {
    pub(super) context: &'a Context,
    pub(super) runner: &'a dyn CommandRunner,
    pub(super) confirmer: &'a dyn Confirmer,
    pub(super) hooks: Hooks,
    pub(super) host_table: Option<HostTable>,
    completed: BTreeSet<Task>,
    running: BTreeSet<Task>,
}

impl<'a> TaskRunner<'a> {
    pub fn new(
        context: &'a Context,
        runner: &'a dyn CommandRunner,
        confirmer: &'a dyn Confirmer,
    ) -> Self {
        Self {
            context,
            runner,
            confirmer,
            hooks: Hooks::new(),
            host_table: None,
            completed: BTreeSet::new(),
            running: BTreeSet::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use this host table instead of asking the registry tool.
    pub fn with_host_table(mut self, table: HostTable) -> Self {
        self.host_table = Some(table);
        self
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Run a task after its prerequisites.
    ///
    /// Returns immediately if the task already completed in this run. Any
    /// failure aborts the whole chain; nothing is retried.
    pub fn run(&mut self, task: &Task) -> anyhow::Result<()> {
        if self.completed.contains(task) {
            tracing::debug!(%task, "already completed, skipping");
            return Ok(());
        }
        if self.running.contains(task) {
            tracing::debug!(%task, "already running, skipping");
            return Ok(());
        }

        self.running.insert(task.clone());
        let result = self.run_with_prerequisites(task);
        self.running.remove(task);
        result?;

        if task.is_memoized() {
            self.completed.insert(task.clone());
        }
        Ok(())
    }

    /// Run tasks in order, stopping at the first failure.
    pub fn run_all(&mut self, tasks: &[Task]) -> anyhow::Result<()> {
        tasks.iter().try_for_each(|task| self.run(task))
    }

    fn run_with_prerequisites(&mut self, task: &Task) -> anyhow::Result<()> {
        for prerequisite in task.prerequisites() {
            self.run(&prerequisite)?;
        }

        tracing::debug!(%task, "running task");
        match task {
            Task::Clean => self.clean(),
            Task::MostlyClean => self.mostly_clean(),
            Task::Build => self.build(),
            Task::Test => self.test(),
            Task::Archive => self.archive(),
            Task::Register => self.register(),
            Task::Clone => self.clone_deploy(),
            Task::Live(name) => self.live(name),
            Task::Cleanup { host, path } => self.cleanup(host, path),
        }
    }

    pub fn state(&self, task: &Task) -> TaskState {
        if self.completed.contains(task) {
            TaskState::Completed
        } else if self.running.contains(task) {
            TaskState::Running
        } else {
            TaskState::NotStarted
        }
    }

    pub fn is_completed(&self, task: &Task) -> bool {
        self.completed.contains(task)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.completed.iter()
    }

    /// Forget every completed task so the next request redoes its work.
    pub fn reset(&mut self) {
        tracing::debug!(forgotten = self.completed.len(), "resetting completion record");
        self.completed.clear();
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub(super) fn before(
        &mut self,
        kind: TaskKind,
        hosts: &[String],
        deploy: Option<&DeployDescriptor>,
    ) -> anyhow::Result<()> {
        let hctx = HookContext {
            context: self.context,
            runner: self.runner,
            hosts,
            deploy,
        };
        self.hooks.run_before(kind, &hctx)
    }

    pub(super) fn after(
        &mut self,
        kind: TaskKind,
        hosts: &[String],
        deploy: Option<&DeployDescriptor>,
    ) -> anyhow::Result<()> {
        let hctx = HookContext {
            context: self.context,
            runner: self.runner,
            hosts,
            deploy,
        };
        self.hooks.run_after(kind, &hctx)
    }
}
