//! The task graph.
//!
//! A fixed set of named tasks with declared prerequisites. [`TaskRunner`]
//! runs prerequisites depth-first, left to right, and runs each task's body
//! at most once per process unless `clean` resets the record.

mod builtin;
pub mod copy;
pub mod hooks;
mod runner;

use std::fmt;

use crate::error::PushError;

pub use hooks::{HookContext, Hooks};
pub use runner::{TaskRunner, TaskState};

/// A task instance. Parameterised tasks are distinct per argument, so
/// `live web` and `live db` each run once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Clean,
    MostlyClean,
    Build,
    Test,
    Archive,
    Register,
    Clone,
    Live(String),
    Cleanup { host: String, path: String },
}

/// Task names without arguments; also the points hooks attach to.
///
/// `Deploy` is not a task of its own: its hooks run around every per-host
/// deploy made by `clone` and `live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Clean,
    MostlyClean,
    Build,
    Test,
    Archive,
    Register,
    Clone,
    Live,
    Cleanup,
    Deploy,
}

impl TaskKind {
    pub const ALL: [TaskKind; 10] = [
        TaskKind::Clean,
        TaskKind::MostlyClean,
        TaskKind::Build,
        TaskKind::Test,
        TaskKind::Archive,
        TaskKind::Register,
        TaskKind::Clone,
        TaskKind::Live,
        TaskKind::Cleanup,
        TaskKind::Deploy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Clean => "clean",
            TaskKind::MostlyClean => "mostlyclean",
            TaskKind::Build => "build",
            TaskKind::Test => "test",
            TaskKind::Archive => "archive",
            TaskKind::Register => "register",
            TaskKind::Clone => "clone",
            TaskKind::Live => "live",
            TaskKind::Cleanup => "cleanup",
            TaskKind::Deploy => "deploy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            TaskKind::Clean => "remove all build artifacts",
            TaskKind::MostlyClean => "remove most build artifacts",
            TaskKind::Build => "build the project",
            TaskKind::Test => "run project tests",
            TaskKind::Archive => "create deployment archive",
            TaskKind::Register => "register the project with the host registry",
            TaskKind::Clone => "deploy the project to clone",
            TaskKind::Live => "deploy the project to a host or tag: live NAME",
            TaskKind::Cleanup => "remove a deployed path: cleanup HOST PATH",
            TaskKind::Deploy => "send the archive to one host (hook point only)",
        }
    }

    /// Kinds that can be named on the command line.
    pub fn runnable() -> impl Iterator<Item = TaskKind> {
        Self::ALL.into_iter().filter(|k| *k != TaskKind::Deploy)
    }
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Clean => TaskKind::Clean,
            Task::MostlyClean => TaskKind::MostlyClean,
            Task::Build => TaskKind::Build,
            Task::Test => TaskKind::Test,
            Task::Archive => TaskKind::Archive,
            Task::Register => TaskKind::Register,
            Task::Clone => TaskKind::Clone,
            Task::Live(_) => TaskKind::Live,
            Task::Cleanup { .. } => TaskKind::Cleanup,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Tasks that must complete first, in the order they run.
    pub fn prerequisites(&self) -> Vec<Task> {
        match self {
            Task::Build => vec![Task::MostlyClean],
            Task::Test => vec![Task::Build],
            Task::Archive => vec![Task::Test],
            Task::Clone => vec![Task::Archive, Task::Register],
            Task::Live(_) => vec![Task::Archive],
            Task::Clean
            | Task::MostlyClean
            | Task::Register
            | Task::Cleanup { .. } => Vec::new(),
        }
    }

    /// Whether completion is remembered. `clean` always runs, since running
    /// it is what clears the record.
    pub fn is_memoized(&self) -> bool {
        !matches!(self, Task::Clean)
    }

    /// Parse a command-line task list such as `clean build live web`.
    pub fn parse_sequence<S: AsRef<str>>(args: &[S]) -> anyhow::Result<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut iter = args.iter().map(AsRef::as_ref);
        while let Some(word) = iter.next() {
            let kind = TaskKind::from_name(word)
                .ok_or_else(|| PushError::UnknownTask(word.to_string()))?;
            let task = match kind {
                TaskKind::Clean => Task::Clean,
                TaskKind::MostlyClean => Task::MostlyClean,
                TaskKind::Build => Task::Build,
                TaskKind::Test => Task::Test,
                TaskKind::Archive => Task::Archive,
                TaskKind::Register => Task::Register,
                TaskKind::Clone => Task::Clone,
                TaskKind::Live => {
                    let name = iter.next().ok_or(PushError::MissingTaskArgument {
                        task: "live",
                        argument: "NAME",
                    })?;
                    Task::Live(name.to_string())
                }
                TaskKind::Cleanup => {
                    let missing = |argument| PushError::MissingTaskArgument {
                        task: "cleanup",
                        argument,
                    };
                    let host = iter.next().ok_or_else(|| missing("HOST"))?;
                    let path = iter.next().ok_or_else(|| missing("PATH"))?;
                    Task::Cleanup {
                        host: host.to_string(),
                        path: path.to_string(),
                    }
                }
                TaskKind::Deploy => return Err(PushError::UnknownTask(word.to_string()).into()),
            };
            tasks.push(task);
        }
        Ok(tasks)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Live(name) => write!(f, "live {name}"),
            Task::Cleanup { host, path } => write!(f, "cleanup {host} {path}"),
            other => f.write_str(other.name()),
        }
    }
}
