//! Shared fixtures for push-core integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use git2::{Repository, Signature};
use tempfile::TempDir;

use push_core::config::{ProjectLayout, PushConfig, Settings};
use push_core::confirm::Confirmer;
use push_core::context::Context;
use push_core::exec::{CommandOutput, CommandRunner, Invocation};
use push_core::git::RepoMetadata;
use push_core::tools::Tools;

/// Records every invocation instead of spawning it.
///
/// `tar -czf <file>` creates an empty `<file>` so later deploys find an
/// archive, and `rsync <dir>/ <dest>` recreates the directories of `<dir>`
/// that its `.gitignore` does not name. Commands can be made to fail or to
/// print canned stdout.
#[derive(Default)]
pub struct RecordingRunner {
    invocations: RefCell<Vec<Invocation>>,
    failures: RefCell<Vec<String>>,
    stdout: RefCell<HashMap<String, String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose [`command_line`] contains `needle`.
    pub fn fail_when(&self, needle: &str) {
        self.failures.borrow_mut().push(needle.to_string());
    }

    /// Print `stdout` whenever `program` runs.
    pub fn respond(&self, program: &str, stdout: &str) {
        self.stdout
            .borrow_mut()
            .insert(program.to_string(), stdout.to_string());
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.invocations.borrow().iter().map(command_line).collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(Invocation::program_name)
            .collect()
    }

    pub fn clear(&self) {
        self.invocations.borrow_mut().clear();
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<CommandOutput> {
        self.invocations.borrow_mut().push(invocation.clone());
        let line = command_line(invocation);

        if self.failures.borrow().iter().any(|n| line.contains(n.as_str())) {
            return Ok(CommandOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: "simulated failure".to_string(),
            });
        }

        let program = invocation.program_name();
        if program == "tar" && invocation.args.first().map(String::as_str) == Some("-czf") {
            let archive = PathBuf::from(&invocation.args[1]);
            if let Some(parent) = archive.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&archive, b"")?;
        }
        if program == "rsync" {
            mirror_tree(&invocation.args)?;
        }

        let mut output = CommandOutput::ok();
        if let Some(stdout) = self.stdout.borrow().get(&program) {
            output.stdout = stdout.clone();
        }
        Ok(output)
    }
}

/// Mirror the directory skeleton for `rsync ... <src>/ <dest>`.
fn mirror_tree(args: &[String]) -> std::io::Result<()> {
    let [.., source, destination] = args else {
        return Ok(());
    };
    let Some(source) = source.strip_suffix('/') else {
        return Ok(());
    };
    let source = Path::new(source);
    let ignored: Vec<String> = std::fs::read_to_string(source.join(".gitignore"))
        .unwrap_or_default()
        .lines()
        .map(|l| l.trim().trim_matches('/').to_string())
        .filter(|l| !l.is_empty())
        .collect();

    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == ".git" || ignored.contains(&name) || !entry.file_type()?.is_dir() {
            continue;
        }
        std::fs::create_dir_all(Path::new(destination).join(&name))?;
    }
    Ok(())
}

/// `program arg arg ...` with the program's directory stripped.
pub fn command_line(invocation: &Invocation) -> String {
    let mut line = invocation.program_name();
    for arg in &invocation.args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Answers from a script and remembers what it was asked.
///
/// Panics on a question it has no answer for.
#[derive(Default)]
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    /// Fails the test if asked anything.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => Ok(answer),
            None => panic!("unexpected question: {question}"),
        }
    }
}

/// Tool table pointing at conventional paths; nothing is executed.
pub fn fake_tools() -> Tools {
    Tools::from_paths([
        ("tar", "/bin/tar"),
        ("rsync", "/usr/bin/rsync"),
        ("ssh", "/usr/bin/ssh"),
        ("scp", "/usr/bin/scp"),
        ("find", "/usr/bin/find"),
        ("sh", "/bin/sh"),
        ("dart-config", "/usr/bin/dart-config"),
    ])
}

/// A project directory in a temp dir with a `.gitignore`.
pub struct TestProject {
    _temp: TempDir,
    pub dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("myproj");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(".gitignore"), ".push\n").unwrap();
        Self { _temp: temp, dir }
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Metadata for a clean checkout of `myproj` with no commits or tags.
    pub fn repo(&self) -> RepoMetadata {
        RepoMetadata {
            root: self.dir.clone(),
            origin: "git@git.example.com:team/myproj.git".to_string(),
            project_name: "myproj".to_string(),
            component: "myproj".to_string(),
            commit: "HEAD".to_string(),
            branch: "HEAD".to_string(),
            tags: Vec::new(),
            dirty: false,
        }
    }

    pub fn context(&self) -> Context {
        self.context_with(|_, _| {})
    }

    pub fn context_with(&self, configure: impl FnOnce(&mut RepoMetadata, &mut Settings)) -> Context {
        let mut repo = self.repo();
        let mut settings = Settings::default();
        configure(&mut repo, &mut settings);
        Context::new(
            ProjectLayout::new(self.dir.clone()),
            repo,
            fake_tools(),
            settings,
            PushConfig::default(),
        )
    }
}

/// `git init` with an `origin` remote.
pub fn init_repo(dir: &Path, origin: &str) -> Repository {
    let repo = Repository::init(dir).unwrap();
    repo.remote("origin", origin).unwrap();
    repo
}

/// Stage everything and commit it on HEAD.
pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = Signature::now("Push Test", "push@example.com").unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

/// Lightweight tag on HEAD.
pub fn tag_head(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight(name, head.as_object(), false).unwrap();
}
