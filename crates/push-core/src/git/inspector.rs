//! Reads repository metadata with libgit2.

use std::path::{Path, PathBuf};

use git2::{Repository, StatusOptions};

use crate::error::PushError;

use super::origin::{component_name, project_name_from_origin};

/// Placeholder used for the commit and branch when HEAD does not name one.
pub const HEAD: &str = "HEAD";

/// Identity of the project being pushed. Read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    /// Root of the work tree
    pub root: PathBuf,
    pub origin: String,
    pub project_name: String,
    /// Subdirectory of the root being pushed, `/` replaced with `-`
    pub component: String,
    /// Full commit id, or `HEAD` in a repository without commits
    pub commit: String,
    /// Branch name, or `HEAD` when detached or unborn
    pub branch: String,
    /// Tags pointing exactly at the commit, sorted
    pub tags: Vec<String>,
    /// Uncommitted or untracked changes exist
    pub dirty: bool,
}

impl RepoMetadata {
    /// The tag naming this revision, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }

    /// `{project}-{component}-v{commit}.tar.gz`
    pub fn archive_name(&self) -> String {
        format!(
            "{}-{}-v{}.tar.gz",
            self.project_name, self.component, self.commit
        )
    }
}

/// Inspect the repository containing `current_dir`.
pub fn inspect(current_dir: &Path) -> anyhow::Result<RepoMetadata> {
    let repo = Repository::discover(current_dir).map_err(|_| PushError::NotARepository {
        path: current_dir.to_path_buf(),
    })?;
    let root = repo
        .workdir()
        .ok_or_else(|| PushError::NotARepository {
            path: current_dir.to_path_buf(),
        })?
        .to_path_buf();

    if !root.join(".gitignore").is_file() {
        return Err(PushError::MissingGitignore { root }.into());
    }

    let (commit, branch) = head_names(&repo)?;
    let tags = if commit == HEAD {
        Vec::new()
    } else {
        tags_at_head(&repo)?
    };
    let dirty = is_dirty(&repo)?;

    let origin = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(str::to_string))
        .ok_or(PushError::MissingOrigin)?;
    let project_name = project_name_from_origin(&origin)
        .ok_or_else(|| PushError::UnparseableOrigin(origin.clone()))?;

    let component = component_name(&canonical(&root), &canonical(current_dir));

    let metadata = RepoMetadata {
        root,
        origin,
        project_name,
        component,
        commit,
        branch,
        tags,
        dirty,
    };
    tracing::debug!(?metadata, "inspected repository");
    Ok(metadata)
}

fn head_names(repo: &Repository) -> anyhow::Result<(String, String)> {
    let head = match repo.head() {
        Ok(head) => head,
        // Unborn branch: no commits yet
        Err(_) => return Ok((HEAD.to_string(), HEAD.to_string())),
    };

    let commit = head.peel_to_commit()?.id().to_string();
    let branch = if repo.head_detached()? {
        HEAD.to_string()
    } else {
        head.shorthand().unwrap_or(HEAD).to_string()
    };
    Ok((commit, branch))
}

fn tags_at_head(repo: &Repository) -> anyhow::Result<Vec<String>> {
    let head = repo.head()?.peel_to_commit()?.id();
    let mut tags = Vec::new();
    for name in repo.tag_names(None)?.iter().flatten() {
        let target = repo
            .revparse_single(&format!("refs/tags/{name}"))
            .and_then(|obj| obj.peel_to_commit());
        if matches!(target, Ok(commit) if commit.id() == head) {
            tags.push(name.to_string());
        }
    }
    tags.sort();
    Ok(tags)
}

fn is_dirty(repo: &Repository) -> anyhow::Result<bool> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(false)
        .include_ignored(false);
    Ok(!repo.statuses(Some(&mut opts))?.is_empty())
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
