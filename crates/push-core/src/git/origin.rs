//! Project naming helpers.

use std::path::{Component, Path};

/// Extract the project name from an origin URL.
///
/// The name is the last path segment with `.git` removed, so
/// `git@github.com:org/tool.git` and `https://host/org/tool.git` both give
/// `tool`. URLs without a `/` before the name or without the `.git` suffix
/// are rejected.
pub fn project_name_from_origin(origin: &str) -> Option<String> {
    let trimmed = origin.trim().strip_suffix(".git")?;
    let (_, name) = trimmed.rsplit_once('/')?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Name of the component being pushed: the working directory relative to the
/// repository root with `/` replaced by `-`. Empty at the root.
pub fn component_name(repo_root: &Path, current_dir: &Path) -> String {
    let Ok(relative) = current_dir.strip_prefix(repo_root) else {
        return String::new();
    };
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("-")
}
