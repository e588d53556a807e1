//! Copying trees with rsync, honouring the project's `.gitignore`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::context::Context;
use crate::exec::{CommandRunner, Invocation};

/// Copy `source` to `destination` with rsync.
///
/// A relative `source` is taken from the build directory and a relative
/// `destination` is placed in the release directory; no destination means
/// the release directory itself. As with rsync, a trailing `/` on `source`
/// copies its contents rather than the directory.
pub fn copy(
    context: &Context,
    runner: &dyn CommandRunner,
    source: &str,
    destination: Option<&Path>,
) -> anyhow::Result<()> {
    let layout = context.layout();

    let source = if Path::new(source).is_absolute() {
        source.to_string()
    } else {
        format!("{}/{}", layout.build_dir().display(), source)
    };
    let destination: PathBuf = match destination {
        None => layout.release_dir().to_path_buf(),
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => layout.release_dir().join(dir),
    };

    std::fs::create_dir_all(&destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;

    let invocation = Invocation::new(context.tools().get("rsync")?)
        .args(exclude_args(context))
        .arg(source)
        .arg(destination.to_string_lossy())
        .current_dir(layout.current_dir());
    runner.run_checked(&invocation)?;
    Ok(())
}

/// rsync flags: archive mode with numeric ids, never the repository
/// metadata or push's own `.push` tree, and whatever `.gitignore` excludes.
fn exclude_args(context: &Context) -> Vec<String> {
    let mut args: Vec<String> = [
        "-ah",
        "--numeric-ids",
        "--exclude=.git",
        "--exclude=/.push",
        "--exclude=.gitignore",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let root_ignore = context.repo().root.join(".gitignore");
    args.push(format!("--exclude-from={}", root_ignore.display()));

    let local_ignore = context.current_dir().join(".gitignore");
    if local_ignore.is_file() && !same_file(&local_ignore, &root_ignore) {
        args.push(format!("--exclude-from={}", local_ignore.display()));
    }
    args
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
