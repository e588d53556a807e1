//! Working directories under `.push`.

use std::path::{Path, PathBuf};

/// Name of the containment directory inside the project directory.
pub const CONTAINMENT_DIR: &str = ".push";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    current_dir: PathBuf,
    containment_dir: PathBuf,
    build_dir: PathBuf,
    archive_dir: PathBuf,
    release_dir: PathBuf,
    test_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(current_dir: PathBuf) -> Self {
        let containment_dir = current_dir.join(CONTAINMENT_DIR);
        Self {
            build_dir: containment_dir.join("build"),
            archive_dir: containment_dir.join("archive"),
            release_dir: containment_dir.join("release"),
            test_dir: containment_dir.join("test"),
            containment_dir,
            current_dir,
        }
    }

    /// The directory push was started in.
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn containment_dir(&self) -> &Path {
        &self.containment_dir
    }

    /// Copy of the project tree the build works on.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Tree that ends up in the archive.
    pub fn release_dir(&self) -> &Path {
        &self.release_dir
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    /// Directories removed by `mostlyclean`.
    pub fn intermediate_dirs(&self) -> [&Path; 4] {
        [
            &self.build_dir,
            &self.archive_dir,
            &self.release_dir,
            &self.test_dir,
        ]
    }
}
