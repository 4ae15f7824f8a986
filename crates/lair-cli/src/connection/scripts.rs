//! Recursion guard for nested script execution.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Canonical paths of the scripts currently being executed, outermost first.
///
/// The length always equals the current script nesting depth, so a path can
/// appear at most once.
#[derive(Debug, Default)]
pub(crate) struct ActiveScriptPaths {
    paths: Vec<PathBuf>,
}

impl ActiveScriptPaths {
    /// Records `path` as active. Returns `false` when it already was.
    pub(crate) fn insert(&mut self, path: PathBuf) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Forgets `path`. Returns `false` when it was not active.
    pub(crate) fn remove(&mut self, path: &Path) -> bool {
        match self.paths.iter().rposition(|active| active == path) {
            Some(index) => {
                self.paths.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|active| active == path)
    }

    pub(crate) fn len(&self) -> usize {
        self.paths.len()
    }
}

/// A script tried to include itself while still running.
#[derive(Debug, Error)]
#[error("To prevent stack overflow error script '{}' was stopped", path.display())]
pub(crate) struct RecursionPrevented {
    /// The script that was already active.
    pub(crate) path: PathBuf,
}
