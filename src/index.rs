use crate::error::{Result, VcsError};
use crate::repo::Repository;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    Tracked(String),
    AlreadyTracked(String),
}

/// Canonical index form of a path: relative to the repository root, with
/// forward slashes regardless of platform.
fn normalize_relative(root: &Path, full: &Path) -> Result<String> {
    let root = root.canonicalize()?;
    let full = full.canonicalize()?;
    let rel = full
        .strip_prefix(&root)
        .map_err(|_| VcsError::PathOutsideRepository(full.clone()))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

impl Repository {
    /// Adds `path` to the staging index. The file must exist under the
    /// repository root; a path already present is reported as
    /// `AlreadyTracked` rather than failing.
    pub fn track(&self, path: &str) -> Result<TrackOutcome> {
        self.ensure_initialized()?;
        let full = self.root().join(path);
        if !full.exists() {
            return Err(VcsError::FileNotFound(full));
        }
        let normalized = normalize_relative(self.root(), &full)?;
        if self.list_tracked()?.iter().any(|t| *t == normalized) {
            return Ok(TrackOutcome::AlreadyTracked(normalized));
        }
        let mut index = OpenOptions::new().append(true).open(self.index_path())?;
        writeln!(index, "{normalized}")?;
        Ok(TrackOutcome::Tracked(normalized))
    }

    /// Tracked paths in insertion order. The order carries no meaning but is
    /// preserved so tree serialization is stable across repeated saves.
    pub fn list_tracked(&self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        let content = fs::read_to_string(self.index_path())?;
        Ok(content
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}
