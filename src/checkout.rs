use crate::commit::{Commit, parse_tree};
use crate::error::{Result, VcsError};
use crate::objects::ObjectKind;
use crate::repo::Repository;
use std::fs;

impl Repository {
    /// Restores the working tree to the commit matching `prefix` and points
    /// HEAD at it.
    ///
    /// Every path in the commit's tree is overwritten with the stored blob
    /// bytes (parent directories created as needed). Files in the working
    /// tree that the commit never tracked are left alone; this restores
    /// tracked content, it does not clean-sync the directory. HEAD always
    /// receives the resolved full digest, never the caller's prefix.
    pub fn go_to_commit(&self, prefix: &str) -> Result<String> {
        self.ensure_initialized()?;
        let resolved = self
            .resolve_commit_hash(prefix)?
            .ok_or_else(|| VcsError::CommitAmbiguousOrNotFound(prefix.to_string()))?;
        let store = self.store();
        let data = store.read(ObjectKind::Commit, &resolved).map_err(|e| match e {
            VcsError::ObjectMissing { .. } => VcsError::CommitNotFound(resolved.clone()),
            other => other,
        })?;
        let commit = Commit::parse(&data);
        let tree = store.read(ObjectKind::Tree, &commit.tree)?;
        for (path, blob_digest) in parse_tree(&tree) {
            let content = store.read(ObjectKind::Blob, &blob_digest)?;
            let target = self.root().join(&path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &content)?;
        }
        self.write_head(&resolved)?;
        Ok(resolved)
    }
}
