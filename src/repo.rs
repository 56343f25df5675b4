use crate::error::{Result, VcsError};
use crate::objects::ObjectStore;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// HEAD value meaning "no history yet"; also the root commit's parent.
pub const SENTINEL: &str = "null";

#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Initialized,
    AlreadyInitialized,
}

/// Handle on one repository root. Construction never touches the disk;
/// every operation except `init` starts with an initialization check so a
/// bare directory fails with `NotARepository` instead of a stray io error.
pub struct Repository {
    root: PathBuf,
    vcs_dir: PathBuf,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let vcs_dir = root.join(".vcs");
        Repository { root, vcs_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_initialized(&self) -> bool {
        self.vcs_dir.exists()
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(VcsError::NotARepository)
        }
    }

    pub(crate) fn store(&self) -> ObjectStore {
        ObjectStore::new(&self.vcs_dir)
    }

    pub(crate) fn index_path(&self) -> PathBuf {
        self.vcs_dir.join("index")
    }

    fn head_path(&self) -> PathBuf {
        self.vcs_dir.join("HEAD")
    }

    /// Creates the `.vcs` layout: empty index, HEAD at the sentinel, the
    /// three object areas, and an informational config file. Running it
    /// against an existing repository changes nothing.
    pub fn init(&self) -> Result<InitOutcome> {
        if self.is_initialized() {
            return Ok(InitOutcome::AlreadyInitialized);
        }
        for kind in ["blobs", "trees", "commits"] {
            fs::create_dir_all(self.vcs_dir.join("objects").join(kind))?;
        }
        fs::write(self.index_path(), "")?;
        fs::write(self.head_path(), SENTINEL)?;
        fs::write(self.vcs_dir.join("config"), "version=1")?;
        Ok(InitOutcome::Initialized)
    }

    /// Current HEAD value: a full commit digest, or the sentinel.
    pub(crate) fn read_head(&self) -> Result<String> {
        let head = fs::read_to_string(self.head_path())?;
        Ok(head.trim().to_string())
    }

    /// Replaces HEAD atomically; the old value stays intact if the write
    /// is interrupted.
    pub(crate) fn write_head(&self, digest: &str) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.vcs_dir)?;
        tmp.write_all(digest.as_bytes())?;
        tmp.persist(self.head_path())
            .map_err(|e| VcsError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        assert_eq!(repo.init().unwrap(), InitOutcome::Initialized);
        assert!(tmp.path().join(".vcs/objects/blobs").is_dir());
        assert!(tmp.path().join(".vcs/objects/trees").is_dir());
        assert!(tmp.path().join(".vcs/objects/commits").is_dir());
        assert_eq!(fs::read_to_string(tmp.path().join(".vcs/HEAD")).unwrap(), SENTINEL);
        assert_eq!(fs::read_to_string(tmp.path().join(".vcs/index")).unwrap(), "");
        assert_eq!(
            fs::read_to_string(tmp.path().join(".vcs/config")).unwrap(),
            "version=1"
        );
    }

    #[test]
    fn init_twice_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        repo.init().unwrap();
        repo.write_head("abc123").unwrap();
        assert_eq!(repo.init().unwrap(), InitOutcome::AlreadyInitialized);
        // second init must not reset HEAD
        assert_eq!(repo.read_head().unwrap(), "abc123");
    }

    #[test]
    fn operations_require_initialization() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        assert!(matches!(
            repo.ensure_initialized(),
            Err(VcsError::NotARepository)
        ));
    }

    #[test]
    fn head_round_trips_through_atomic_write() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        repo.init().unwrap();
        assert_eq!(repo.read_head().unwrap(), SENTINEL);
        repo.write_head("deadbeef").unwrap();
        assert_eq!(repo.read_head().unwrap(), "deadbeef");
    }
}
