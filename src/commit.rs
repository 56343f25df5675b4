use crate::error::{Result, VcsError};
use crate::objects::ObjectKind;
use crate::repo::{Repository, SENTINEL};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;

/// One commit record. The stored (uncompressed) form is four `key value`
/// lines:
///
/// ```text
/// tree <tree-digest>
/// parent <commit-digest or "null">
/// time <unix-seconds>
/// message <text>
/// ```
///
/// The record's SHA-1 is the commit's identity; since `time` is embedded,
/// identical snapshots saved at different seconds still get distinct digests.
#[derive(Debug, PartialEq, Eq)]
pub struct Commit {
    pub tree: String,
    pub parent: String,
    pub time: i64,
    pub message: String,
}

impl Commit {
    pub(crate) fn serialize(&self) -> String {
        format!(
            "tree {}\nparent {}\ntime {}\nmessage {}\n",
            self.tree, self.parent, self.time, self.message
        )
    }

    /// Lenient line scan; unknown lines are skipped and missing fields fall
    /// back to empty/zero, matching how the store format has always been
    /// read.
    pub(crate) fn parse(data: &[u8]) -> Commit {
        let text = String::from_utf8_lossy(data);
        let mut commit = Commit {
            tree: String::new(),
            parent: String::new(),
            time: 0,
            message: String::new(),
        };
        for line in text.lines() {
            if let Some(v) = line.strip_prefix("tree ") {
                commit.tree = v.to_string();
            } else if let Some(v) = line.strip_prefix("parent ") {
                commit.parent = v.to_string();
            } else if let Some(v) = line.strip_prefix("time ") {
                commit.time = v.parse().unwrap_or(0);
            } else if let Some(v) = line.strip_prefix("message ") {
                commit.message = v.to_string();
            }
        }
        commit
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub digest: String,
    pub parent: String,
    pub time: i64,
    pub message: String,
}

/// Tree objects are `"path digest\n"` lines; order is the index's insertion
/// order at save time.
pub(crate) fn parse_tree(data: &[u8]) -> Vec<(String, String)> {
    String::from_utf8_lossy(data)
        .lines()
        .filter_map(|line| {
            line.split_once(' ')
                .map(|(path, digest)| (path.to_string(), digest.to_string()))
        })
        .collect()
}

impl Repository {
    /// Snapshots every tracked file and appends a commit to the chain.
    ///
    /// Blobs are written first (deduplicated by content), then the tree,
    /// then the commit record whose parent is the previous HEAD value.
    /// HEAD is advanced to the new commit's full digest last, so an
    /// interrupted save leaves at worst an unreferenced commit behind.
    pub fn save(&self, message: &str) -> Result<String> {
        self.ensure_initialized()?;
        let tracked = self.list_tracked()?;
        if tracked.is_empty() {
            return Err(VcsError::NothingTracked);
        }
        let store = self.store();
        let mut tree = String::new();
        for path in &tracked {
            let full = self.root().join(path);
            let content = fs::read(&full).map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    VcsError::FileNotFound(full.clone())
                } else {
                    VcsError::Io(e)
                }
            })?;
            let digest = store.write(ObjectKind::Blob, &content)?;
            tree.push_str(path);
            tree.push(' ');
            tree.push_str(&digest);
            tree.push('\n');
        }
        let tree_digest = store.write(ObjectKind::Tree, tree.as_bytes())?;
        let commit = Commit {
            tree: tree_digest,
            parent: self.read_head()?,
            time: Utc::now().timestamp(),
            message: message.to_string(),
        };
        let digest = store.write(ObjectKind::Commit, commit.serialize().as_bytes())?;
        self.write_head(&digest)?;
        Ok(digest)
    }

    /// Commits from HEAD back to the root, newest first. An unreadable or
    /// corrupt commit truncates the walk; whatever was collected up to that
    /// point is still returned.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.ensure_initialized()?;
        let store = self.store();
        let mut entries = Vec::new();
        let mut current = self.read_head()?;
        while current != SENTINEL && !current.is_empty() {
            let Ok(data) = store.read(ObjectKind::Commit, &current) else {
                break;
            };
            let commit = Commit::parse(&data);
            let parent = commit.parent.clone();
            entries.push(HistoryEntry {
                digest: current,
                parent: commit.parent,
                time: commit.time,
                message: commit.message,
            });
            current = parent;
        }
        Ok(entries)
    }

    /// Expands a digest prefix to the unique stored commit digest starting
    /// with it. Zero matches and multiple matches both come back as `None`;
    /// the two cases are deliberately not distinguished.
    pub fn resolve_commit_hash(&self, prefix: &str) -> Result<Option<String>> {
        self.ensure_initialized()?;
        let mut matched = None;
        for digest in self.store().list(ObjectKind::Commit)? {
            if digest.starts_with(prefix) {
                if matched.is_some() {
                    return Ok(None);
                }
                matched = Some(digest);
            }
        }
        Ok(matched)
    }

    /// Tree entries of the commit HEAD points at; `NoCommits` while HEAD is
    /// still the sentinel.
    pub(crate) fn head_tree(&self) -> Result<Vec<(String, String)>> {
        let head = self.read_head()?;
        if head == SENTINEL || head.is_empty() {
            return Err(VcsError::NoCommits);
        }
        let store = self.store();
        let commit = Commit::parse(&store.read(ObjectKind::Commit, &head)?);
        let tree = store.read(ObjectKind::Tree, &commit.tree)?;
        Ok(parse_tree(&tree))
    }
}
