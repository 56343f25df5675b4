use crate::error::{Result, VcsError};
use crate::objects::ObjectKind;
use crate::repo::Repository;
use std::fs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffOp {
    Delete,
    Insert,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub op: DiffOp,
    pub text: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FileDiff {
    /// The tracked file no longer exists in the working tree.
    Deleted { path: String },
    /// The stored blob failed to decompress; no comparison was possible.
    Corrupt { path: String },
    Changed { path: String, entries: Vec<DiffEntry> },
}

/// Line-level comparison of HEAD's snapshot against the working tree.
/// An empty `files` list means nothing changed (after filtering).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub files: Vec<FileDiff>,
}

/// Whether a diff line is suppressed from output. Filtering happens after
/// the edit script is computed, so it never shifts which lines match.
pub fn is_ignorable(line: &str, ignore_empty: bool, ignore_whitespace: bool) -> bool {
    if ignore_empty && line.is_empty() {
        return true;
    }
    // an empty line is trivially all-whitespace
    ignore_whitespace && line.chars().all(char::is_whitespace)
}

pub(crate) fn split_lines(data: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(data)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Minimal insert/delete edit script between two line sequences, via the
/// classic LCS dynamic program. `dp[i][j]` is the LCS length of the
/// suffixes `old[i..]` and `new[j..]`, filled from the bottom-right corner.
///
/// The walk from `(0, 0)` ties toward deletion: when removing `old[i]` and
/// inserting `new[j]` both preserve the LCS length, the deletion is emitted
/// first. That choice keeps the output deterministic and must not change.
pub fn lcs_diff(old: &[String], new: &[String]) -> Vec<DiffEntry> {
    let (n, m) = (old.len(), new.len());
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if old[i] == new[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }
    let mut entries = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            entries.push(DiffEntry {
                op: DiffOp::Delete,
                text: old[i].clone(),
            });
            i += 1;
        } else {
            entries.push(DiffEntry {
                op: DiffOp::Insert,
                text: new[j].clone(),
            });
            j += 1;
        }
    }
    for line in &old[i..] {
        entries.push(DiffEntry {
            op: DiffOp::Delete,
            text: line.clone(),
        });
    }
    for line in &new[j..] {
        entries.push(DiffEntry {
            op: DiffOp::Insert,
            text: line.clone(),
        });
    }
    entries
}

impl Repository {
    /// Compares every file in HEAD's tree against the working copy.
    /// `NoCommits` while HEAD is the sentinel. A file is reported only if
    /// at least one edit survives the ignore filters; a file missing from
    /// the working tree is reported as deleted. A corrupt blob is reported
    /// for its own file and the walk continues, so damage to one object
    /// never hides changes in the healthy ones.
    pub fn diff(&self, ignore_empty: bool, ignore_whitespace: bool) -> Result<DiffReport> {
        self.ensure_initialized()?;
        let tree = self.head_tree()?;
        let store = self.store();
        let mut report = DiffReport::default();
        for (path, blob_digest) in tree {
            let working = self.root().join(&path);
            if !working.exists() {
                report.files.push(FileDiff::Deleted { path });
                continue;
            }
            let old = match store.read(ObjectKind::Blob, &blob_digest) {
                Ok(data) => data,
                Err(VcsError::ObjectCorrupt { .. }) => {
                    report.files.push(FileDiff::Corrupt { path });
                    continue;
                }
                Err(e) => return Err(e),
            };
            let old_lines = split_lines(&old);
            let new_lines = split_lines(&fs::read(&working)?);
            let entries: Vec<DiffEntry> = lcs_diff(&old_lines, &new_lines)
                .into_iter()
                .filter(|e| !is_ignorable(&e.text, ignore_empty, ignore_whitespace))
                .collect();
            if !entries.is_empty() {
                report.files.push(FileDiff::Changed { path, entries });
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VcsError;
    use tempfile::TempDir;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    fn del(text: &str) -> DiffEntry {
        DiffEntry {
            op: DiffOp::Delete,
            text: text.to_string(),
        }
    }

    fn ins(text: &str) -> DiffEntry {
        DiffEntry {
            op: DiffOp::Insert,
            text: text.to_string(),
        }
    }

    #[test]
    fn ignorable_rules() {
        assert!(is_ignorable("", true, false));
        assert!(!is_ignorable("", false, false));
        assert!(is_ignorable("  \t ", false, true));
        // empty counts as all-whitespace
        assert!(is_ignorable("", false, true));
        assert!(!is_ignorable(" x ", false, true));
    }

    #[test]
    fn lcs_keeps_common_lines_silent() {
        let diff = lcs_diff(&lines(&["a", "b", "c"]), &lines(&["a", "x", "c"]));
        assert_eq!(diff, vec![del("b"), ins("x")]);
    }

    #[test]
    fn equal_inputs_produce_no_edits() {
        assert!(lcs_diff(&lines(&["a", "b"]), &lines(&["a", "b"])).is_empty());
    }

    #[test]
    fn tie_break_prefers_deletion_first() {
        let diff = lcs_diff(&lines(&["a"]), &lines(&["b"]));
        assert_eq!(diff, vec![del("a"), ins("b")]);
    }

    #[test]
    fn tails_are_flushed() {
        assert_eq!(
            lcs_diff(&lines(&["a", "b", "c"]), &lines(&["a"])),
            vec![del("b"), del("c")]
        );
        assert_eq!(
            lcs_diff(&lines(&[]), &lines(&["x", "y"])),
            vec![ins("x"), ins("y")]
        );
    }

    fn saved_repo(tmp: &TempDir, content: &str) -> Repository {
        let repo = Repository::new(tmp.path());
        repo.init().unwrap();
        fs::write(tmp.path().join("a.txt"), content).unwrap();
        repo.track("a.txt").unwrap();
        repo.save("base").unwrap();
        repo
    }

    #[test]
    fn diff_without_commits_fails_fast() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        repo.init().unwrap();
        assert!(matches!(repo.diff(false, false), Err(VcsError::NoCommits)));
    }

    #[test]
    fn unchanged_tree_reports_nothing() {
        let tmp = TempDir::new().unwrap();
        let repo = saved_repo(&tmp, "a\nb\n");
        assert!(repo.diff(false, false).unwrap().files.is_empty());
    }

    #[test]
    fn modified_file_reports_the_edit_script() {
        let tmp = TempDir::new().unwrap();
        let repo = saved_repo(&tmp, "a\nb\nc\n");
        fs::write(tmp.path().join("a.txt"), "a\nx\nc\n").unwrap();
        let report = repo.diff(false, false).unwrap();
        assert_eq!(
            report.files,
            vec![FileDiff::Changed {
                path: "a.txt".to_string(),
                entries: vec![del("b"), ins("x")],
            }]
        );
    }

    #[test]
    fn missing_working_file_reports_deleted() {
        let tmp = TempDir::new().unwrap();
        let repo = saved_repo(&tmp, "gone\n");
        fs::remove_file(tmp.path().join("a.txt")).unwrap();
        let report = repo.diff(false, false).unwrap();
        assert_eq!(
            report.files,
            vec![FileDiff::Deleted {
                path: "a.txt".to_string()
            }]
        );
    }

    #[test]
    fn corrupt_blob_does_not_hide_healthy_files() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        repo.init().unwrap();
        fs::write(tmp.path().join("a.txt"), "alpha\n").unwrap();
        fs::write(tmp.path().join("b.txt"), "beta\n").unwrap();
        repo.track("a.txt").unwrap();
        repo.track("b.txt").unwrap();
        repo.save("base").unwrap();
        // damage a.txt's blob on disk, then change b.txt
        let blob = tmp
            .path()
            .join(".vcs/objects/blobs")
            .join(crate::objects::content_hash(b"alpha\n"));
        fs::write(&blob, b"garbage").unwrap();
        fs::write(tmp.path().join("b.txt"), "beta two\n").unwrap();
        let report = repo.diff(false, false).unwrap();
        assert_eq!(
            report.files,
            vec![
                FileDiff::Corrupt {
                    path: "a.txt".to_string()
                },
                FileDiff::Changed {
                    path: "b.txt".to_string(),
                    entries: vec![del("beta"), ins("beta two")],
                },
            ]
        );
    }

    #[test]
    fn ignore_empty_suppresses_without_reordering() {
        let tmp = TempDir::new().unwrap();
        let repo = saved_repo(&tmp, "a\nb\n");
        // inserting a blank line plus a real line
        fs::write(tmp.path().join("a.txt"), "a\n\nz\nb\n").unwrap();
        let full = repo.diff(false, false).unwrap();
        let filtered = repo.diff(true, false).unwrap();
        let FileDiff::Changed { entries, .. } = &full.files[0] else {
            panic!("expected a changed file");
        };
        assert_eq!(entries, &vec![ins(""), ins("z")]);
        let FileDiff::Changed { entries, .. } = &filtered.files[0] else {
            panic!("expected a changed file");
        };
        // the empty insert vanishes; the rest of the script is untouched
        assert_eq!(entries, &vec![ins("z")]);
    }

    #[test]
    fn fully_ignorable_changes_leave_an_empty_report() {
        let tmp = TempDir::new().unwrap();
        let repo = saved_repo(&tmp, "a\n");
        fs::write(tmp.path().join("a.txt"), "a\n   \n").unwrap();
        assert!(repo.diff(false, true).unwrap().files.is_empty());
    }
}
