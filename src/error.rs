use crate::objects::ObjectKind;
use std::path::PathBuf;

/// All errors produced by the core operations. Non-fatal statuses such as
/// "already tracked" are not errors; they are outcome enums returned by the
/// operation that produced them.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("not a litevcs repository (no .vcs directory)")]
    NotARepository,

    #[error("file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("path is outside the repository root: {0}")]
    PathOutsideRepository(PathBuf),

    #[error("nothing tracked, use `track` first")]
    NothingTracked,

    #[error("no commits to compare against")]
    NoCommits,

    #[error("missing {kind} object {digest}")]
    ObjectMissing { kind: ObjectKind, digest: String },

    #[error("corrupt {kind} object {digest}")]
    ObjectCorrupt { kind: ObjectKind, digest: String },

    #[error("commit hash ambiguous or not found: {0}")]
    CommitAmbiguousOrNotFound(String),

    #[error("commit object missing for resolved hash {0}")]
    CommitNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VcsError>;
