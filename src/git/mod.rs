//! Git history access
//!
//! Read-only queries against a repository's commit history: the commit
//! window listing, per-commit metadata and diffs, and the per-file
//! last-touch snapshot the classifier's aging heuristics run against.

pub mod history;

pub use history::GitHistory;

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{CommitMeta, FileHistoryEntry};

/// Errors from history queries. Both variants abort the run; there is no
/// per-commit recovery.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The underlying git query failed; carries the tool's diagnostic text.
    #[error("history query failed: {0}")]
    Query(#[from] git2::Error),

    /// A query result that cannot be parsed into the expected shape.
    #[error("malformed history record for {context}: {detail}")]
    MalformedRecord { context: String, detail: String },
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Read-only view of a repository's commit history.
///
/// The classifier depends on this trait rather than on any particular git
/// transport; [`GitHistory`] implements it with libgit2.
pub trait HistoryReader {
    /// Commit ids whose commit time falls inside `[since, until]`, in the
    /// history tool's reverse-chronological-from-tip order.
    fn list_commits(&self, since: i64, until: i64) -> HistoryResult<Vec<String>>;

    /// Last author and modification time for every file tracked at the
    /// current tip. Files with no reachable history are absent; callers
    /// treat absence as "never touched".
    fn file_history_snapshot(&self) -> HistoryResult<HashMap<String, FileHistoryEntry>>;

    fn commit_metadata(&self, sha: &str) -> HistoryResult<CommitMeta>;

    /// Paths touched by the commit. An empty list is valid and meaningful.
    fn changed_files(&self, sha: &str) -> HistoryResult<Vec<String>>;

    /// Insertions and deletions for one file, relative to the commit's
    /// first parent (the empty tree for a root commit).
    fn file_diff_stats(&self, sha: &str, path: &str) -> HistoryResult<(usize, usize)>;

    /// Raw unified diff text (zero context lines) for one file.
    fn unified_diff(&self, sha: &str, path: &str) -> HistoryResult<String>;
}
