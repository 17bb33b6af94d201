//! Core data models for Worklens
//!
//! These models represent the classified commit records produced by the
//! classification engine and the report document emitted at the end of a run.

use serde::{Deserialize, Serialize};

/// Work categories for file and commit changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "New Work")]
    NewWork,
    Refactor,
    #[serde(rename = "Help Others")]
    HelpOthers,
    #[serde(rename = "Churn/Rework")]
    ChurnRework,
}

impl Category {
    /// Fixed iteration order wherever categories are tallied or compared;
    /// earlier entries win weighted-score ties.
    pub const ALL: [Category; 4] = [
        Category::NewWork,
        Category::Refactor,
        Category::HelpOthers,
        Category::ChurnRework,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::NewWork => write!(f, "New Work"),
            Category::Refactor => write!(f, "Refactor"),
            Category::HelpOthers => write!(f, "Help Others"),
            Category::ChurnRework => write!(f, "Churn/Rework"),
        }
    }
}

/// Last recorded change for a tracked file, as of the repository tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHistoryEntry {
    /// Author of the most recent commit touching the file
    pub last_author: String,
    /// Timestamp (Unix seconds) of that commit
    pub last_modified_at: i64,
}

/// Commit metadata as returned by the history reader.
#[derive(Debug, Clone)]
pub struct CommitMeta {
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Commit timestamp (Unix seconds)
    pub committed_at: i64,
    /// Subject line of the commit message
    pub message: String,
    /// First parent id; empty for a root commit
    pub parent_sha: String,
}

/// One file touched within a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub category: Category,
    pub insertions: usize,
    pub deletions: usize,
}

/// A fully classified commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub author: String,
    pub email: String,
    pub committed_at: i64,
    pub message: String,
    pub parent_sha: String,
    pub files: Vec<FileChange>,
    pub total_files_changed: usize,
    pub total_insertions: usize,
    pub total_deletions: usize,
    pub avg_insertions: f64,
    pub avg_deletions: f64,
    pub category: Category,
    /// 0.0 to 1.0; rewards additive work over deletion-heavy churn
    pub efficiency: f64,
    /// Gap since the previously processed commit, 0 for the first one.
    /// Raw difference in processing order, so it may be negative.
    pub interval_seconds: i64,
}

/// The report document printed at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_commits_processed: usize,
    pub commits: Vec<CommitRecord>,
}
