//! Commit classification engine
//!
//! Turns raw per-file change data into categorized, scored commit records.
//! For each commit the engine looks up every touched file's last-touch
//! history, assigns the file one of four work categories, aggregates those
//! into a commit-level category through a fixed weighted vote, and scores
//! the commit's efficiency. The only cross-commit state is the timestamp of
//! the previously processed commit, which feeds `interval_seconds`; the
//! file-history snapshot is captured once at construction and never mutated.

use std::collections::HashMap;

use tracing::debug;

use crate::git::{HistoryReader, HistoryResult};
use crate::models::{Category, CommitMeta, CommitRecord, FileChange, FileHistoryEntry};

/// 21 days in seconds, the default aging threshold for both the refactor
/// and help-others rules.
const DEFAULT_THRESHOLD_SECS: i64 = 3 * 7 * 24 * 60 * 60;

/// Aging thresholds for the per-file rules.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// Minimum file age (seconds) for a large change to count as a refactor
    pub refactor_threshold: i64,
    /// Maximum file age (seconds) for another author's change to count as
    /// helping others
    pub help_others_threshold: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            refactor_threshold: DEFAULT_THRESHOLD_SECS,
            help_others_threshold: DEFAULT_THRESHOLD_SECS,
        }
    }
}

/// Per-category multiplier for the commit-level weighted vote.
fn weight(category: Category) -> usize {
    match category {
        Category::NewWork => 6,
        Category::Refactor => 8,
        Category::HelpOthers => 5,
        Category::ChurnRework => 4,
    }
}

/// Per-category factor applied to the insertion ratio when scoring
/// efficiency.
fn efficiency_factor(category: Category) -> f64 {
    match category {
        Category::Refactor => 0.9,
        Category::NewWork => 0.7,
        Category::HelpOthers => 0.6,
        Category::ChurnRework => 0.5,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted vote across the per-file category counts. Ties go to the
/// earlier entry in [`Category::ALL`].
fn commit_category(counts: &HashMap<Category, usize>) -> Category {
    let mut best = Category::ALL[0];
    let mut best_score = counts.get(&best).copied().unwrap_or(0) * weight(best);
    for category in Category::ALL.into_iter().skip(1) {
        let score = counts.get(&category).copied().unwrap_or(0) * weight(category);
        if score > best_score {
            best = category;
            best_score = score;
        }
    }
    best
}

/// Insertion ratio scaled by the category factor, rounded to 2 decimals.
/// 0.0 when the commit changed no lines at all.
fn commit_efficiency(category: Category, insertions: usize, deletions: usize) -> f64 {
    let total = insertions + deletions;
    if total == 0 {
        return 0.0;
    }
    round2(insertions as f64 / total as f64 * efficiency_factor(category))
}

/// Sequential commit classifier.
///
/// Commits must be fed in the exact order the history reader listed them:
/// `interval_seconds` is computed against the previously classified commit,
/// whatever its timestamp.
pub struct CommitClassifier<'a, R: HistoryReader> {
    reader: &'a R,
    config: ClassifierConfig,
    snapshot: HashMap<String, FileHistoryEntry>,
    previous_timestamp: Option<i64>,
}

impl<'a, R: HistoryReader> CommitClassifier<'a, R> {
    /// Build a classifier, capturing the file-history snapshot at the
    /// repository's current tip. The snapshot is deliberately not updated
    /// as commits are processed.
    pub fn new(reader: &'a R, config: ClassifierConfig) -> HistoryResult<Self> {
        let snapshot = reader.file_history_snapshot()?;
        debug!("classifier ready, snapshot of {} files", snapshot.len());
        Ok(Self {
            reader,
            config,
            snapshot,
            previous_timestamp: None,
        })
    }

    /// Classify one commit and advance the interval clock.
    pub fn classify(&mut self, sha: &str) -> HistoryResult<CommitRecord> {
        let meta = self.reader.commit_metadata(sha)?;

        let interval_seconds = match self.previous_timestamp {
            // Raw difference; negative when the input order is not
            // chronological
            Some(prev) => meta.committed_at - prev,
            None => 0,
        };
        self.previous_timestamp = Some(meta.committed_at);

        let paths = self.reader.changed_files(sha)?;
        if paths.is_empty() {
            return Ok(CommitRecord {
                sha: sha.to_string(),
                author: meta.author,
                email: meta.email,
                committed_at: meta.committed_at,
                message: meta.message,
                parent_sha: meta.parent_sha,
                files: Vec::new(),
                total_files_changed: 0,
                total_insertions: 0,
                total_deletions: 0,
                avg_insertions: 0.0,
                avg_deletions: 0.0,
                category: Category::ChurnRework,
                efficiency: 0.0,
                interval_seconds,
            });
        }

        let mut files = Vec::with_capacity(paths.len());
        let mut counts: HashMap<Category, usize> = HashMap::new();
        let mut total_insertions = 0usize;
        let mut total_deletions = 0usize;

        for path in &paths {
            let (insertions, deletions) = self.reader.file_diff_stats(sha, path)?;
            total_insertions += insertions;
            total_deletions += deletions;

            let category = self.classify_file(sha, path, &meta, insertions, deletions)?;
            *counts.entry(category).or_default() += 1;

            files.push(FileChange {
                path: path.clone(),
                category,
                insertions,
                deletions,
            });
        }

        let total_files_changed = files.len();
        let category = commit_category(&counts);
        let efficiency = commit_efficiency(category, total_insertions, total_deletions);

        Ok(CommitRecord {
            sha: sha.to_string(),
            author: meta.author,
            email: meta.email,
            committed_at: meta.committed_at,
            message: meta.message,
            parent_sha: meta.parent_sha,
            files,
            total_files_changed,
            total_insertions,
            total_deletions,
            avg_insertions: round2(total_insertions as f64 / total_files_changed as f64),
            avg_deletions: round2(total_deletions as f64 / total_files_changed as f64),
            category,
            efficiency,
            interval_seconds,
        })
    }

    /// Apply the per-file rules in their fixed order; the first match wins.
    fn classify_file(
        &self,
        sha: &str,
        path: &str,
        meta: &CommitMeta,
        insertions: usize,
        deletions: usize,
    ) -> HistoryResult<Category> {
        // Files absent from the snapshot count as never touched
        let (last_author, last_modified_at) = match self.snapshot.get(path) {
            Some(entry) => (entry.last_author.as_str(), entry.last_modified_at),
            None => ("", 0),
        };
        let age = meta.committed_at - last_modified_at;

        if age > self.config.refactor_threshold && insertions + deletions > 10 {
            return Ok(Category::Refactor);
        }
        if last_author != meta.author && age <= self.config.help_others_threshold {
            return Ok(Category::HelpOthers);
        }

        // Pure addition: the whole diff text contains an added-line marker
        // and no removed-line marker anywhere. A substring check over the
        // raw text, not a per-line classification.
        let diff = self.reader.unified_diff(sha, path)?;
        if diff.contains('+') && !diff.contains('-') {
            return Ok(Category::NewWork);
        }

        Ok(Category::ChurnRework)
    }
}
