//! Git history extraction using libgit2
//!
//! Implements [`HistoryReader`] on top of the git2 crate (Rust bindings to
//! libgit2): commit window listing, the per-file last-touch snapshot, and
//! per-commit diff queries.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use git2::{Diff, DiffFormat, DiffOptions, Oid, Repository, Sort};
use tracing::debug;

use super::{HistoryError, HistoryReader, HistoryResult};
use crate::models::{CommitMeta, FileHistoryEntry};

/// Git history reader backed by libgit2.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the repository containing `path` (or any subdirectory of it).
    pub fn open(path: &Path) -> HistoryResult<Self> {
        let repo = Repository::discover(path)?;
        debug!("opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    fn find_commit(&self, sha: &str) -> HistoryResult<git2::Commit<'_>> {
        let oid = Oid::from_str(sha).map_err(|e| HistoryError::MalformedRecord {
            context: format!("commit id '{sha}'"),
            detail: e.message().to_string(),
        })?;
        Ok(self.repo.find_commit(oid)?)
    }

    /// Diff of a commit against its first parent (the empty tree for a root
    /// commit), optionally narrowed to a single path.
    fn commit_diff(
        &self,
        commit: &git2::Commit<'_>,
        path: Option<&str>,
        context_lines: Option<u32>,
    ) -> HistoryResult<Diff<'_>> {
        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

        let mut diff_opts = DiffOptions::new();
        if let Some(path) = path {
            diff_opts.pathspec(path);
        }
        if let Some(n) = context_lines {
            diff_opts.context_lines(n);
        }

        Ok(self.repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&tree),
            Some(&mut diff_opts),
        )?)
    }

    /// All blobs reachable from the tip tree.
    fn tracked_files(&self) -> HistoryResult<HashSet<String>> {
        let head = self.repo.head()?;
        let tree = head.peel_to_tree()?;

        let mut files = HashSet::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                let path = if dir.is_empty() {
                    entry.name().unwrap_or("").to_string()
                } else {
                    format!("{}{}", dir, entry.name().unwrap_or(""))
                };
                files.insert(path);
            }
            git2::TreeWalkResult::Ok
        })?;

        Ok(files)
    }
}

impl HistoryReader for GitHistory {
    fn list_commits(&self, since: i64, until: i64) -> HistoryResult<Vec<String>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let t = commit.time().seconds();

            if t > until {
                continue;
            }
            if t < since {
                // Commits are sorted by time, so we can stop
                break;
            }
            commits.push(oid.to_string());
        }

        debug!("found {} commits in window", commits.len());
        Ok(commits)
    }

    fn file_history_snapshot(&self) -> HistoryResult<HashMap<String, FileHistoryEntry>> {
        let tracked = self.tracked_files()?;
        let mut snapshot: HashMap<String, FileHistoryEntry> = HashMap::new();

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        for oid_result in revwalk {
            if snapshot.len() == tracked.len() {
                break;
            }

            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let author = commit.author().name().unwrap_or("Unknown").to_string();
            let timestamp = commit.time().seconds();

            let diff = self.commit_diff(&commit, None, None)?;
            diff.foreach(
                &mut |delta, _| {
                    if let Some(path) = delta.new_file().path() {
                        let path_str = path.to_string_lossy().to_string();
                        // Walking newest-first, so the first commit seen for
                        // a path is its most recent change
                        if tracked.contains(&path_str) && !snapshot.contains_key(&path_str) {
                            snapshot.insert(
                                path_str,
                                FileHistoryEntry {
                                    last_author: author.clone(),
                                    last_modified_at: timestamp,
                                },
                            );
                        }
                    }
                    true
                },
                None,
                None,
                None,
            )?;
        }

        debug!(
            "file history snapshot covers {} of {} tracked files",
            snapshot.len(),
            tracked.len()
        );
        Ok(snapshot)
    }

    fn commit_metadata(&self, sha: &str) -> HistoryResult<CommitMeta> {
        let commit = self.find_commit(sha)?;
        let author = commit.author();

        Ok(CommitMeta {
            author: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
            committed_at: commit.time().seconds(),
            message: commit
                .message()
                .unwrap_or("")
                .lines()
                .next()
                .unwrap_or("")
                .to_string(),
            parent_sha: commit
                .parent_id(0)
                .map(|id| id.to_string())
                .unwrap_or_default(),
        })
    }

    fn changed_files(&self, sha: &str) -> HistoryResult<Vec<String>> {
        let commit = self.find_commit(sha)?;
        let diff = self.commit_diff(&commit, None, None)?;

        let mut files = Vec::new();
        diff.foreach(
            &mut |delta, _| {
                if let Some(path) = delta.new_file().path() {
                    files.push(path.to_string_lossy().to_string());
                }
                true
            },
            None,
            None,
            None,
        )?;

        Ok(files)
    }

    fn file_diff_stats(&self, sha: &str, path: &str) -> HistoryResult<(usize, usize)> {
        let commit = self.find_commit(sha)?;
        let diff = self.commit_diff(&commit, Some(path), None)?;

        let stats = diff.stats()?;
        Ok((stats.insertions(), stats.deletions()))
    }

    fn unified_diff(&self, sha: &str, path: &str) -> HistoryResult<String> {
        let commit = self.find_commit(sha)?;
        let diff = self.commit_diff(&commit, Some(path), Some(0))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_, _, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use git2::{Signature, Time};
    use tempfile::tempdir;

    fn signature(name: &str, at: i64) -> Result<Signature<'static>> {
        let email = format!("{}@example.com", name.to_lowercase());
        Ok(Signature::new(name, &email, &Time::new(at, 0))?)
    }

    /// Write `content` to `path` and commit it with a fixed author and time.
    fn commit_file(
        repo: &Repository,
        path: &str,
        content: &str,
        author: &str,
        at: i64,
    ) -> Result<String> {
        let workdir = repo.workdir().expect("test repo has a workdir");
        let file = workdir.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file, content)?;

        let mut index = repo.index()?;
        index.add_path(Path::new(path))?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let sig = signature(author, at)?;
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &format!("update {path}"),
            &tree,
            &parents,
        )?;
        Ok(oid.to_string())
    }

    fn create_test_repo() -> Result<(tempfile::TempDir, Repository)> {
        let dir = tempdir()?;
        let repo = Repository::init(dir.path())?;
        Ok((dir, repo))
    }

    #[test]
    fn test_open_repo() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        commit_file(&repo, "a.txt", "hello\n", "Alice", 1_000)?;
        let history = GitHistory::open(dir.path())?;
        let meta = history.commit_metadata(&history.list_commits(0, 2_000)?[0])?;
        assert_eq!(meta.author, "Alice");
        Ok(())
    }

    #[test]
    fn test_is_git_repo() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        assert!(GitHistory::is_git_repo(dir.path()));

        let non_repo = tempdir()?;
        assert!(!GitHistory::is_git_repo(non_repo.path()));
        Ok(())
    }

    #[test]
    fn test_list_commits_window() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        let old = commit_file(&repo, "a.txt", "one\n", "Alice", 1_000)?;
        let mid = commit_file(&repo, "a.txt", "two\n", "Alice", 2_000)?;
        let new = commit_file(&repo, "a.txt", "three\n", "Alice", 3_000)?;

        let history = GitHistory::open(dir.path())?;

        let all = history.list_commits(0, 10_000)?;
        assert_eq!(all, vec![new.clone(), mid.clone(), old.clone()]);

        let window = history.list_commits(1_500, 2_500)?;
        assert_eq!(window, vec![mid]);

        let empty = history.list_commits(5_000, 10_000)?;
        assert!(empty.is_empty());
        Ok(())
    }

    #[test]
    fn test_commit_metadata() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        let root = commit_file(&repo, "a.txt", "one\n", "Alice", 1_000)?;
        let child = commit_file(&repo, "a.txt", "two\n", "Bob", 2_000)?;

        let history = GitHistory::open(dir.path())?;

        let meta = history.commit_metadata(&root)?;
        assert_eq!(meta.author, "Alice");
        assert_eq!(meta.email, "alice@example.com");
        assert_eq!(meta.committed_at, 1_000);
        assert_eq!(meta.message, "update a.txt");
        assert_eq!(meta.parent_sha, "");

        let meta = history.commit_metadata(&child)?;
        assert_eq!(meta.author, "Bob");
        assert_eq!(meta.parent_sha, root);
        Ok(())
    }

    #[test]
    fn test_commit_metadata_rejects_bad_id() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        commit_file(&repo, "a.txt", "one\n", "Alice", 1_000)?;

        let history = GitHistory::open(dir.path())?;
        let err = history.commit_metadata("not-a-sha").unwrap_err();
        assert!(matches!(err, HistoryError::MalformedRecord { .. }));
        Ok(())
    }

    #[test]
    fn test_changed_files_and_stats() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        commit_file(&repo, "a.txt", "one\ntwo\n", "Alice", 1_000)?;
        let sha = commit_file(&repo, "a.txt", "one\nthree\nfour\n", "Alice", 2_000)?;

        let history = GitHistory::open(dir.path())?;

        let files = history.changed_files(&sha)?;
        assert_eq!(files, vec!["a.txt".to_string()]);

        let (insertions, deletions) = history.file_diff_stats(&sha, "a.txt")?;
        assert_eq!(insertions, 2);
        assert_eq!(deletions, 1);
        Ok(())
    }

    #[test]
    fn test_root_commit_stats_against_empty_tree() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        let sha = commit_file(&repo, "a.txt", "one\ntwo\nthree\n", "Alice", 1_000)?;

        let history = GitHistory::open(dir.path())?;
        let (insertions, deletions) = history.file_diff_stats(&sha, "a.txt")?;
        assert_eq!(insertions, 3);
        assert_eq!(deletions, 0);
        Ok(())
    }

    #[test]
    fn test_unified_diff_markers() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        commit_file(&repo, "a.txt", "one\n", "Alice", 1_000)?;
        let sha = commit_file(&repo, "a.txt", "two\n", "Alice", 2_000)?;

        let history = GitHistory::open(dir.path())?;
        let diff = history.unified_diff(&sha, "a.txt")?;
        assert!(diff.contains("+two"));
        assert!(diff.contains("-one"));
        Ok(())
    }

    #[test]
    fn test_file_history_snapshot() -> Result<()> {
        let (dir, repo) = create_test_repo()?;
        commit_file(&repo, "a.txt", "one\n", "Alice", 1_000)?;
        commit_file(&repo, "b.txt", "one\n", "Bob", 2_000)?;
        commit_file(&repo, "a.txt", "two\n", "Carol", 3_000)?;

        let history = GitHistory::open(dir.path())?;
        let snapshot = history.file_history_snapshot()?;

        assert_eq!(snapshot.len(), 2);
        let a = &snapshot["a.txt"];
        assert_eq!(a.last_author, "Carol");
        assert_eq!(a.last_modified_at, 3_000);
        let b = &snapshot["b.txt"];
        assert_eq!(b.last_author, "Bob");
        assert_eq!(b.last_modified_at, 2_000);
        Ok(())
    }
}
