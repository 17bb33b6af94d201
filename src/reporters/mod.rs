//! Output reporters for classified commit records
//!
//! Supports two output formats:
//! - `json` - the machine-readable report document
//! - `text` - terminal summary with colors

mod json;
mod text;

use crate::models::AnalysisReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: json, text", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Render a report using an OutputFormat enum
pub fn report_with_format(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::render(report),
        OutputFormat::Text => text::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Create a minimal AnalysisReport for testing
    pub(crate) fn test_report() -> AnalysisReport {
        use crate::models::{Category, CommitRecord, FileChange};

        let commits = vec![
            CommitRecord {
                sha: "a".repeat(40),
                author: "Alice".into(),
                email: "alice@example.com".into(),
                committed_at: 1_700_000_600,
                message: "add parser module".into(),
                parent_sha: "b".repeat(40),
                files: vec![FileChange {
                    path: "src/parser.rs".into(),
                    category: Category::NewWork,
                    insertions: 42,
                    deletions: 0,
                }],
                total_files_changed: 1,
                total_insertions: 42,
                total_deletions: 0,
                avg_insertions: 42.0,
                avg_deletions: 0.0,
                category: Category::NewWork,
                efficiency: 0.7,
                interval_seconds: 0,
            },
            CommitRecord {
                sha: "b".repeat(40),
                author: "Bob".into(),
                email: "bob@example.com".into(),
                committed_at: 1_700_000_000,
                message: "tweak config defaults".into(),
                parent_sha: String::new(),
                files: Vec::new(),
                total_files_changed: 0,
                total_insertions: 0,
                total_deletions: 0,
                avg_insertions: 0.0,
                avg_deletions: 0.0,
                category: Category::ChurnRework,
                efficiency: 0.0,
                interval_seconds: -600,
            },
        ];

        AnalysisReport {
            total_commits_processed: commits.len(),
            commits,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("txt").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("sarif").is_err());
    }
}
