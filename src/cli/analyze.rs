//! The analyze command: list the window, classify each commit, index the
//! batch, print the report.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};

use super::timeexpr;
use crate::classifier::{ClassifierConfig, CommitClassifier};
use crate::git::{GitHistory, HistoryReader};
use crate::models::AnalysisReport;
use crate::reporters::{self, OutputFormat};
use crate::store::{ElasticSink, EsCredentials};

#[allow(clippy::too_many_arguments)]
pub fn run(
    path: &Path,
    since: &str,
    until: &str,
    es_host: Option<&str>,
    es_index: Option<&str>,
    credentials: Option<EsCredentials>,
    dry_run: bool,
    format: &str,
    output: Option<&Path>,
    refactor_threshold_days: i64,
    help_threshold_days: i64,
) -> Result<()> {
    let now = Utc::now();
    let since_ts = timeexpr::resolve(since, now)
        .with_context(|| format!("invalid --since expression '{since}'"))?;
    let until_ts = timeexpr::resolve(until, now)
        .with_context(|| format!("invalid --until expression '{until}'"))?;

    let history = GitHistory::open(path)
        .with_context(|| format!("failed to open git repository at {}", path.display()))?;

    let commits = history.list_commits(since_ts, until_ts)?;
    if commits.is_empty() {
        println!("No commits found in the specified time range.");
        return Ok(());
    }
    info!("classifying {} commits", commits.len());

    let config = ClassifierConfig {
        refactor_threshold: refactor_threshold_days * 24 * 60 * 60,
        help_others_threshold: help_threshold_days * 24 * 60 * 60,
    };
    let mut classifier = CommitClassifier::new(&history, config)?;

    let mut records = Vec::with_capacity(commits.len());
    for sha in &commits {
        records.push(classifier.classify(sha)?);
    }

    // Indexing runs before the report is printed; a failure downgrades to a
    // non-zero exit instead of discarding computed results
    let mut persist_failed = false;
    if dry_run {
        info!("dry run, skipping indexing");
    } else if let (Some(host), Some(index)) = (es_host, es_index) {
        let sink = ElasticSink::new(host, index, credentials);
        match sink.bulk_index(&records) {
            Ok(count) => info!("indexed {count} commits into '{index}'"),
            Err(err) => {
                error!("failed to index commits: {err}");
                persist_failed = true;
            }
        }
    }

    let report = AnalysisReport {
        total_commits_processed: records.len(),
        commits: records,
    };

    let format = format.parse::<OutputFormat>()?;
    let rendered = reporters::report_with_format(&report, format)?;
    match output {
        Some(file) => {
            std::fs::write(file, &rendered)
                .with_context(|| format!("failed to write report to {}", file.display()))?;
            info!("report written to {}", file.display());
        }
        None => println!("{rendered}"),
    }

    if persist_failed {
        std::process::exit(1);
    }
    Ok(())
}
