//! CLI command definitions and handlers

pub(crate) mod analyze;
mod timeexpr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::store::EsCredentials;

/// Worklens - commit history work classification
#[derive(Parser, Debug)]
#[command(name = "worklens")]
#[command(
    version,
    about = "Classify git commit history by work type and index it into Elasticsearch",
    long_about = "Worklens walks a repository's commit history for a time window, classifies \
every commit by the kind of work it represents (new work, refactor, helping others, or \
churn/rework), scores each commit's efficiency, and bulk-indexes the enriched records into \
an Elasticsearch-compatible store.\n\n\
The classified records are always printed as a structured report on stdout; an indexing \
failure is reported separately and never discards computed results.",
    after_help = "\
Examples:
  worklens analyze . --es-host http://localhost:9200 --es-index git-commits
  worklens analyze . --since '30 days ago' --es-host http://localhost:9200 --es-index git-commits
  worklens analyze . --dry-run                       Print the report without indexing
  worklens analyze . --dry-run --format text         Human-readable summary"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify commits in a time window and index the results
    #[command(after_help = "\
Examples:
  worklens analyze . --es-host http://localhost:9200 --es-index git-commits
  worklens analyze . --since '2024-01-01' --until '2024-02-01' --dry-run
  worklens analyze . --es-host https://es.internal:9200 --es-index commits \\
      --es-user elastic --es-password changeme
  worklens analyze . --dry-run --format text -o report.txt")]
    Analyze {
        /// Start of the commit window (e.g. "7 days ago", "2024-01-15")
        #[arg(long, default_value = "7 days ago")]
        since: String,

        /// End of the commit window (e.g. "now", "yesterday")
        #[arg(long, default_value = "now")]
        until: String,

        /// Elasticsearch host (e.g. http://localhost:9200)
        #[arg(long, required_unless_present = "dry_run")]
        es_host: Option<String>,

        /// Elasticsearch index name (e.g. git-commits)
        #[arg(long, required_unless_present = "dry_run")]
        es_index: Option<String>,

        /// Elasticsearch username (optional)
        #[arg(long, requires = "es_password")]
        es_user: Option<String>,

        /// Elasticsearch password (optional)
        #[arg(long, requires = "es_user", env = "WORKLENS_ES_PASSWORD")]
        es_password: Option<String>,

        /// Skip indexing, only print the report
        #[arg(long)]
        dry_run: bool,

        /// Output format: json, text
        #[arg(long, short = 'f', default_value = "json", value_parser = ["json", "text"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// File age (days) beyond which a large change counts as a refactor
        #[arg(long, default_value = "21")]
        refactor_threshold_days: i64,

        /// File age (days) within which another author's file counts as helping others
        #[arg(long, default_value = "21")]
        help_threshold_days: i64,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            since,
            until,
            es_host,
            es_index,
            es_user,
            es_password,
            dry_run,
            format,
            output,
            refactor_threshold_days,
            help_threshold_days,
        } => {
            let credentials = es_user
                .zip(es_password)
                .map(|(username, password)| EsCredentials { username, password });

            analyze::run(
                &cli.path,
                &since,
                &until,
                es_host.as_deref(),
                es_index.as_deref(),
                credentials,
                dry_run,
                &format,
                output.as_deref(),
                refactor_threshold_days,
                help_threshold_days,
            )
        }
    }
}
