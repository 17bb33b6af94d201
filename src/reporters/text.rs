//! Text (terminal) reporter with colors and formatting

use crate::models::{AnalysisReport, Category};
use anyhow::Result;

/// Category colors (ANSI escape codes)
fn category_color(category: Category) -> &'static str {
    match category {
        Category::NewWork => "\x1b[32m",     // Green
        Category::Refactor => "\x1b[36m",    // Cyan
        Category::HelpOthers => "\x1b[33m",  // Yellow
        Category::ChurnRework => "\x1b[31m", // Red
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Category tag
fn category_tag(category: Category) -> &'static str {
    match category {
        Category::NewWork => "[N]",
        Category::Refactor => "[R]",
        Category::HelpOthers => "[H]",
        Category::ChurnRework => "[C]",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}Worklens Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Commits: {BOLD}{}{RESET}\n\n",
        report.total_commits_processed
    ));

    // Category breakdown
    out.push_str(&format!("{BOLD}CATEGORIES{RESET}\n"));
    for category in Category::ALL {
        let count = report
            .commits
            .iter()
            .filter(|c| c.category == category)
            .count();
        let color = category_color(category);
        out.push_str(&format!("  {color}{category}{RESET}: {count}\n"));
    }
    out.push('\n');

    // Per-commit lines, in processing order
    out.push_str(&format!("{BOLD}COMMITS{RESET}\n"));
    for commit in &report.commits {
        let color = category_color(commit.category);
        let short_sha = &commit.sha[..commit.sha.len().min(12)];
        out.push_str(&format!(
            "  {color}{}{RESET} {DIM}{short_sha}{RESET}  eff {:.2}  +{} -{}  {}\n",
            category_tag(commit.category),
            commit.efficiency,
            commit.total_insertions,
            commit.total_deletions,
            commit.message
        ));
    }

    Ok(out)
}
