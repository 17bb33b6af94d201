//! Worklens - commit history work classification
//!
//! Walks a git repository's commit history for a time window, classifies
//! each commit by the nature of the work it represents (new work, refactor,
//! helping others, or churn/rework), scores its efficiency, and bulk-indexes
//! the enriched records into an Elasticsearch-compatible document store.

pub mod classifier;
pub mod cli;
pub mod git;
pub mod models;
pub mod reporters;
pub mod store;
