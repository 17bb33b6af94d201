//! Elasticsearch result sink
//!
//! Bulk-indexes classified commit records through the `_bulk` API using
//! ureq (sync HTTP, no async runtime needed). A batch either lands whole or
//! surfaces as one aggregate failure; callers decide whether that failure
//! is fatal.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::models::CommitRecord;

/// Errors from the document store
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("bulk request to {host} failed: {message}")]
    Request { host: String, message: String },

    #[error("bulk indexing rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("{failed} of {total} records failed to index")]
    PartialFailure { failed: usize, total: usize },

    #[error("failed to serialize commit record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Basic-auth credential pair; both parts or neither.
#[derive(Debug, Clone)]
pub struct EsCredentials {
    pub username: String,
    pub password: String,
}

/// Bulk indexer for an Elasticsearch-compatible store.
pub struct ElasticSink {
    host: String,
    index: String,
    credentials: Option<EsCredentials>,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(std::time::Duration::from_secs(60)))
        .build()
        .new_agent()
}

impl ElasticSink {
    pub fn new(
        host: impl Into<String>,
        index: impl Into<String>,
        credentials: Option<EsCredentials>,
    ) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            index: index.into(),
            credentials,
            agent: make_agent(),
        }
    }

    /// Index all records in one `_bulk` call, keyed by commit sha.
    /// Returns the number of records indexed.
    pub fn bulk_index(&self, records: &[CommitRecord]) -> Result<usize, PersistError> {
        let payload = self.bulk_payload(records)?;
        let url = format!("{}/_bulk", self.host);
        debug!("bulk indexing {} records to {url}", records.len());

        let mut request = self
            .agent
            .post(&url)
            .header("Content-Type", "application/x-ndjson");

        if let Some(creds) = &self.credentials {
            let token = BASE64.encode(format!("{}:{}", creds.username, creds.password));
            request = request.header("Authorization", &format!("Basic {token}"));
        }

        let response = request
            .send(payload.as_str())
            .map_err(|e| PersistError::Request {
                host: self.host.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(PersistError::Rejected { status, message });
        }

        let body: BulkResponse =
            response
                .into_body()
                .read_json()
                .map_err(|e| PersistError::Request {
                    host: self.host.clone(),
                    message: format!("unreadable bulk response: {e}"),
                })?;

        if body.errors {
            let failed = body
                .items
                .iter()
                .filter(|item| item.index.error.is_some())
                .count();
            return Err(PersistError::PartialFailure {
                failed: failed.max(1),
                total: records.len(),
            });
        }

        Ok(records.len())
    }

    /// Action/source NDJSON pairs for the `_bulk` endpoint.
    fn bulk_payload(&self, records: &[CommitRecord]) -> Result<String, PersistError> {
        let mut payload = String::new();
        for record in records {
            let action = json!({ "index": { "_index": self.index, "_id": record.sha } });
            payload.push_str(&serde_json::to_string(&action)?);
            payload.push('\n');
            payload.push_str(&serde_json::to_string(record)?);
            payload.push('\n');
        }
        Ok(payload)
    }
}

#[derive(Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Deserialize)]
struct BulkItem {
    #[serde(default, alias = "create")]
    index: BulkItemStatus,
}

#[derive(Deserialize, Default)]
struct BulkItemStatus {
    #[serde(default)]
    error: Option<serde_json::Value>,
}
