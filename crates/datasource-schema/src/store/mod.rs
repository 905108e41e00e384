//! Internal document store seam.
//!
//! Table definitions for external datasources are persisted as documents
//! in the platform's internal store. The store is revision-checked:
//! writes against a stale revision fail with a conflict (HTTP 409
//! equivalent) and must be retried against the latest revision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::table::Table;
use crate::error::{Result, SchemaError};

/// Response from a successful document write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutResponse {
    /// Document id.
    pub id: String,
    /// New document revision.
    pub rev: String,
}

/// Parameters for a ranged `all_docs` scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllDocsParams {
    /// Inclusive start of the id range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_key: Option<String>,

    /// Inclusive end of the id range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_key: Option<String>,

    /// Return full documents rather than just ids.
    #[serde(default)]
    pub include_docs: bool,
}

/// Asynchronous document store interface.
///
/// Implementations must signal revision races with
/// [`SchemaError::Conflict`] so callers can refetch and retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, id: &str) -> Result<Value>;

    /// Write a document. The document's `_rev` must match the stored
    /// revision, or the write fails with a conflict.
    async fn put(&self, doc: Value) -> Result<PutResponse>;

    /// Write a batch of documents.
    async fn bulk_docs(&self, docs: Vec<Value>) -> Result<Vec<PutResponse>>;

    /// Scan documents by id range.
    async fn all_docs(&self, params: AllDocsParams) -> Result<Vec<Value>>;
}

/// Persist a table definition, resolving a revision conflict by
/// refetching the latest revision and retrying the write exactly once.
///
/// The input table is not mutated until the write succeeds, so a failed
/// attempt leaves no partial state behind. Returns the table with its new
/// revision stamped.
pub async fn save_table(store: &dyn DocumentStore, table: &Table) -> Result<Table> {
    let id = table.id.clone().ok_or_else(|| {
        SchemaError::Config(format!("table {} has no document id", table.name))
    })?;

    let mut attempt = table.clone();
    match store.put(serde_json::to_value(&attempt)?).await {
        Ok(response) => {
            attempt.rev = Some(response.rev);
            Ok(attempt)
        }
        Err(err) if err.is_conflict() => {
            warn!(table = %table.name, "table write conflict, refetching and retrying");
            let latest = store.get(&id).await?;
            let latest: Table = serde_json::from_value(latest)?;
            attempt.rev = latest.rev;
            let response = store.put(serde_json::to_value(&attempt)?).await?;
            attempt.rev = Some(response.rev);
            Ok(attempt)
        }
        Err(err) => Err(err),
    }
}
