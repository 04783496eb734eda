//! The narrow interface the front end uses to talk to the search backend.

use std::path::Path;

use pqa_model::{AnswerResult, Segment};
use serde_json::Value;

use crate::error::Result;

/// Version shown when the backend does not report one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Decoded query reply with the payload it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// Ranked answers.
    pub results: Vec<AnswerResult>,
    /// Unparsed reply body.
    pub raw: Value,
}

/// Operations offered by the semantic-search backend.
///
/// All calls block until the backend answers or the client's own timeout
/// elapses.
pub trait BackendClient: Send + Sync {
    /// Whether the backend has finished loading and accepts queries.
    fn ready(&self) -> Result<bool>;

    /// Runs a question through the retriever and reader.
    fn query(&self, question: &str, top_k_reader: u32, top_k_retriever: u32)
    -> Result<QueryResponse>;

    /// Uploads a document file for indexing.
    fn upload(&self, path: &Path) -> Result<Value>;

    /// Backend software version.
    fn version(&self) -> Result<String>;

    /// Deletes every document from the store.
    fn reset_store(&self) -> Result<bool>;

    /// Indexes policy segments into the store.
    fn index_store(&self, segments: &[Segment]) -> Result<()>;
}

/// Returns the backend version, or [`UNKNOWN_VERSION`] when it cannot be read.
pub fn version_or_unknown(backend: &dyn BackendClient) -> String {
    match backend.version() {
        Ok(version) if !version.trim().is_empty() => version,
        Ok(_) => UNKNOWN_VERSION.to_string(),
        Err(err) => {
            tracing::debug!("backend version unavailable: {err}");
            UNKNOWN_VERSION.to_string()
        }
    }
}
