//! Blocking HTTP implementation of [`BackendClient`].

use std::path::Path;
use std::time::Duration;

use pqa_model::Segment;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::backend::{BackendClient, QueryResponse};
use crate::error::{BackendError, Result};
use crate::wire;

/// Default backend location.
pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8000";

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const STATUS: &str = "initialized";
const QUERY: &str = "query";
const UPLOAD: &str = "file-upload";
const VERSION: &str = "hs_version";
const RESET: &str = "documents/delete_by_filters";
const INDEX: &str = "documents/index";

/// Multipart field name the upload endpoint expects.
const UPLOAD_FIELD: &str = "files";

/// Client for a Haystack-style REST backend.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(USER_AGENT, format!("policy-qa/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
    }

    /// Sends a request and returns the decoded JSON body.
    ///
    /// Error statuses become [`BackendError::Status`] with the server's
    /// reason; bodies that are not JSON become [`BackendError::Decode`].
    fn send_json(&self, endpoint: &str, request: RequestBuilder) -> Result<Value> {
        let response = self.with_headers(request).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let reason = wire::error_reason(&body);
            debug!(endpoint, status = status.as_u16(), "backend returned error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        serde_json::from_str(&body).map_err(|err| BackendError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    }
}

impl BackendClient for HttpBackend {
    fn ready(&self) -> Result<bool> {
        let response = self.with_headers(self.client.get(self.url(STATUS))).send()?;
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "readiness probe rejected");
            return Ok(false);
        }
        let ready = response
            .json::<Value>()
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        Ok(ready)
    }

    fn query(
        &self,
        question: &str,
        top_k_reader: u32,
        top_k_retriever: u32,
    ) -> Result<QueryResponse> {
        let body = wire::query_body(question, top_k_reader, top_k_retriever);
        let raw = self.send_json(QUERY, self.client.post(self.url(QUERY)).json(&body))?;
        let results = wire::decode_query_response(&raw)?;
        debug!(answers = results.len(), "decoded query response");
        Ok(QueryResponse { results, raw })
    }

    fn upload(&self, path: &Path) -> Result<Value> {
        let form = Form::new()
            .file(UPLOAD_FIELD, path)
            .map_err(|err| BackendError::Upload {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        self.send_json(UPLOAD, self.client.post(self.url(UPLOAD)).multipart(form))
    }

    fn version(&self) -> Result<String> {
        let raw = self.send_json(VERSION, self.client.get(self.url(VERSION)))?;
        wire::decode_version(&raw)
    }

    fn reset_store(&self) -> Result<bool> {
        let raw = self.send_json(
            RESET,
            self.client.post(self.url(RESET)).json(&wire::reset_body()),
        )?;
        Ok(raw.as_bool().unwrap_or(false))
    }

    fn index_store(&self, segments: &[Segment]) -> Result<()> {
        let response = self
            .with_headers(
                self.client
                    .post(self.url(INDEX))
                    .json(&wire::index_body(segments)),
            )
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let reason = wire::error_reason(&response.text().unwrap_or_default());
            return Err(BackendError::Status {
                status: status.as_u16(),
                reason,
            });
        }
        Ok(())
    }
}
