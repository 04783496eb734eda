//! JSON shapes exchanged with the search backend.
//!
//! Replies are validated here and turned into [`AnswerResult`]s; nothing
//! past this module looks at raw backend fields.

use pqa_model::{AnswerResult, DocumentMeta, Segment};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{BackendError, Result};

/// Marker wrapped around every context excerpt.
pub const CONTEXT_ELLIPSIS: &str = "...";

#[derive(Debug, Default, Deserialize)]
struct WireMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAnswer {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    meta: WireMeta,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    id: String,
    #[serde(default)]
    meta: WireMeta,
}

#[derive(Debug, Deserialize)]
struct WireQueryResponse {
    #[serde(default)]
    answers: Vec<WireAnswer>,
    #[serde(default)]
    documents: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireVersion {
    hs_version: String,
}

/// Request body for `POST /query`.
pub fn query_body(question: &str, top_k_reader: u32, top_k_retriever: u32) -> Value {
    json!({
        "query": question,
        "params": {
            "Retriever": {"top_k": top_k_retriever},
            "Reader": {"top_k": top_k_reader},
        },
    })
}

/// Request body for `POST /documents/index`.
pub fn index_body(segments: &[Segment]) -> Value {
    Value::Array(
        segments
            .iter()
            .map(|segment| json!({"content": segment.text, "meta": {"name": segment.id}}))
            .collect(),
    )
}

/// Request body for `POST /documents/delete_by_filters` (delete everything).
pub fn reset_body() -> Value {
    json!({"filters": {}})
}

fn relevance(score: Option<f64>) -> f64 {
    (score.unwrap_or(0.0) * 10_000.0).round() / 100.0
}

/// Decodes a query reply into ranked results.
///
/// Answers with text get their excerpt framed in ellipses and their document
/// backlink resolved from `documents`; answers without text are kept as
/// no-answer results so their relevance can still be shown.
pub fn decode_query_response(raw: &Value) -> Result<Vec<AnswerResult>> {
    let reply: WireQueryResponse =
        serde_json::from_value(raw.clone()).map_err(|err| BackendError::Decode {
            endpoint: "query".to_string(),
            message: err.to_string(),
        })?;

    let WireQueryResponse { answers, documents } = reply;
    let results = answers
        .into_iter()
        .map(|answer| {
            let score = relevance(answer.score);
            match answer.answer.filter(|text| !text.is_empty()) {
                Some(text) => {
                    let document_meta = answer.document_id.as_deref().and_then(|id| {
                        documents.iter().find(|doc| doc.id == id).map(|doc| {
                            DocumentMeta {
                                title: doc.meta.title.clone(),
                                url: doc.meta.url.clone(),
                            }
                        })
                    });
                    AnswerResult {
                        answer: text,
                        context: format!(
                            "{CONTEXT_ELLIPSIS}{}{CONTEXT_ELLIPSIS}",
                            answer.context.unwrap_or_default()
                        ),
                        relevance: score,
                        document_meta,
                        fallback_source: answer.meta.name.unwrap_or_default(),
                    }
                }
                None => AnswerResult {
                    answer: String::new(),
                    context: String::new(),
                    relevance: score,
                    document_meta: None,
                    fallback_source: String::new(),
                },
            }
        })
        .collect();
    Ok(results)
}

/// Extracts the version string from a `GET /hs_version` reply.
pub fn decode_version(raw: &Value) -> Result<String> {
    serde_json::from_value::<WireVersion>(raw.clone())
        .map(|v| v.hs_version)
        .map_err(|err| BackendError::Decode {
            endpoint: "hs_version".to_string(),
            message: err.to_string(),
        })
}

/// Pulls a readable reason out of an error body.
///
/// Handles `{"errors": [...]}` and `{"detail": ...}` replies and falls back
/// to the body text itself.
pub fn error_reason(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            let joined: Vec<String> = errors
                .iter()
                .map(|e| e.as_str().map_or_else(|| e.to_string(), str::to_string))
                .collect();
            if !joined.is_empty() {
                return joined.join(", ");
            }
        }
        if let Some(detail) = value.get("detail") {
            return detail
                .as_str()
                .map_or_else(|| detail.to_string(), str::to_string);
        }
    }
    body.trim().to_string()
}
