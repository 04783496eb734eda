//! Answers returned by the search backend.

use serde::{Deserialize, Serialize};

/// Backlink metadata of the document an answer came from.
///
/// Both fields are optional because the backend only fills them for
/// documents that were indexed with a title and URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DocumentMeta {
    /// Returns `(title, url)` when both are present and non-empty.
    pub fn backlink(&self) -> Option<(&str, &str)> {
        let title = self.title.as_deref().filter(|t| !t.is_empty())?;
        let url = self.url.as_deref().filter(|u| !u.is_empty())?;
        Some((title, url))
    }
}

/// One ranked answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Extracted answer span; empty when the reader found no answer.
    pub answer: String,
    /// Excerpt of the source document containing `answer`.
    pub context: String,
    /// Backend score as a percentage.
    pub relevance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_meta: Option<DocumentMeta>,
    /// Source label used when no backlink is available.
    pub fallback_source: String,
}

impl AnswerResult {
    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }
}

/// One chunk of the policy document sent to the store for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub text: String,
}

impl Segment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}
