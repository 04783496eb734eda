//! Query sizing parameters and their bounds.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Smallest number of answers the reader may return.
pub const READER_TOP_K_MIN: u32 = 1;
/// Largest number of answers the reader may return.
pub const READER_TOP_K_MAX: u32 = 10;
/// Smallest number of documents the retriever may consider.
pub const RETRIEVER_TOP_K_MIN: u32 = 1;

/// Default number of answers shown per query.
pub const DEFAULT_NUMBER_OF_ANSWERS: u32 = 3;
/// Default number of documents requested from the retriever.
pub const DEFAULT_DOCS_FROM_RETRIEVER: u32 = 10;

/// Slider values sent with each backend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Maximum answers to return (reader stage).
    pub top_k_reader: u32,
    /// Maximum documents considered (retriever stage).
    pub top_k_retriever: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            top_k_reader: DEFAULT_NUMBER_OF_ANSWERS,
            top_k_retriever: DEFAULT_DOCS_FROM_RETRIEVER,
        }
    }
}

impl QueryParams {
    pub fn new(top_k_reader: u32, top_k_retriever: u32) -> Self {
        Self {
            top_k_reader,
            top_k_retriever,
        }
    }

    /// Returns a copy with both values pulled into their allowed ranges.
    #[must_use]
    pub fn clamped(self, limits: QueryLimits) -> Self {
        Self {
            top_k_reader: self.top_k_reader.clamp(READER_TOP_K_MIN, READER_TOP_K_MAX),
            top_k_retriever: self
                .top_k_retriever
                .clamp(RETRIEVER_TOP_K_MIN, limits.max_documents),
        }
    }
}

/// Upper bounds derived from the indexed corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    /// Number of indexed documents; never below one.
    pub max_documents: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self { max_documents: 1 }
    }
}

impl QueryLimits {
    /// Builds limits from the number of indexed segments.
    ///
    /// An empty corpus still allows a retriever bound of one so the slider
    /// range stays valid.
    pub fn from_document_count(count: usize) -> Self {
        let max_documents = u32::try_from(count).unwrap_or(u32::MAX).max(RETRIEVER_TOP_K_MIN);
        Self { max_documents }
    }

    pub fn reader_range(&self) -> RangeInclusive<u32> {
        READER_TOP_K_MIN..=READER_TOP_K_MAX
    }

    pub fn retriever_range(&self) -> RangeInclusive<u32> {
        RETRIEVER_TOP_K_MIN..=self.max_documents
    }
}
