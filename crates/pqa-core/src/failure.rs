//! Failure taxonomy shown to the user after a cycle.

use pqa_client::BackendError;
use thiserror::Error;

/// Substrings in a backend error that mean "overloaded, come back later".
pub const BUSY_MARKERS: &[&str] = &["The server is busy processing requests", "503"];

/// Why a cycle ended in the `Failed` phase.
///
/// Backend errors never leave the controller; they are turned into one of
/// these and shown as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryFailure {
    /// Reply could not be decoded.
    #[error("backend reply could not be decoded")]
    Decode,
    /// Backend signalled overload.
    #[error("backend is busy")]
    ServiceBusy,
    /// Any other query failure.
    #[error("query request failed")]
    Generic,
    /// Readiness probe failed; no query was attempted.
    #[error("backend is not ready")]
    BackendUnavailable,
}

impl QueryFailure {
    /// Classifies a failed query.
    pub fn classify(err: &BackendError) -> Self {
        if err.is_decode() {
            return Self::Decode;
        }
        let text = err.to_string();
        if BUSY_MARKERS.iter().any(|marker| text.contains(marker)) {
            Self::ServiceBusy
        } else {
            Self::Generic
        }
    }

    /// Message shown in place of results.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode => {
                "An error occurred reading the results. Cannot access the document store!"
            }
            Self::ServiceBusy => "All our workers are busy! Try again later.",
            Self::Generic => "An error occurred during the request.",
            Self::BackendUnavailable => {
                "Connection Error. Cannot access the question answering API!"
            }
        }
    }
}
