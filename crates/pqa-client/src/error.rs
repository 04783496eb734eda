//! Error types for backend operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`BackendClient`](crate::BackendClient) operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    /// Request could not be sent or no response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with an error status.
    #[error("Exception: HTTP {status}, Reason: {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason text extracted from the response body.
        reason: String,
    },

    /// Reply body was not the JSON shape we expect.
    #[error("could not decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path that produced the body.
        endpoint: String,
        /// Parser message.
        message: String,
    },

    /// A file selected for upload could not be read.
    #[error("failed to read upload {path}: {message}")]
    Upload {
        /// Path of the file.
        path: PathBuf,
        /// I/O error message.
        message: String,
    },
}

impl BackendError {
    /// Returns true when the reply could not be decoded.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// HTTP status code, when the backend returned one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
