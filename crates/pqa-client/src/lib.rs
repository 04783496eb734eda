//! Client side of the semantic-search backend.
//!
//! The front end only ever talks to the backend through [`BackendClient`].
//! [`HttpBackend`] implements it over the backend's REST API with a blocking
//! `reqwest` client; tests substitute in-memory doubles.
//!
//! Replies are validated into typed results at this boundary (see [`wire`]),
//! and every failure is reported as a [`BackendError`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod error;
mod http;
pub mod wire;

pub use backend::{BackendClient, QueryResponse, UNKNOWN_VERSION, version_or_unknown};
pub use error::{BackendError, Result};
pub use http::{DEFAULT_API_ENDPOINT, DEFAULT_REQUEST_TIMEOUT, HttpBackend};
