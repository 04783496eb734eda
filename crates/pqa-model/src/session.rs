//! Per-session interaction state.
//!
//! The front end rebuilds its whole view after every interaction, so
//! everything that must survive between two interactions lives here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::answer::AnswerResult;
use crate::params::QueryParams;

/// Question shown when a session starts.
pub const DEFAULT_QUESTION_AT_STARTUP: &str = "How do you collect my data?";
/// Answer label paired with [`DEFAULT_QUESTION_AT_STARTUP`].
pub const DEFAULT_ANSWER_AT_STARTUP: &str = "Website";

/// Opaque key identifying one user session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a fresh random session key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values a new session is initialized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    pub question: String,
    pub answer: Option<String>,
    pub params: QueryParams,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            question: DEFAULT_QUESTION_AT_STARTUP.to_string(),
            answer: Some(DEFAULT_ANSWER_AT_STARTUP.to_string()),
            params: QueryParams::default(),
        }
    }
}

/// Decoded results kept together with the payload they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub results: Vec<AnswerResult>,
    pub raw: Value,
}

/// State of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Question currently in the search bar.
    pub question: String,
    /// Label of a sampled example question, if any.
    pub answer: Option<String>,
    /// Results and raw payload; one option so they can only be set or
    /// cleared as a pair.
    response: Option<ResultSet>,
    /// Set by a random-sample action, cleared at the start of the next cycle.
    pub random_requested: bool,
    /// Slider values seen in the last cycle.
    pub params: QueryParams,
    /// Request version stamped at the start of every cycle.
    pub version: u64,
}

impl SessionState {
    pub fn from_defaults(defaults: &SessionDefaults) -> Self {
        Self {
            question: defaults.question.clone(),
            answer: defaults.answer.clone(),
            response: None,
            random_requested: false,
            params: defaults.params,
            version: 0,
        }
    }

    pub fn results(&self) -> Option<&[AnswerResult]> {
        self.response.as_ref().map(|r| r.results.as_slice())
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.response.as_ref().map(|r| &r.raw)
    }

    /// True when at least one result is stored.
    pub fn has_results(&self) -> bool {
        self.results().is_some_and(|r| !r.is_empty())
    }

    pub fn set_results(&mut self, results: Vec<AnswerResult>, raw: Value) {
        self.response = Some(ResultSet { results, raw });
    }

    pub fn clear_results(&mut self) {
        self.response = None;
    }

    /// Drops everything tied to the previous question.
    pub fn reset_results(&mut self) {
        self.answer = None;
        self.clear_results();
    }

    /// Advances the request version and returns the new stamp.
    pub fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }
}
