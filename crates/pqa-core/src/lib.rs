//! Interaction controller for the policy QA front end.
//!
//! The front end rebuilds its whole view after every user action. Everything
//! that must survive between actions lives in a [`SessionStore`], and each
//! action is one [`QueryController`] cycle that decides whether to query the
//! backend, stages random example questions and classifies failures.
//! [`highlight`] and [`resolve`] prepare results for display.

pub mod controller;
pub mod failure;
pub mod highlight;
pub mod sampler;
pub mod session_store;
pub mod source;

pub use controller::{CycleOutcome, Interaction, Phase, QueryController};
pub use failure::{BUSY_MARKERS, QueryFailure};
pub use highlight::{ANSWER_LABEL, Highlight, highlight};
pub use sampler::{RandomSampler, SamplerError};
pub use session_store::SessionStore;
pub use source::resolve;
