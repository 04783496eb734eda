//! Interaction cycle state machine.
//!
//! Every user action produces one [`Interaction`]. [`QueryController::handle`]
//! turns it into a [`CycleOutcome`] by applying, in order:
//!
//! 1. input change: a new question clears the previous results, except in the
//!    cycle right after a random sample
//! 2. random sample: the sampled question is staged, never run in the same cycle
//! 3. readiness: an unready backend fails the cycle before anything runs
//! 4. run decision: run action or changed question, non-empty, not staged
//! 5. execution: one backend query, failures classified into [`QueryFailure`]
//!
//! The session lock is held while deciding and while writing the reply back,
//! but not during the backend query. Each cycle stamps a new session version
//! and a reply is only written if the version is still current.

use std::sync::Arc;

use pqa_client::BackendClient;
use pqa_model::{QueryLimits, QueryParams, SessionDefaults, SessionId, SessionState};
use tracing::{debug, error, info, warn};

use crate::failure::QueryFailure;
use crate::sampler::RandomSampler;
use crate::session_store::SessionStore;

/// Controller phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to show and nothing pending.
    Idle,
    /// A question is waiting to be run.
    PendingRun,
    /// Backend query in flight.
    Running,
    /// Results are available.
    Displaying,
    Failed(QueryFailure),
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Text currently in the search bar.
    pub question: String,
    /// Run button pressed.
    pub run: bool,
    /// Random question button pressed.
    pub random: bool,
    /// Slider values.
    pub params: QueryParams,
}

impl Interaction {
    /// Question submitted with the given slider values and no button pressed.
    pub fn new(question: impl Into<String>, params: QueryParams) -> Self {
        Self {
            question: question.into(),
            run: false,
            random: false,
            params,
        }
    }

    #[must_use]
    pub fn with_run(mut self) -> Self {
        self.run = true;
        self
    }

    #[must_use]
    pub fn with_random(mut self) -> Self {
        self.random = true;
        self
    }
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub phase: Phase,
    /// Whether the backend query was called.
    pub query_attempted: bool,
    /// The reply arrived after a newer cycle started and was dropped.
    pub stale: bool,
    /// Session state after the cycle, for rendering.
    pub state: SessionState,
}

impl CycleOutcome {
    fn settled(phase: Phase, state: &SessionState) -> Self {
        Self {
            phase,
            query_attempted: false,
            stale: false,
            state: state.clone(),
        }
    }

    pub fn failure(&self) -> Option<QueryFailure> {
        match self.phase {
            Phase::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Message to show in place of results, if the cycle failed.
    pub fn notice(&self) -> Option<&'static str> {
        self.failure().map(|failure| failure.user_message())
    }
}

enum Decision {
    Settled(CycleOutcome),
    Execute { version: u64, question: String },
}

/// Phase of a cycle that ends without a reply to write.
///
/// `pending` is set when a non-empty question is waiting for the run action.
fn resting_phase(state: &SessionState, pending: bool) -> Phase {
    if state.results().is_some() {
        Phase::Displaying
    } else if pending {
        Phase::PendingRun
    } else {
        Phase::Idle
    }
}

/// Ties the session store, sampler and backend together.
pub struct QueryController<B> {
    backend: B,
    sampler: RandomSampler,
    store: Arc<SessionStore>,
    defaults: SessionDefaults,
    limits: QueryLimits,
}

impl<B: BackendClient> QueryController<B> {
    pub fn new(backend: B, sampler: RandomSampler, store: Arc<SessionStore>) -> Self {
        Self {
            backend,
            sampler,
            store,
            defaults: SessionDefaults::default(),
            limits: QueryLimits::default(),
        }
    }

    /// Sets the values new sessions start from.
    #[must_use]
    pub fn with_defaults(mut self, mut defaults: SessionDefaults) -> Self {
        defaults.params = defaults.params.clamped(self.limits);
        self.defaults = defaults;
        self
    }

    /// Sets the query bounds derived from the indexed corpus.
    #[must_use]
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self.defaults.params = self.defaults.params.clamped(limits);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sampler(&self) -> &RandomSampler {
        &self.sampler
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn defaults(&self) -> &SessionDefaults {
        &self.defaults
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Current state of a session, created from the defaults if new.
    pub fn session(&self, session: &SessionId) -> SessionState {
        self.store.get_or_create(session, &self.defaults)
    }

    /// Runs one interaction cycle.
    pub fn handle(&self, session: &SessionId, interaction: &Interaction) -> CycleOutcome {
        self.handle_observed(session, interaction, |_| {})
    }

    /// Runs one interaction cycle, reporting [`Phase::Running`] to
    /// `on_phase` right before the backend query is sent.
    pub fn handle_observed(
        &self,
        session: &SessionId,
        interaction: &Interaction,
        mut on_phase: impl FnMut(Phase),
    ) -> CycleOutcome {
        let params = interaction.params.clamped(self.limits);
        let ready = self.probe_ready();
        let decision = self.store.with_session(session, &self.defaults, |state| {
            self.decide(state, interaction, params, ready)
        });

        match decision {
            Decision::Settled(outcome) => {
                debug!(session = %session, phase = ?outcome.phase, "cycle settled without query");
                outcome
            }
            Decision::Execute { version, question } => {
                on_phase(Phase::Running);
                self.execute(session, version, &question, params)
            }
        }
    }

    fn probe_ready(&self) -> bool {
        match self.backend.ready() {
            Ok(ready) => ready,
            Err(err) => {
                warn!("readiness probe failed: {err}");
                false
            }
        }
    }

    fn decide(
        &self,
        state: &mut SessionState,
        interaction: &Interaction,
        params: QueryParams,
        ready: bool,
    ) -> Decision {
        let version = state.next_version();
        let after_random = std::mem::take(&mut state.random_requested);
        let question_changed = interaction.question != state.question;

        if question_changed && !after_random {
            debug!(version, "question changed, clearing results");
            state.reset_results();
        }

        if params != state.params {
            debug!(
                version,
                top_k_reader = params.top_k_reader,
                top_k_retriever = params.top_k_retriever,
                "query parameters changed, clearing results"
            );
            state.reset_results();
            state.params = params;
        }

        let staged = interaction.random;
        if staged {
            let row = self.sampler.sample(&state.question);
            state.question = row.question_text.clone();
            state.answer = Some(row.answer_label.clone());
            state.clear_results();
            state.random_requested = true;
            debug!(version, "staged random question");
        }

        if !ready {
            state.clear_results();
            return Decision::Settled(CycleOutcome::settled(
                Phase::Failed(QueryFailure::BackendUnavailable),
                state,
            ));
        }

        let run = (interaction.run || question_changed)
            && !staged
            && !interaction.question.is_empty();
        if !run {
            let pending = staged || (question_changed && !interaction.question.is_empty());
            return Decision::Settled(CycleOutcome::settled(resting_phase(state, pending), state));
        }

        state.reset_results();
        state.question = interaction.question.clone();
        Decision::Execute {
            version,
            question: interaction.question.clone(),
        }
    }

    fn execute(
        &self,
        session: &SessionId,
        version: u64,
        question: &str,
        params: QueryParams,
    ) -> CycleOutcome {
        debug!(
            session = %session,
            version,
            top_k_reader = params.top_k_reader,
            top_k_retriever = params.top_k_retriever,
            "querying backend"
        );
        let reply = self
            .backend
            .query(question, params.top_k_reader, params.top_k_retriever);

        self.store.with_session(session, &self.defaults, |state| {
            if state.version != version {
                warn!(
                    session = %session,
                    stamped = version,
                    current = state.version,
                    "discarding stale query response"
                );
                // A newer cycle that staged a random question leaves it pending.
                return CycleOutcome {
                    phase: resting_phase(state, state.random_requested),
                    query_attempted: true,
                    stale: true,
                    state: state.clone(),
                };
            }

            let phase = match reply {
                Ok(response) => {
                    info!(session = %session, answers = response.results.len(), "query completed");
                    state.set_results(response.results, response.raw);
                    Phase::Displaying
                }
                Err(err) => {
                    let failure = QueryFailure::classify(&err);
                    error!(session = %session, ?failure, "query failed: {err}");
                    state.clear_results();
                    Phase::Failed(failure)
                }
            };
            CycleOutcome {
                phase,
                query_attempted: true,
                stale: false,
                state: state.clone(),
            }
        })
    }
}
