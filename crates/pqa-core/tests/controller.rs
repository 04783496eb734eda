//! Interaction cycle tests against an in-memory backend.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use pqa_client::{BackendClient, BackendError, QueryResponse};
use pqa_core::{Interaction, Phase, QueryController, QueryFailure, RandomSampler, SessionStore};
use pqa_model::{
    AnswerResult, DatasetRow, QueryLimits, QueryParams, Segment, SessionDefaults, SessionId,
};
use serde_json::{Value, json};

type Reply = pqa_client::Result<QueryResponse>;

#[derive(Default)]
struct FakeBackend {
    ready: Mutex<Option<pqa_client::Result<bool>>>,
    replies: Mutex<VecDeque<Reply>>,
    queries: Mutex<Vec<(String, u32, u32)>>,
    /// Session whose version is bumped while a query is in flight.
    interleave: Option<(Arc<SessionStore>, SessionId)>,
    /// Question whose query blocks until the test releases it.
    held: Option<(String, Arc<Barrier>)>,
}

impl FakeBackend {
    fn set_ready(&self, ready: pqa_client::Result<bool>) {
        *self.ready.lock().unwrap() = Some(ready);
    }

    fn push_reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn queries(&self) -> Vec<(String, u32, u32)> {
        self.queries.lock().unwrap().clone()
    }
}

impl BackendClient for FakeBackend {
    fn ready(&self) -> pqa_client::Result<bool> {
        self.ready.lock().unwrap().clone().unwrap_or(Ok(true))
    }

    fn query(&self, question: &str, top_k_reader: u32, top_k_retriever: u32) -> Reply {
        self.queries
            .lock()
            .unwrap()
            .push((question.to_string(), top_k_reader, top_k_retriever));
        if let Some((store, id)) = &self.interleave {
            store.update(id, |state| {
                state.next_version();
            });
        }
        if let Some((held, gate)) = &self.held
            && held == question
        {
            // One wait to signal the query started, one to be released.
            gate.wait();
            gate.wait();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(gdpr_response()))
    }

    fn upload(&self, _path: &Path) -> pqa_client::Result<Value> {
        Ok(json!({}))
    }

    fn version(&self) -> pqa_client::Result<String> {
        Ok("1.0.0".to_string())
    }

    fn reset_store(&self) -> pqa_client::Result<bool> {
        Ok(true)
    }

    fn index_store(&self, _segments: &[Segment]) -> pqa_client::Result<()> {
        Ok(())
    }
}

fn gdpr_response() -> QueryResponse {
    QueryResponse {
        results: vec![AnswerResult {
            answer: "GDPR".to_string(),
            context: "...We comply with GDPR rules...".to_string(),
            relevance: 87.5,
            document_meta: None,
            fallback_source: "policy.txt".to_string(),
        }],
        raw: json!({"answers": [{"answer": "GDPR"}]}),
    }
}

fn params() -> QueryParams {
    QueryParams::new(3, 10)
}

fn controller_with(backend: FakeBackend, store: Arc<SessionStore>) -> QueryController<FakeBackend> {
    let sampler = RandomSampler::new(vec![
        DatasetRow::new("Q1", "A1"),
        DatasetRow::new("Q2", "A2"),
    ])
    .unwrap();
    QueryController::new(backend, sampler, store)
        .with_limits(QueryLimits::from_document_count(20))
        .with_defaults(SessionDefaults {
            question: "Q1".to_string(),
            answer: Some("A1".to_string()),
            params: params(),
        })
}

fn controller() -> QueryController<FakeBackend> {
    controller_with(FakeBackend::default(), Arc::new(SessionStore::new()))
}

#[test]
fn run_action_queries_and_displays_results() {
    let controller = controller();
    let id = SessionId::new("s");

    let outcome = controller.handle(&id, &Interaction::new("Q1", params()).with_run());

    assert_eq!(outcome.phase, Phase::Displaying);
    assert!(outcome.query_attempted);
    assert!(!outcome.stale);
    assert_eq!(outcome.state.results().map(<[_]>::len), Some(1));
    assert!(outcome.state.raw_response().is_some());
    assert_eq!(controller.backend().queries(), vec![("Q1".to_string(), 3, 10)]);
}

#[test]
fn untouched_session_stays_idle() {
    let controller = controller();
    let outcome = controller.handle(&SessionId::new("s"), &Interaction::new("Q1", params()));

    assert_eq!(outcome.phase, Phase::Idle);
    assert!(!outcome.query_attempted);
    assert!(controller.backend().queries().is_empty());
}

#[test]
fn changed_question_runs_without_run_action() {
    let controller = controller();
    let id = SessionId::new("s");

    let outcome = controller.handle(&id, &Interaction::new("Do you sell my data?", params()));

    assert_eq!(outcome.phase, Phase::Displaying);
    assert_eq!(outcome.state.question, "Do you sell my data?");
    assert_eq!(controller.backend().queries().len(), 1);
}

#[test]
fn question_change_clears_previous_results() {
    let controller = controller();
    let id = SessionId::new("s");
    controller.handle(&id, &Interaction::new("Q1", params()).with_run());

    let outcome = controller.handle(&id, &Interaction::new("", params()));

    assert_eq!(outcome.phase, Phase::Idle);
    assert!(outcome.state.results().is_none());
    assert!(outcome.state.raw_response().is_none());
    assert_eq!(controller.backend().queries().len(), 1);
}

#[test]
fn failed_query_after_question_change_leaves_no_results() {
    let controller = controller();
    let id = SessionId::new("s");
    controller.handle(&id, &Interaction::new("Q1", params()).with_run());
    controller
        .backend()
        .push_reply(Err(BackendError::Network("connection reset".to_string())));

    let outcome = controller.handle(&id, &Interaction::new("Do you share data?", params()));

    assert_eq!(outcome.failure(), Some(QueryFailure::Generic));
    assert!(outcome.state.results().is_none());
    assert!(outcome.state.raw_response().is_none());
}

#[test]
fn staging_a_random_question_never_queries() {
    let controller = controller();
    let id = SessionId::new("s");
    let mut phases = Vec::new();

    let outcome = controller.handle_observed(
        &id,
        &Interaction::new("Q1", params()).with_random().with_run(),
        |phase| phases.push(phase),
    );

    assert_eq!(outcome.phase, Phase::PendingRun);
    assert!(!outcome.query_attempted);
    assert!(phases.is_empty());
    assert!(controller.backend().queries().is_empty());
    assert_eq!(outcome.state.question, "Q2");
    assert_eq!(outcome.state.answer.as_deref(), Some("A2"));
    assert!(outcome.state.random_requested);
    assert!(outcome.state.results().is_none());
}

#[test]
fn staged_question_waits_for_an_explicit_run() {
    let controller = controller();
    let id = SessionId::new("s");
    controller.handle(&id, &Interaction::new("Q1", params()).with_random());

    let follow_up = controller.handle(&id, &Interaction::new("Q2", params()));
    assert!(!follow_up.query_attempted);
    assert!(!follow_up.state.random_requested);
    assert_eq!(follow_up.state.answer.as_deref(), Some("A2"));

    let run = controller.handle(&id, &Interaction::new("Q2", params()).with_run());
    assert_eq!(run.phase, Phase::Displaying);
    assert_eq!(controller.backend().queries(), vec![("Q2".to_string(), 3, 10)]);
}

#[test]
fn unready_backend_fails_regardless_of_triggers() {
    let controller = controller();
    let id = SessionId::new("s");
    controller.handle(&id, &Interaction::new("Q1", params()).with_run());
    controller.backend().set_ready(Ok(false));

    for interaction in [
        Interaction::new("Q1", params()).with_run(),
        Interaction::new("Q1", params()).with_random(),
        Interaction::new("Something new", params()),
    ] {
        let outcome = controller.handle(&id, &interaction);
        assert_eq!(outcome.failure(), Some(QueryFailure::BackendUnavailable));
        assert!(outcome.state.results().is_none());
        assert!(!outcome.query_attempted);
    }
    assert_eq!(controller.backend().queries().len(), 1);
}

#[test]
fn failing_readiness_probe_counts_as_unavailable() {
    let controller = controller();
    controller
        .backend()
        .set_ready(Err(BackendError::Network("connection refused".to_string())));

    let outcome = controller.handle(&SessionId::new("s"), &Interaction::new("Q1", params()).with_run());

    assert_eq!(outcome.failure(), Some(QueryFailure::BackendUnavailable));
    assert!(controller.backend().queries().is_empty());
}

#[test]
fn status_503_is_reported_as_busy() {
    let controller = controller();
    controller.backend().push_reply(Err(BackendError::Status {
        status: 503,
        reason: "Service Unavailable".to_string(),
    }));

    let outcome = controller.handle(&SessionId::new("s"), &Interaction::new("Q1", params()).with_run());

    assert_eq!(outcome.failure(), Some(QueryFailure::ServiceBusy));
    insta::assert_snapshot!(outcome.notice().unwrap_or_default(), @"All our workers are busy! Try again later.");
}

#[test]
fn undecodable_reply_is_a_decode_failure() {
    let controller = controller();
    controller.backend().push_reply(Err(BackendError::Decode {
        endpoint: "query".to_string(),
        message: "expected value at line 1 column 1".to_string(),
    }));

    let outcome = controller.handle(&SessionId::new("s"), &Interaction::new("Q1", params()).with_run());

    assert_eq!(outcome.failure(), Some(QueryFailure::Decode));
    assert!(outcome.state.results().is_none());
}

#[test]
fn failures_are_not_retried() {
    let controller = controller();
    controller.backend().push_reply(Err(BackendError::Status {
        status: 503,
        reason: "The server is busy processing requests".to_string(),
    }));

    controller.handle(&SessionId::new("s"), &Interaction::new("Q1", params()).with_run());

    assert_eq!(controller.backend().queries().len(), 1);
}

#[test]
fn slider_change_clears_results_without_querying() {
    let controller = controller();
    let id = SessionId::new("s");
    controller.handle(&id, &Interaction::new("Q1", params()).with_run());

    let outcome = controller.handle(&id, &Interaction::new("Q1", QueryParams::new(5, 10)));

    assert_eq!(outcome.phase, Phase::Idle);
    assert!(outcome.state.results().is_none());
    assert_eq!(outcome.state.params, QueryParams::new(5, 10));
    assert_eq!(controller.backend().queries().len(), 1);
}

#[test]
fn query_params_are_clamped_to_their_ranges() {
    let controller = controller();

    controller.handle(
        &SessionId::new("s"),
        &Interaction::new("Q1", QueryParams::new(42, 500)).with_run(),
    );

    assert_eq!(controller.backend().queries(), vec![("Q1".to_string(), 10, 20)]);
}

#[test]
fn stale_response_is_discarded() {
    let store = Arc::new(SessionStore::new());
    let id = SessionId::new("s");
    let backend = FakeBackend {
        interleave: Some((Arc::clone(&store), id.clone())),
        ..FakeBackend::default()
    };
    let controller = controller_with(backend, Arc::clone(&store));

    let outcome = controller.handle(&id, &Interaction::new("Q1", params()).with_run());

    assert!(outcome.stale);
    assert!(outcome.query_attempted);
    assert_eq!(outcome.phase, Phase::Idle);
    assert!(outcome.state.results().is_none());
}

#[test]
fn running_is_reported_before_the_query() {
    let controller = controller();
    let mut phases = Vec::new();

    controller.handle_observed(
        &SessionId::new("s"),
        &Interaction::new("Q1", params()).with_run(),
        |phase| phases.push(phase),
    );

    assert_eq!(phases, vec![Phase::Running]);
}

#[test]
fn sessions_do_not_share_state() {
    let controller = controller();
    let a = SessionId::new("a");
    let b = SessionId::new("b");

    controller.handle(&a, &Interaction::new("Q1", params()).with_run());
    let other = controller.handle(&b, &Interaction::new("Q1", params()));

    assert!(other.state.results().is_none());
    assert_eq!(controller.store().len(), 2);
}

fn cookies_response() -> QueryResponse {
    QueryResponse {
        results: vec![AnswerResult {
            answer: "Cookies".to_string(),
            context: "...We use Cookies to remember you...".to_string(),
            relevance: 64.0,
            document_meta: None,
            fallback_source: "policy.txt".to_string(),
        }],
        raw: json!({"answers": [{"answer": "Cookies"}]}),
    }
}

fn held_controller(question: &str, gate: &Arc<Barrier>) -> QueryController<FakeBackend> {
    let backend = FakeBackend {
        held: Some((question.to_string(), Arc::clone(gate))),
        ..FakeBackend::default()
    };
    controller_with(backend, Arc::new(SessionStore::new()))
}

#[test]
fn newer_cycle_wins_over_a_reply_still_in_flight() {
    let gate = Arc::new(Barrier::new(2));
    let controller = held_controller("Do you sell my data?", &gate);
    controller.backend().push_reply(Ok(cookies_response()));
    let id = SessionId::new("s");
    let initial = controller.session(&id).version;

    let (slow, fast) = thread::scope(|scope| {
        let slow = scope.spawn(|| {
            controller.handle(&id, &Interaction::new("Do you sell my data?", params()).with_run())
        });
        gate.wait();
        let fast =
            controller.handle(&id, &Interaction::new("Do you use cookies?", params()).with_run());
        gate.wait();
        (slow.join().unwrap(), fast)
    });

    assert!(!fast.stale);
    assert_eq!(fast.phase, Phase::Displaying);
    assert!(slow.stale);
    assert!(slow.query_attempted);
    assert_eq!(slow.phase, Phase::Displaying);

    assert_eq!(fast.state.version, initial + 2);
    assert_eq!(slow.state.version, fast.state.version);

    let current = controller.session(&id);
    assert_eq!(current.version, fast.state.version);
    assert_eq!(current.question, "Do you use cookies?");
    assert_eq!(
        current.results().map(|results| results[0].answer.as_str()),
        Some("Cookies")
    );
    assert_eq!(controller.backend().queries().len(), 2);
}

#[test]
fn stale_reply_after_a_random_stage_stays_pending() {
    let gate = Arc::new(Barrier::new(2));
    let controller = held_controller("Do you sell my data?", &gate);
    let id = SessionId::new("s");

    let (slow, staged) = thread::scope(|scope| {
        let slow = scope.spawn(|| {
            controller.handle(&id, &Interaction::new("Do you sell my data?", params()).with_run())
        });
        gate.wait();
        let staged = controller.handle(
            &id,
            &Interaction::new("Do you sell my data?", params()).with_random(),
        );
        gate.wait();
        (slow.join().unwrap(), staged)
    });

    assert_eq!(staged.phase, Phase::PendingRun);
    assert!(slow.stale);
    assert_eq!(slow.phase, Phase::PendingRun);
    assert!(slow.state.results().is_none());
    assert_eq!(controller.backend().queries().len(), 1);
}

#[test]
fn clearing_the_question_goes_idle_without_querying() {
    let controller = controller();
    let id = SessionId::new("s");

    let outcome = controller.handle(&id, &Interaction::new("", params()).with_run());

    assert_eq!(outcome.phase, Phase::Idle);
    assert!(!outcome.query_attempted);
    assert!(controller.backend().queries().is_empty());
    assert_eq!(outcome.state.question, "Q1");
}
