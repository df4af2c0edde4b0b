use futures::future::join_all;
use optimizer_service::problems::EchoSolver;
use optimizer_service::{
    CancellationToken, Dispatcher, EnvelopeStatus, Payload, ProblemRequest, ProblemSolver,
    RegistryError, SolveContext, SolveError, SolverRegistry,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct FailingSolver;

impl ProblemSolver for FailingSolver {
    fn solve(&self, _payload: &Payload, _ctx: &SolveContext) -> Result<Value, SolveError> {
        Err(SolveError::invalid("field `weights` is required"))
    }

    fn description(&self) -> &str {
        "Always rejects its payload"
    }
}

struct PanickingSolver;

impl ProblemSolver for PanickingSolver {
    fn solve(&self, _payload: &Payload, _ctx: &SolveContext) -> Result<Value, SolveError> {
        panic!("index out of bounds in model builder");
    }

    fn description(&self) -> &str {
        "Faults unexpectedly"
    }
}

struct CooperativeSolver;

impl ProblemSolver for CooperativeSolver {
    fn solve(&self, _payload: &Payload, ctx: &SolveContext) -> Result<Value, SolveError> {
        ctx.checkpoint()?;
        Ok(json!({"finished": true}))
    }

    fn description(&self) -> &str {
        "Checks for cancellation before working"
    }
}

fn dispatcher() -> Dispatcher {
    let registry = SolverRegistry::builder()
        .register("echo", Arc::new(EchoSolver))
        .unwrap()
        .register("failing", Arc::new(FailingSolver))
        .unwrap()
        .register("panicking", Arc::new(PanickingSolver))
        .unwrap()
        .register("cooperative", Arc::new(CooperativeSolver))
        .unwrap()
        .build();
    Dispatcher::new(Arc::new(registry))
}

fn request(problem: &str, data: Value) -> ProblemRequest {
    ProblemRequest::new(problem, data.as_object().cloned().unwrap_or_default())
}

#[tokio::test]
async fn echo_returns_payload_unchanged() {
    let envelope = dispatcher().solve(request("echo", json!({"x": 1}))).await;

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({"status": "success", "problem": "echo", "data": {"x": 1}})
    );
}

#[tokio::test]
async fn unknown_problem_is_an_error_envelope() {
    let envelope = dispatcher().solve(request("sudoku", json!({}))).await;

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "status": "error",
            "problem": "sudoku",
            "message": "Unknown problem type: sudoku"
        })
    );
}

#[tokio::test]
async fn unknown_problem_message_ignores_payload() {
    let dispatcher = dispatcher();
    for data in [json!({}), json!({"grid": [[0]]}), json!({"nested": {"a": [1, 2]}})] {
        let envelope = dispatcher.solve(request("knapsack", data)).await;
        assert_eq!(envelope.status(), EnvelopeStatus::Error);
        assert_eq!(envelope.message(), Some("Unknown problem type: knapsack"));
    }
}

#[tokio::test]
async fn lookup_is_case_sensitive() {
    let envelope = dispatcher().solve(request("Echo", json!({}))).await;
    assert_eq!(envelope.message(), Some("Unknown problem type: Echo"));
}

#[tokio::test]
async fn empty_identifier_is_rejected() {
    let envelope = dispatcher().solve(request("", json!({}))).await;
    assert_eq!(envelope.status(), EnvelopeStatus::Error);
    assert_eq!(
        envelope.message(),
        Some("Problem identifier must not be empty")
    );
}

#[tokio::test]
async fn solver_failure_is_forwarded_verbatim() {
    let envelope = dispatcher().solve(request("failing", json!({}))).await;

    assert_eq!(envelope.problem(), "failing");
    assert_eq!(envelope.message(), Some("field `weights` is required"));
    assert!(envelope.correlation_id().is_none());
}

#[tokio::test]
async fn solver_panic_becomes_internal_error() {
    let envelope = dispatcher().solve(request("panicking", json!({}))).await;

    assert_eq!(envelope.status(), EnvelopeStatus::Error);
    let correlation_id = envelope.correlation_id().expect("fault carries a reference");
    let message = envelope.message().unwrap();
    assert!(message.contains(correlation_id));
    assert!(!message.contains("index out of bounds"));
}

#[tokio::test]
async fn dispatcher_keeps_serving_after_a_fault() {
    let dispatcher = dispatcher();
    dispatcher.solve(request("panicking", json!({}))).await;

    let envelope = dispatcher.solve(request("echo", json!({"still": "alive"}))).await;
    assert!(envelope.is_success());
}

#[tokio::test]
async fn cancelled_token_reaches_the_solver() {
    let token = CancellationToken::new();
    token.cancel();

    let envelope = dispatcher()
        .solve_with_cancellation(request("cooperative", json!({})), token)
        .await;

    assert_eq!(envelope.message(), Some("Solve cancelled"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_independent() {
    let dispatcher = dispatcher();

    let envelopes = join_all((0..32).map(|i| {
        let dispatcher = dispatcher.clone();
        async move { dispatcher.solve(request("echo", json!({"n": i}))).await }
    }))
    .await;

    for (i, envelope) in envelopes.iter().enumerate() {
        assert_eq!(envelope.data(), Some(&json!({"n": i})));
    }
}

#[test]
fn duplicate_registration_prevents_startup() {
    let result = SolverRegistry::builder()
        .register("fertilizer", Arc::new(EchoSolver))
        .and_then(|builder| builder.register("fertilizer", Arc::new(FailingSolver)));

    match result {
        Err(RegistryError::DuplicateProblem(problem)) => assert_eq!(problem, "fertilizer"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("duplicate registration was accepted"),
    }
}

#[test]
fn problem_listing_is_sorted_with_descriptions() {
    let problems = dispatcher().problems();
    let names: Vec<&str> = problems.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, vec!["cooperative", "echo", "failing", "panicking"]);
    assert_eq!(problems[1].description, "Returns the payload unchanged");
}
