use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

use super::mappers;
use crate::dispatcher::Dispatcher;
use crate::domain::{CancellationToken, ResponseEnvelope};

/// State shared by the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// `GET /`: service identity
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "optimizer-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/problems`: registered problem types
pub async fn list_problems(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "problems": state.dispatcher.problems() }))
}

/// `POST /api/solve`: always answers with a response envelope
pub async fn solve_problem(State(state): State<AppState>, body: Bytes) -> Json<ResponseEnvelope> {
    let request = match mappers::request_from_json(&body) {
        Ok(request) => request,
        Err(envelope) => return Json(*envelope),
    };

    // A dropped request future (client gone) cancels the running solver
    let cancellation = CancellationToken::new();
    let guard = cancellation.drop_guard();
    let problem = request.problem().to_string();

    let solve = state
        .dispatcher
        .solve_with_cancellation(request, cancellation.clone());

    let envelope = match state.request_timeout {
        Some(limit) => match tokio::time::timeout(limit, solve).await {
            Ok(envelope) => envelope,
            Err(_) => {
                cancellation.cancel();
                warn!(problem = %problem, timeout_secs = limit.as_secs_f64(), "solve timed out");
                ResponseEnvelope::error(
                    problem,
                    format!("Solve timed out after {} seconds", limit.as_secs_f64()),
                )
            }
        },
        None => solve.await,
    };

    guard.disarm();
    Json(envelope)
}
