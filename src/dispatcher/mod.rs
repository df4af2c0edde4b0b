// Problem dispatcher: routes a request to its registered solver and
// normalizes every outcome into a ResponseEnvelope.

pub mod registry;

pub use registry::{RegistryBuilder, RegistryError, SolverRegistry};

use crate::domain::{
    CancellationToken, ProblemRequest, ResponseEnvelope, SolveContext, SolveError,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemInfo {
    pub name: String,
    pub description: String,
}

/// Stateless entry point shared by all request handlers
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<SolverRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<SolverRegistry>) -> Self {
        Self { registry }
    }

    pub async fn solve(&self, request: ProblemRequest) -> ResponseEnvelope {
        self.solve_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Solve, handing `cancellation` to the solver as a cooperative signal.
    ///
    /// Always returns an envelope: unknown problems, solver failures and
    /// solver panics all come back as error envelopes.
    pub async fn solve_with_cancellation(
        &self,
        request: ProblemRequest,
        cancellation: CancellationToken,
    ) -> ResponseEnvelope {
        let (problem, payload) = request.into_parts();

        if problem.is_empty() {
            return ResponseEnvelope::error(problem, "Problem identifier must not be empty");
        }

        let Some(solver) = self.registry.get(&problem).cloned() else {
            debug!(problem = %problem, "unknown problem type");
            return ResponseEnvelope::error(
                problem.clone(),
                format!("Unknown problem type: {}", problem),
            );
        };

        let ctx = SolveContext::new(cancellation);
        let started = Instant::now();
        let outcome = tokio::task::spawn_blocking(move || solver.solve(&payload, &ctx)).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(Ok(data)) => {
                info!(problem = %problem, elapsed_ms, "problem solved");
                ResponseEnvelope::success(problem, data)
            }
            Ok(Err(SolveError::Cancelled)) => {
                warn!(problem = %problem, elapsed_ms, "solve cancelled");
                ResponseEnvelope::error(problem, SolveError::Cancelled.message())
            }
            Ok(Err(err)) => {
                info!(problem = %problem, elapsed_ms, error = %err, "solver reported failure");
                ResponseEnvelope::error(problem, err.message())
            }
            Err(join_error) => {
                let correlation_id = Uuid::new_v4().to_string();
                let detail = if join_error.is_panic() {
                    panic_message(&*join_error.into_panic())
                } else {
                    join_error.to_string()
                };
                error!(
                    problem = %problem,
                    correlation_id = %correlation_id,
                    detail = %detail,
                    "solver faulted"
                );
                ResponseEnvelope::internal_error(problem, correlation_id)
            }
        }
    }

    /// Registered problem types with their descriptions, sorted by name
    pub fn problems(&self) -> Vec<ProblemInfo> {
        self.registry
            .problems()
            .into_iter()
            .filter_map(|name| {
                self.registry.get(name).map(|solver| ProblemInfo {
                    name: name.to_string(),
                    description: solver.description().to_string(),
                })
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
