// Capability every problem domain implements to be reachable through the dispatcher

use super::problem::Payload;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Failures a solver anticipates and reports itself.
///
/// The `Display` output is forwarded verbatim to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("{0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Infeasible(String),

    #[error("{0}")]
    Unbounded(String),

    #[error("{0}")]
    Backend(String),

    #[error("Solve cancelled")]
    Cancelled,
}

impl SolveError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SolveError::InvalidPayload(message.into())
    }

    /// Caller-facing text, exactly as the solver phrased it
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Cooperative cancellation signal shared between the transport and a running solver
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Cancels the token when the returned guard is dropped, unless disarmed
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop {
            token: Some(self.clone()),
        }
    }
}

pub struct CancelOnDrop {
    token: Option<CancellationToken>,
}

impl CancelOnDrop {
    pub fn disarm(mut self) {
        self.token = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}

/// Per-invocation context handed to a solver.
///
/// Cancellation is observed only at `checkpoint` calls. A backend solve
/// that has already started runs to completion on its blocking thread;
/// the result is then discarded at the next checkpoint.
#[derive(Debug, Clone)]
pub struct SolveContext {
    cancellation: CancellationToken,
}

impl SolveContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Bail out with `SolveError::Cancelled` if the caller gave up
    pub fn checkpoint(&self) -> Result<(), SolveError> {
        if self.is_cancelled() {
            Err(SolveError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A registered unit of computation implementing one problem domain.
///
/// Implementations validate their own payload shape; the dispatcher only
/// guarantees the payload is a JSON object. A panic inside `solve` is
/// treated as an internal fault and never reaches the caller.
pub trait ProblemSolver: Send + Sync {
    fn solve(&self, payload: &Payload, ctx: &SolveContext) -> Result<Value, SolveError>;

    /// One-line description shown in the problem listing
    fn description(&self) -> &str;
}
