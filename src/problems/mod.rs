// Built-in problem solvers registered with the dispatcher

pub mod echo;
pub mod fertilizer;
pub mod linear_program;
pub mod sudoku;

pub use echo::EchoSolver;
pub use fertilizer::FertilizerSolver;
pub use linear_program::LinearProgramSolver;
pub use sudoku::SudokuSolver;

use crate::domain::{
    LinearSolver, OptimizationProblem, Payload, Solution, SolveContext, SolveError, SolverError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

impl From<SolverError> for SolveError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::InvalidProblem(_) | SolverError::SolverNotAvailable(_) => {
                SolveError::InvalidPayload(err.to_string())
            }
            SolverError::ExecutionFailed(_) => SolveError::Backend(err.to_string()),
        }
    }
}

/// Deserialize a payload into a solver's typed input
pub(crate) fn parse_payload<T: DeserializeOwned>(
    problem: &str,
    payload: &Payload,
) -> Result<T, SolveError> {
    serde_json::from_value(Value::Object(payload.clone()))
        .map_err(|e| SolveError::invalid(format!("Invalid {} payload: {}", problem, e)))
}

/// Run a linear model, honouring cancellation before and after the solve.
///
/// The backend call itself is not interruptible: a token cancelled mid-solve
/// is noticed once the backend returns, and its result is dropped.
pub(crate) fn run_linear(
    solver: &dyn LinearSolver,
    problem: &OptimizationProblem,
    ctx: &SolveContext,
) -> Result<Solution, SolveError> {
    ctx.checkpoint()?;
    let solution = solver.solve(problem)?;
    ctx.checkpoint()?;
    Ok(solution)
}

/// Values within solver tolerance of zero are reported as zero
pub(crate) fn clean(value: f64) -> f64 {
    if value.abs() < 1e-9 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CancellationToken, ObjectiveFunction};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts backend calls and optionally cancels while "solving"
    struct RecordingSolver {
        calls: AtomicUsize,
        cancel_during_solve: Option<CancellationToken>,
    }

    impl RecordingSolver {
        fn new(cancel_during_solve: Option<CancellationToken>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                cancel_during_solve,
            }
        }
    }

    impl LinearSolver for RecordingSolver {
        fn solve(
            &self,
            _problem: &OptimizationProblem,
        ) -> crate::domain::linear_solver::Result<Solution> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_during_solve {
                token.cancel();
            }
            Ok(Solution::optimal(0.0, vec![0.0]))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn model() -> OptimizationProblem {
        OptimizationProblem::new(ObjectiveFunction::minimize(vec![1.0]))
    }

    #[test]
    fn cancelled_before_solve_skips_the_backend() {
        let token = CancellationToken::new();
        token.cancel();
        let solver = RecordingSolver::new(None);

        let result = run_linear(&solver, &model(), &SolveContext::new(token));

        assert!(matches!(result, Err(SolveError::Cancelled)));
        assert_eq!(solver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancellation_during_solve_discards_the_result() {
        let token = CancellationToken::new();
        let solver = RecordingSolver::new(Some(token.clone()));

        let result = run_linear(&solver, &model(), &SolveContext::new(token));

        // the backend ran to completion before the token was observed
        assert_eq!(solver.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(SolveError::Cancelled)));
    }

    #[test]
    fn uncancelled_solve_returns_the_solution() {
        let solver = RecordingSolver::new(None);

        let ctx = SolveContext::new(CancellationToken::new());

        let solution = run_linear(&solver, &model(), &ctx).unwrap();

        assert!(solution.is_optimal());
    }
}
