use crate::domain::{
    linear_solver::{LinearSolver, Result},
    value_objects::SolverBackend,
};
use crate::solver::GoodLpSolver;
use std::sync::Arc;

/// Factory for creating linear solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    ///
    /// Fails with `SolverNotAvailable` when the backend was not compiled in.
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn LinearSolver>> {
        Ok(Arc::new(GoodLpSolver::new(backend)?))
    }

    /// Backends usable in this build, `Auto` included
    pub fn available_backends() -> Vec<SolverBackend> {
        SolverBackend::ALL
            .into_iter()
            .filter(|backend| backend.is_available())
            .collect()
    }
}
