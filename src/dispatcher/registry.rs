use crate::domain::{ProblemSolver, SolverBackend, SolverError};
use crate::problems::{EchoSolver, FertilizerSolver, LinearProgramSolver, SudokuSolver};
use crate::solver::SolverFactory;
use std::collections::HashMap;
use std::sync::Arc;

/// Startup-time configuration errors. Fatal: the service must not serve.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Problem identifier must not be empty")]
    EmptyIdentifier,

    #[error("Problem type '{0}' is already registered")]
    DuplicateProblem(String),

    #[error(transparent)]
    Backend(#[from] SolverError),
}

/// Immutable mapping from problem identifier to solver, built once at startup
pub struct SolverRegistry {
    solvers: HashMap<String, Arc<dyn ProblemSolver>>,
}

impl SolverRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with every built-in problem type, modelled on `backend`
    pub fn with_default_solvers(backend: SolverBackend) -> Result<Self, RegistryError> {
        let linear = SolverFactory::create_from_backend(backend)?;

        Ok(Self::builder()
            .register("echo", Arc::new(EchoSolver))?
            .register("fertilizer", Arc::new(FertilizerSolver::new(linear.clone())))?
            .register("sudoku", Arc::new(SudokuSolver::new(linear.clone())))?
            .register("linear_program", Arc::new(LinearProgramSolver::new(linear)))?
            .build())
    }

    /// Case-sensitive lookup
    pub fn get(&self, problem: &str) -> Option<&Arc<dyn ProblemSolver>> {
        self.solvers.get(problem)
    }

    pub fn contains(&self, problem: &str) -> bool {
        self.solvers.contains_key(problem)
    }

    /// Registered identifiers, sorted
    pub fn problems(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.solvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    solvers: HashMap<String, Arc<dyn ProblemSolver>>,
}

impl RegistryBuilder {
    pub fn register(
        mut self,
        problem: impl Into<String>,
        solver: Arc<dyn ProblemSolver>,
    ) -> Result<Self, RegistryError> {
        let problem = problem.into();
        if problem.is_empty() {
            return Err(RegistryError::EmptyIdentifier);
        }
        if self.solvers.contains_key(&problem) {
            return Err(RegistryError::DuplicateProblem(problem));
        }
        self.solvers.insert(problem, solver);
        Ok(self)
    }

    pub fn build(self) -> SolverRegistry {
        SolverRegistry {
            solvers: self.solvers,
        }
    }
}
