// Domain layer: request/response model and solver contracts
pub mod domain;

// Problem dispatcher and the immutable solver registry
pub mod dispatcher;

// Built-in problem solvers
pub mod problems;

// Solver adapters: Concrete implementations of LinearSolver
pub mod solver;

// Application layer: HTTP handlers and mappers
pub mod application;

// Infrastructure layer: External concerns (config, logging, server)
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    CancellationToken, EnvelopeStatus, LinearSolver, Payload, ProblemRequest, ProblemSolver,
    ResponseEnvelope, SolveContext, SolveError, SolverBackend, SolverError,
};

pub use dispatcher::{Dispatcher, ProblemInfo, RegistryError, SolverRegistry};

pub use application::AppState;

pub use infrastructure::{router, start_server, ServerArgs, ServerConfig};

pub use solver::{GoodLpSolver, SolverFactory};
