// Solver adapters module

pub mod factory;
pub mod good_lp_solver;

pub use factory::SolverFactory;
pub use good_lp_solver::GoodLpSolver;
