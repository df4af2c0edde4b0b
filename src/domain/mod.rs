// Domain module: request/response model, solver contracts and the linear model

pub mod linear_solver;
pub mod models;
pub mod problem;
pub mod problem_solver;
pub mod value_objects;

pub use linear_solver::*;
pub use models::*;
pub use problem::*;
pub use problem_solver::*;
pub use value_objects::*;
