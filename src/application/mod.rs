// Application layer: HTTP handlers and wire-format mapping

pub mod handlers;
pub mod mappers;

pub use handlers::AppState;
