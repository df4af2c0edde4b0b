// Infrastructure layer: configuration, logging and the HTTP server

pub mod config;
pub mod logging;
pub mod server;

pub use config::{LogFormat, ServerArgs};
pub use logging::init_logging;
pub use server::{router, start_server, ServerConfig};
