use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::domain::SolverBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Command-line and environment configuration for the server
#[derive(Debug, Clone, Parser)]
#[command(name = "optimizer-server", version, about = "Optimization problem solving service")]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "OPTIMIZER_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "OPTIMIZER_PORT", default_value_t = 8421)]
    pub port: u16,

    /// LP/MIP backend: auto, microlp, coin_cbc, highs or scip
    #[arg(long, env = "OPTIMIZER_BACKEND", default_value = "auto")]
    pub backend: SolverBackend,

    /// Give up on a solve after this many seconds
    #[arg(long, env = "OPTIMIZER_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, env = "OPTIMIZER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "OPTIMIZER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
