// Infrastructure: Server setup and configuration
// Single Responsibility: Manage server lifecycle and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::handlers::{list_problems, root, solve_problem};
use crate::application::AppState;
use crate::dispatcher::Dispatcher;
use crate::solver::SolverFactory;

pub struct ServerConfig {
    pub address: SocketAddr,
    pub dispatcher: Dispatcher,
    pub request_timeout: Option<Duration>,
    pub backend_name: String,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, dispatcher: Dispatcher) -> Self {
        Self {
            address,
            dispatcher,
            request_timeout: None,
            backend_name: String::new(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend_name = name.into();
        self
    }
}

/// Routes of the service, without binding anything
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/problems", get(list_problems))
        .route("/api/solve", post(solve_problem))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let state =
        AppState::new(config.dispatcher.clone()).with_request_timeout(config.request_timeout);
    let listener = TcpListener::bind(config.address).await?;
    let address = listener.local_addr()?;

    print_banner(&address, &config);
    let compiled: Vec<String> = SolverFactory::available_backends()
        .iter()
        .map(|backend| backend.to_string())
        .collect();
    info!(
        %address,
        backend = %config.backend_name,
        compiled_backends = ?compiled,
        "optimizer service listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("optimizer service stopped");
    Ok(())
}

/// Resolves once `signal` fires. A listener that could not be installed
/// never resolves, so it cannot trigger a shutdown on its own.
async fn signal_or_pending<F>(name: &str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, signal = name, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = signal_or_pending("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = signal_or_pending("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

fn print_banner(address: &SocketAddr, config: &ServerConfig) {
    println!("\n+------------------------------------------------------------+");
    println!("|  Optimizer Service - pluggable problem solving             |");
    println!("+------------------------------------------------------------+");
    println!("|  LP/MIP backend: {:41} |", config.backend_name);
    println!("|  Listening on:   {:41} |", address);
    println!("+------------------------------------------------------------+");
    println!("|  Registered problems:                                      |");
    for problem in config.dispatcher.problems() {
        println!("|    - {:53} |", problem.name);
    }
    println!("+------------------------------------------------------------+\n");
}
