use anyhow::Context;
use clap::Parser;
use optimizer_service::infrastructure::init_logging;
use optimizer_service::{
    start_server, Dispatcher, ServerArgs, ServerConfig, SolverFactory, SolverRegistry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_logging(&args.log_level, args.log_format)?;

    // Registration errors are fatal: nothing is bound until the registry is complete
    let registry = SolverRegistry::with_default_solvers(args.backend)
        .context("failed to register problem solvers")?;
    let backend_name = SolverFactory::create_from_backend(args.backend)?
        .name()
        .to_string();

    let config = ServerConfig::new(args.address(), Dispatcher::new(Arc::new(registry)))
        .with_request_timeout(args.request_timeout())
        .with_backend_name(backend_name);
    start_server(config).await?;

    Ok(())
}
