use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use todo_server::logging::init_logging;
use todo_server::{Cli, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(Cli::parse());
    init_logging(&config.log)?;

    let router = todo_server::router(&config).context("invalid route table")?;
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        contract = %config.contract,
        seed = config.seed,
        "todo server listening"
    );

    todo_server::serve(listener, router, shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("todo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
