//! Gridmatch - WebSocket tic-tac-toe room server

use anyhow::Result;
use clap::Parser;
use gridmatch::{Cli, SessionGateway, router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    info!(host = %cli.host, port = cli.port, "Starting gridmatch server");

    let gateway = Arc::new(SessionGateway::new());
    let app = router(gateway);

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!("Server ready at http://{}:{}/", cli.host, cli.port);
    info!("Clients connect over WebSocket at /ws");

    axum::serve(listener, app).await?;

    Ok(())
}
