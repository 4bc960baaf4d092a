//! Command-line interface for the gridmatch server.

use clap::Parser;

/// Real-time multiplayer tic-tac-toe room server
#[derive(Parser, Debug)]
#[command(name = "gridmatch")]
#[command(about = "WebSocket room server for two-player tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    pub port: u16,
}
