//! Status Dashboard - server and administrative CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use status_dashboard::{
    cli::{self, Cli, Command},
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => status_dashboard::serve(config).await,
        command => cli::run(command, &config).await,
    }
}
