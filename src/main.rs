//! Entry point: parse CLI, set up logging and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use ffl_aggregator::{
    cli::{Cli, Commands},
    commands::fetch::handle_get,
    FetchStatus,
};
use tracing_subscriber::EnvFilter;

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let app = Cli::parse();

    match app.command {
        Commands::Get { cmd } => {
            let result = handle_get(cmd).await.context("get command failed")?;
            if result.status == FetchStatus::Error {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
