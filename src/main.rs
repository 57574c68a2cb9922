// src/main.rs
// explainer - explain any topic at a chosen audience level

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // stdout carries explanation text; logs go to stderr
    let default_filter = match &cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => cli::run_serve(host, port).await?,
        Commands::Ask {
            topic,
            level,
            no_stream,
            server,
        } => cli::run_ask(topic, level, no_stream, server).await?,
        Commands::Levels => cli::run_levels(),
        Commands::History { action } => cli::run_history(action)?,
    }

    Ok(())
}
