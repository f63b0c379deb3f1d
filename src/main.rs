use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod engine;
mod error;
mod parser;
mod provider;
mod steps;
mod store;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("lexflow=debug")
    } else {
        EnvFilter::new("lexflow=warn")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // First Ctrl-C suspends the run at the next safe point; the checkpoint
    // trail makes it resumable
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, shutdown_rx).await,
        Commands::Resume(args) => cli::resume::execute(args, shutdown_rx).await,
        Commands::Review(args) => cli::review::execute(args),
        Commands::Init(args) => cli::init::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
