//! cuppa - terminal client for the cuppa coffee-subscription service.
//!
//! This is a thin wrapper over the `cuppa-api` library: commands load the
//! persisted config, run one or more API calls, and write any rotated
//! tokens back to disk.

mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Login(args) => commands::login::run(args).await,
        Commands::Logout => commands::logout::run().await,
        Commands::Whoami => commands::whoami::run().await,
        Commands::Plans(args) => commands::plans::run(args).await,
        Commands::Learn(cmd) => commands::learn::handle(cmd).await,
        Commands::Subscribe(args) => commands::subscribe::run(args).await,
        Commands::Orders(cmd) => commands::orders::handle(cmd).await,
        Commands::Manage(cmd) => commands::manage::handle(cmd).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
