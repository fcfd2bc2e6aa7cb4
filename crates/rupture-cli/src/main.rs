//! Rupture CLI - headless host for the rupture reverb and its presentation bridge.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rupture")]
#[command(author, version, about = "Rupture reverb bridge CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless session: synthetic audio in, control scripts out
    Run(commands::run::RunArgs),

    /// Create and inspect parameter state blobs
    State(commands::state::StateArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only control-channel scripts.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::State(args) => commands::state::run(args),
    }
}
