//! Roomtone CLI - Command-line interface for the roomtone reverberator.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roomtone")]
#[command(author, version, about = "Roomtone room reverberator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the reverberator
    Process(commands::process::ProcessArgs),

    /// Render the impulse response of a room to a WAV file
    Impulse(commands::impulse::ImpulseArgs),

    /// List the reverberator's parameters
    Params(commands::params::ParamsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
        Commands::Params(args) => commands::params::run(args),
    }
}
