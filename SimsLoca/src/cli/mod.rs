//! SimsLoca CLI - Command-line interface for package string tables

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "simsloca")]
#[command(version, about = "SimsLoca: string table tools for DBPF packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the SimsLoca CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
