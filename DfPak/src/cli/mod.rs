//! `DfPak` CLI - Command-line interface for DFPF packages

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "dfpak")]
#[command(version, about = "DfPak: DFPF package tools for Brutal Legend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the `DfPak` CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
