mod audit;
mod cli;
mod config;
mod context;
mod install;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dossier",
    version,
    about = "Persistent machine context for AI coding agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the system, generate the context document, and install the session hook
    Setup {
        /// Only include hardware/network (no project tracking sections)
        #[arg(long)]
        minimal: bool,
        /// Run the scanner and print discovered facts without installing
        #[arg(long)]
        scan_only: bool,
        /// Where to create the context file (default: ~/claude_context.json)
        #[arg(long)]
        context_path: Option<PathBuf>,
        /// Overwrite files that already exist
        #[arg(long)]
        force: bool,
    },
    /// Read a replacement document from stdin, log the diff, and apply it
    Update,
    /// Check the installation and print a health report
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for paths and log level)
    let config = config::DossierConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for document output.
    let filter = EnvFilter::try_new(&config.log.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Setup {
            minimal,
            scan_only,
            context_path,
            force,
        } => {
            cli::setup::setup(
                config,
                &cli::setup::SetupArgs {
                    minimal,
                    scan_only,
                    context_path,
                    force,
                },
            )?;
        }
        Command::Update => {
            cli::update::update(&config)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
