//! CivicDraft CLI — the main entry point.
//!
//! Commands:
//! - `init`   — Write a starter config file
//! - `draft`  — Send one message through the agent against a document
//! - `doctor` — Diagnose configuration and endpoint health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "civicdraft",
    about = "CivicDraft — conversational policy proposal drafting",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file to ~/.civicdraft/config.toml
    Init,

    /// Run one agent turn against a markdown document
    Draft {
        /// The message to send to the agent
        message: String,

        /// Path to the markdown document to draft against (created if absent)
        #[arg(short, long)]
        file: PathBuf,

        /// Document title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Diagnose configuration and endpoint health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Draft {
            message,
            file,
            title,
        } => commands::draft::run(&message, &file, title).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
