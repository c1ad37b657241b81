//! Stasis - inspect and maintain key-value backed sessions
//!
//! Main entry point for the Stasis CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{delete, get, put, touch};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Stasis - inspect and maintain key-value backed sessions
#[derive(Parser)]
#[command(name = "stasis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of discovery
    #[arg(long, global = true, env = "STASIS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a stored session
    Get(get::GetArgs),

    /// Store a session map
    Put(put::PutArgs),

    /// Extend the TTL of a stored session
    Touch(touch::TouchArgs),

    /// Delete a stored session
    Delete(delete::DeleteArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "stasis=debug,stasis_session=debug,stasis_config=debug,info"
    } else {
        "stasis=info,stasis_session=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let config = match cli.config {
        Some(ref path) => stasis_config::load_config_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let loaded = stasis_config::load_config(None)?;
            for warning in &loaded.warnings {
                tracing::warn!("{}", warning);
            }
            tracing::debug!(sources = ?loaded.loaded_from(), "Configuration loaded");
            loaded.config
        }
    };

    let ctx = commands::Context {
        config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Get(args) => get::run(args, &ctx).await,
        Commands::Put(args) => put::run(args, &ctx).await,
        Commands::Touch(args) => touch::run(args, &ctx).await,
        Commands::Delete(args) => delete::run(args, &ctx).await,
    }
}
