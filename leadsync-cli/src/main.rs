//! Leadsync: keeps a lead table and a task board in step.
//!
//! # Usage
//!
//! ```text
//! leadsync          run a sync cycle every SYNC_INTERVAL_SECONDS until ctrl-c
//! leadsync init     create tasks for every lead that lacks one, then exit
//! ```
//!
//! Settings come from the environment; a `.env` file in the working
//! directory is loaded first when present.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use leadsync_core::Settings;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "leadsync",
    version,
    about = "Bi-directional sync between a lead table and a task board",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bootstrap pass once (create missing tasks) and exit.
    Init,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is normal; the environment may already be populated.
    let _ = dotenvy::dotenv();
    leadsync_daemon::init_tracing();

    let settings = Settings::from_env()
        .context("configuration error: set the variables in the environment or a .env file")?;

    match cli.command {
        Some(Commands::Init) => commands::init::run(&settings),
        None => commands::watch::run(&settings),
    }
}
