//! Rekkari CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP gateway
//! - `lookup` — Resolve one registration from the command line
//! - `doctor` — Diagnose configuration and environment

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rekkari",
    about = "Rekkari — vehicle-aware service advisor backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long, default_value = "rekkari.toml", global = true)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a single registration and print the record as JSON
    Lookup {
        /// Registration number, e.g. ABC-123
        registration: String,
    },

    /// Diagnose configuration and environment
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
        Commands::Serve { port } => commands::serve::run(&cli.config, port).await?,
        Commands::Lookup { registration } => {
            commands::lookup::run(&cli.config, &registration).await?
        }
        Commands::Doctor => commands::doctor::run(&cli.config).await?,
    }

    Ok(())
}
