//! Locas CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP API server
//! - `ask`     — Answer a single query from the terminal
//! - `doctor`  — Check configuration, session store and completion provider

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "locas",
    about = "Locas — location-aware answers about places, land and businesses",
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
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer one query, e.g. "Is there a park near 40.7128, -74.0060?"
    Ask {
        /// The question, including a location
        query: String,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Diagnose configuration and connectivity
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
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { query, session } => commands::ask::run(query, session).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
