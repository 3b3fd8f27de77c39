//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod route;
pub mod search;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Find places nearby and walk to them
#[derive(Parser)]
#[command(name = "nearby")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for places around a location
    Search(search::SearchArgs),

    /// Walking route between two points
    Route(route::RouteArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show locator and server status
    Status(status::StatusArgs),
}

/// Install the log subscriber
///
/// `RUST_LOG` wins over `default_level`. Logs go to stderr so command output
/// stays pipeable.
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve(_) => init_logging("info"),
        _ => init_logging("warn"),
    }

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Route(args) => route::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}
