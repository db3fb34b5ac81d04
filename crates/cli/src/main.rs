//! duplodocs CLI
//!
//! Main entry point for the duplodocs documentation assistant.
//! Provides one-shot queries, an HTTP API, and index maintenance.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand, StatsCommand, SyncCommand};
use duplodocs_assistant::Assistant;
use duplodocs_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Documentation assistant with local RAG and web-search fallback
#[derive(Parser, Debug)]
#[command(name = "duplodocs")]
#[command(about = "Documentation assistant with local RAG and web-search fallback", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the documentation corpus directory
    #[arg(short, long, global = true, env = "DUPLODOCS_DOCS_DIR")]
    docs_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DUPLODOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a single query and print the answer
    Ask(AskCommand),

    /// Run the HTTP API
    Serve(ServeCommand),

    /// Re-embed the documentation corpus into the vector index
    Sync(SyncCommand),

    /// Show corpus and index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration (explicit --config wins over the default
    // lookup), then apply the remaining CLI overrides.
    let config = match cli.config.as_ref() {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config = config.with_overrides(
        cli.docs_dir,
        cli.config,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("duplodocs starting");
    tracing::debug!("Docs dir: {:?}", config.docs_dir);
    tracing::debug!("Vector db: {:?}", config.vector_db.path);

    // Bootstrap may fail (index/corpus); everything after this point
    // degrades per-query instead of erroring.
    let assistant = Arc::new(Assistant::new(config.clone()).await?);

    match cli.command {
        Commands::Ask(cmd) => cmd.execute(&assistant).await,
        Commands::Serve(cmd) => cmd.execute(&config, assistant).await,
        Commands::Sync(cmd) => cmd.execute(&assistant).await,
        Commands::Stats(cmd) => cmd.execute(&assistant).await,
    }
}
