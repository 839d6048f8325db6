//! promptvault CLI
//!
//! Main entry point for the promptvault command-line tool: store and fetch
//! versioned prompts.

mod commands;

use clap::{Parser, Subcommand};
use commands::{print_prompt, GetCommand, PutCommand};
use promptvault_core::{config::AppConfig, logging, AppResult, BackendKind};
use promptvault_prompt::{create_backend, VersionedStore};
use std::path::PathBuf;
use tracing::Instrument;

/// promptvault - versioned prompt storage
#[derive(Parser, Debug)]
#[command(name = "promptvault")]
#[command(about = "Store and fetch versioned prompts", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PROMPTVAULT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PROMPTVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Storage backend (memory, sqlite)
    #[arg(short, long, global = true, env = "PROMPTVAULT_BACKEND")]
    backend: Option<BackendKind>,

    /// SQLite database path
    #[arg(long, global = true, env = "PROMPTVAULT_DATABASE")]
    database: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output (NO_COLOR in the environment is honored too)
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a new prompt version
    Put(PutCommand),

    /// Fetch a prompt by namespace and name
    Get(GetCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.backend,
        cli.database,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.log_format, config.no_color)?;

    tracing::info!("promptvault starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Backend: {}", config.backend);

    if config.backend == BackendKind::Sqlite && config.database.is_none() {
        config.ensure_state_dir()?;
    }

    // One backend handle for the whole process.
    let store = VersionedStore::new(create_backend(&config)?);

    let span = tracing::info_span!("command", name = cli.command.name());
    let result = dispatch(&cli.command, &store).instrument(span).await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Put(_) => "put",
            Commands::Get(_) => "get",
        }
    }
}

async fn dispatch(command: &Commands, store: &VersionedStore) -> AppResult<()> {
    match command {
        Commands::Put(cmd) => print_prompt(&cmd.execute(store).await?, cmd.pretty),
        Commands::Get(cmd) => print_prompt(&cmd.execute(store).await?, cmd.pretty),
    }
}
