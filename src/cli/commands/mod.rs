//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod db;
mod ingest;
mod init;
mod serve;
mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "ipl")]
#[command(about = "IPL ball-by-ball ingestion and batting analytics")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    /// Can be a directory containing ipl.db or a .db file directly.
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Ingest one season of Cricsheet match files
    Ingest {
        /// Folder containing Cricsheet JSON match files
        folder: PathBuf,
        /// Season to ingest (e.g. 2023 or 2007/08); other seasons are skipped
        #[arg(short, long)]
        season: String,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Parse and check a single match file without storing it
    Validate {
        /// Cricsheet JSON match file
        file: PathBuf,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind to: port, host, or host:port (defaults to the configured bind)
        bind: Option<String>,
        /// Skip schema creation on startup
        #[arg(long)]
        no_migrate: bool,
    },

    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Rebuild the precomputed batter season aggregates
    RefreshAggregates,

    /// Remove the precomputed aggregates (reads fall back to live queries)
    DropAggregates,

    /// Show row counts and cache status
    Stats,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (settings, _config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Ingest {
            folder,
            season,
            quiet,
        } => ingest::cmd_ingest(&settings, &folder, &season, !quiet).await,
        Commands::Validate { file } => validate::cmd_validate(&file),
        Commands::Serve { bind, no_migrate } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind, no_migrate).await
        }
        Commands::Db { command } => match command {
            DbCommands::RefreshAggregates => db::cmd_refresh_aggregates(&settings).await,
            DbCommands::DropAggregates => db::cmd_drop_aggregates(&settings).await,
            DbCommands::Stats => db::cmd_stats(&settings).await,
        },
    }
}
