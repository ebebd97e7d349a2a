//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::workspace::Workspace;
use super::{board, task, tui};

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "TASKBOARD_LOG";

#[derive(Parser)]
#[command(name = "board")]
#[command(author, version, about = "A local kanban board for your own tasks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Board file to use
    #[arg(long, global = true, env = "TASKBOARD_STORE")]
    pub store: Option<PathBuf>,

    /// Config file to use
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Task(task::TaskCommands),

    /// Show the board, one column per stage
    #[command(visible_alias = "ls")]
    Board,

    /// Manage board filters
    #[command(subcommand)]
    Filter(board::FilterCommands),

    /// Open the interactive board
    Tui,

    /// Show the effective configuration
    Config,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format);

    init_logging(cli.verbose, matches!(cli.command, Commands::Tui));

    let workspace = Workspace::resolve(cli.store.as_deref(), cli.config.as_deref())?;
    tracing::debug!(store = %workspace.store_path.display(), "workspace resolved");

    match cli.command {
        Commands::Task(cmd) => task::run(cmd, &workspace, &output)?,
        Commands::Board => board::show_board(&workspace, &output)?,
        Commands::Filter(cmd) => board::run_filter(cmd, &workspace, &output)?,
        Commands::Tui => tui::run(&workspace, &output)?,
        Commands::Config => board::show_config(&workspace, &output)?,
    }

    Ok(())
}

/// Installs the stderr log subscriber
///
/// The interactive board owns the terminal, so it stays silent unless a
/// filter is set explicitly.
fn init_logging(verbose: bool, interactive: bool) {
    let default = match (verbose, interactive) {
        (_, true) => "off",
        (true, false) => "taskboard=debug",
        (false, false) => "taskboard=warn",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // Ignored when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
