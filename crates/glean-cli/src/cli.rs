//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Glean CLI - Manage extractors and run extraction jobs.
#[derive(Debug, Parser)]
#[command(name = "glean")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GLEAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage stored extractors
    Extractor(ExtractorArgs),

    /// Run a single extraction job
    Run(RunArgs),

    /// Process a stream of JSON-lines jobs
    Worker(WorkerArgs),
}

/// Arguments for extractor management.
#[derive(Debug, Parser)]
pub struct ExtractorArgs {
    #[command(subcommand)]
    pub action: ExtractorAction,
}

/// Extractor management actions.
#[derive(Debug, Subcommand)]
pub enum ExtractorAction {
    /// List all stored extractors
    List,

    /// Show a stored extractor definition
    Show {
        /// Extractor name
        id: String,
    },

    /// Validate and store an extractor definition
    Save {
        /// TOML file holding the definition
        file: PathBuf,
    },

    /// Delete a stored extractor
    Delete {
        /// Extractor name
        id: String,
    },
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Document URL
    pub url: String,

    /// Name of the extractor to apply
    pub extractor_id: String,

    /// Identifier to write the report under
    pub report_id: String,
}

/// Arguments for the worker command.
#[derive(Debug, Parser)]
pub struct WorkerArgs {
    /// JSON-lines job file; jobs are read from stdin when omitted
    #[arg(short, long)]
    pub jobs: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
