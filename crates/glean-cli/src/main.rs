//! Glean CLI - Command-line interface for extractor management and extraction jobs.

use clap::Parser;
use glean_cli::commands;
use glean_cli::config::OutputFormat;
use glean_cli::{Cli, CliError, Command, Config, Formatter};
use glean_worker::Storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    // Configuration may be what failed, so only the flag decides color here
    let errors = Formatter::new(OutputFormat::Table, !cli.no_color);

    if let Err(e) = run(cli).await {
        if e.is_not_found() {
            eprintln!("{}", errors.error(&format!("Not found: {}", e)));
        } else {
            eprintln!("{}", errors.error(&format!("Error: {}", e)));
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);
    let storage = Storage::open(&config.worker)?;

    match cli.command {
        Command::Extractor(args) => {
            commands::execute_extractor(args, storage.store(), &formatter)?;
        }
        Command::Run(args) => {
            commands::execute_run(args, &config.worker, &storage, &formatter).await?;
        }
        Command::Worker(args) => {
            commands::execute_worker(args, &config.worker, &storage, &formatter).await?;
        }
    }

    Ok(())
}
