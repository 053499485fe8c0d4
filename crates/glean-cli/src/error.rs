//! Error types for the CLI application.

use glean_domain::ClassifiedError;
use glean_extractor::ExtractError;
use glean_worker::{FetchError, JobError, WorkerError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] ClassifiedError),

    /// Extractor definition rejected
    #[error("Invalid extractor: {0}")]
    Extract(#[from] ExtractError),

    /// Job failed
    #[error("Job failed: {}", render_chain(.0))]
    Job(#[from] JobError),

    /// Worker stopped abnormally
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// HTTP client setup error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Whether the failure is a missing extractor
    pub fn is_not_found(&self) -> bool {
        glean_domain::is_not_found(self)
    }
}

fn render_chain(e: &JobError) -> String {
    let mut rendered = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
