//! Glean Worker
//!
//! Executes extraction jobs: resolve a stored extractor, fetch a document,
//! run the extractor, and persist the result as a report.
//!
//! # Overview
//!
//! - **Orchestration**: [`Orchestrator`] runs one [`Job`] through the four
//!   steps and reports the failing step's error unchanged
//! - **Supervision**: [`Worker`] consumes a queue of jobs one at a time,
//!   absorbing per-job failures and counting them in [`WorkerMetrics`]
//! - **Fetching**: [`DocumentFetcher`] abstracts document retrieval;
//!   [`HttpFetcher`] fetches directly or through a rendering proxy
//!
//! # Usage
//!
//! ## One-off Job
//!
//! ```no_run
//! use glean_worker::{HttpFetcher, Job, Orchestrator, Storage, WorkerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkerConfig::default();
//! let storage = Storage::open(&config)?;
//! let orchestrator = Orchestrator::new(
//!     storage.store(),
//!     storage.sink(),
//!     HttpFetcher::from_config(&config)?,
//! );
//!
//! let report = orchestrator
//!     .run(&Job::new("https://shop.example/widget", "product-page", "report-42"))
//!     .await?;
//! println!("{} fields", report.fields.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Failure Handling
//!
//! A job that fails is never retried and never stops the worker on its own.
//! Failures carrying the fatal hint (malformed or unreadable storage, fetch
//! and extraction failures) are logged at `error` level; a missing extractor
//! or a recoverable write failure at `warn`. A run of
//! `max_consecutive_fatal` fatal failures ends the worker with
//! [`WorkerError::TooManyFatalFailures`] so a supervisor can restart it.
//!
//! # Configuration
//!
//! ```toml
//! backend = "filesystem"          # or "sqlite"
//! extractor_dir = "extractors"
//! report_dir = "reports"
//! database_path = "glean.db"
//! fetch_endpoint = "http://localhost:8092/new"
//! fetch_timeout_secs = 30
//! max_document_bytes = 10485760
//! max_consecutive_fatal = 5
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fetch;
mod job;
mod metrics;
mod orchestrator;
mod storage;
mod worker;

pub use config::{StorageBackend, WorkerConfig, DEFAULT_MAX_DOCUMENT_BYTES};
pub use error::{FetchError, JobError, JobFailureKind, WorkerError};
pub use fetch::{DocumentFetcher, HttpFetcher, StaticFetcher};
pub use job::{Job, JobReport};
pub use metrics::WorkerMetrics;
pub use orchestrator::Orchestrator;
pub use storage::Storage;
pub use worker::Worker;
