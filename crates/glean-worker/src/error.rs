//! Error types for job execution and the worker loop

use glean_domain::ClassifiedError;
use glean_extractor::ExtractError;
use std::fmt;
use thiserror::Error;

/// Failure to obtain a document
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("request for {url} failed: {source}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("request for {url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// The document exceeds the configured size cap
    #[error("document at {url} exceeds {limit} bytes")]
    TooLarge {
        /// Requested URL
        url: String,
        /// Cap in bytes
        limit: u64,
    },

    /// The fetcher could not be constructed or the request built
    #[error("fetcher error: {0}")]
    Client(String),
}

/// Failure of a single orchestrated job
///
/// Each variant keeps the collaborator's error as-is; nothing is
/// reclassified on the way up.
#[derive(Error, Debug)]
pub enum JobError {
    /// The extractor could not be resolved
    #[error("cannot resolve extractor")]
    Resolve(#[source] ClassifiedError),

    /// The document could not be fetched
    #[error("cannot fetch document")]
    Fetch(#[source] FetchError),

    /// The extractor could not run against the document
    #[error("extraction failed")]
    Extraction(#[source] ExtractError),

    /// The report could not be persisted
    #[error("cannot write report")]
    Report(#[source] ClassifiedError),
}

impl JobError {
    /// The classified storage error behind this failure, if any
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            JobError::Resolve(e) | JobError::Report(e) => Some(e),
            JobError::Fetch(_) | JobError::Extraction(_) => None,
        }
    }

    /// Whether the job failed because its extractor does not exist
    pub fn is_not_found(&self) -> bool {
        self.classified().is_some_and(ClassifiedError::is_not_found)
    }

    /// Whether this failure carries the fatal hint
    ///
    /// Fetch and extraction failures are fatal to the job; storage failures
    /// defer to their classification.
    pub fn is_fatal(&self) -> bool {
        match self {
            JobError::Resolve(e) | JobError::Report(e) => e.is_fatal(),
            JobError::Fetch(_) | JobError::Extraction(_) => true,
        }
    }

    /// Bucket used for metrics
    pub fn failure_kind(&self) -> JobFailureKind {
        match self {
            JobError::Resolve(e) if e.is_not_found() => JobFailureKind::ExtractorNotFound,
            JobError::Resolve(_) => JobFailureKind::Resolve,
            JobError::Fetch(_) => JobFailureKind::Fetch,
            JobError::Extraction(_) => JobFailureKind::Extraction,
            JobError::Report(_) => JobFailureKind::Report,
        }
    }
}

/// Coarse classification of job failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobFailureKind {
    /// The named extractor does not exist
    ExtractorNotFound,
    /// The extractor exists but could not be loaded
    Resolve,
    /// Document fetch failed
    Fetch,
    /// Extraction failed
    Extraction,
    /// Report write failed
    Report,
}

impl JobFailureKind {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            JobFailureKind::ExtractorNotFound => "extractor_not_found",
            JobFailureKind::Resolve => "resolve",
            JobFailureKind::Fetch => "fetch",
            JobFailureKind::Extraction => "extraction",
            JobFailureKind::Report => "report",
        }
    }
}

impl fmt::Display for JobFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that stop the worker loop
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage backend could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] ClassifiedError),

    /// Too many jobs in a row failed with the fatal hint
    #[error("stopping after {count} consecutive fatal job failures; last: {last}")]
    TooManyFatalFailures {
        /// Length of the failure run
        count: usize,
        /// Rendering of the last failure
        last: String,
    },
}
