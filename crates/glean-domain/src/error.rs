//! Failure classification shared by every storage backend
//!
//! Storage operations never hand raw I/O or database errors to their callers.
//! They wrap the underlying cause in a [`ClassifiedError`] so that callers can
//! branch on the kind without knowing which backend produced it.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed underlying cause carried by a [`ClassifiedError`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Closed taxonomy of storage failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unclassified I/O or infrastructure failure
    Unknown,

    /// The requested identifier is absent
    NotFound,

    /// A record exists but does not decode into the expected shape
    MalformedStoredData,
}

impl ErrorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unknown => "unknown",
            ErrorKind::NotFound => "not found",
            ErrorKind::MalformedStoredData => "malformed stored data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory hint telling the caller how to dispose of a failure
///
/// `Fatal` means "fail this job and alert", not "terminate the process".
/// The classifier never acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Expected condition; the caller can continue normally
    Recoverable,

    /// Configuration or infrastructure corruption worth surfacing loudly
    Fatal,
}

/// A storage failure tagged with a kind, a fatal hint and its underlying cause
#[derive(Debug, Error)]
#[error("{kind}: {context}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    severity: Severity,
    context: String,
    #[source]
    source: Option<BoxError>,
}

impl ClassifiedError {
    /// Unclassified failure with an explicit fatal hint
    ///
    /// # Examples
    ///
    /// ```
    /// use glean_domain::{ClassifiedError, ErrorKind, Severity};
    ///
    /// let err = ClassifiedError::unknown("cannot list extractors", Severity::Fatal);
    /// assert_eq!(err.kind(), ErrorKind::Unknown);
    /// assert!(err.is_fatal());
    /// ```
    pub fn unknown(context: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            severity,
            context: context.into(),
            source: None,
        }
    }

    /// Absent record. Always recoverable.
    pub fn not_found(context: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            severity: Severity::Recoverable,
            context: context.into(),
            source: None,
        }
    }

    /// Record present but undecodable. Always fatal.
    pub fn malformed(context: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MalformedStoredData,
            severity: Severity::Fatal,
            context: context.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.source = Some(source.into());
        self
    }

    /// Failure kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Fatal hint
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Human-readable description of the failed operation
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Whether the caller should treat this as unrecoverable for the current job
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Whether this is a not-found condition
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

/// Find the first [`ClassifiedError`] in an error's source chain
pub fn classify<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ClassifiedError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(classified) = e.downcast_ref::<ClassifiedError>() {
            return Some(classified);
        }
        current = e.source();
    }
    None
}

/// Test whether any error value is a not-found condition, regardless of origin
///
/// # Examples
///
/// ```
/// use glean_domain::{is_not_found, ClassifiedError};
///
/// let err = ClassifiedError::not_found("extractor 'missing'");
/// assert!(is_not_found(&err));
///
/// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "raw");
/// assert!(!is_not_found(&io));
/// ```
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    classify(err).is_some_and(ClassifiedError::is_not_found)
}
