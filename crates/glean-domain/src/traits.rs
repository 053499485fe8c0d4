//! Trait definitions for storage backends
//!
//! These traits define the boundary between the domain and the storage
//! infrastructure. Implementations live in `glean-store`; every implementation
//! must honour the same error classification so callers never need to know
//! which backend they are talking to.

use crate::{ClassifiedError, Extractor, Fields};

/// Outcome of a bulk listing
///
/// A record that cannot be resolved does not abort the listing. It is
/// reported in `failures` instead of vanishing.
#[derive(Debug, Default)]
pub struct ExtractorListing {
    /// Successfully resolved extractors, sorted by name
    pub extractors: Vec<Extractor>,

    /// Records that were listed but could not be resolved
    pub failures: Vec<ListingFailure>,
}

impl ExtractorListing {
    /// Names of the resolved extractors
    pub fn names(&self) -> Vec<&str> {
        self.extractors.iter().map(Extractor::name).collect()
    }

    /// Whether every listed record resolved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A listed record that failed to resolve
#[derive(Debug)]
pub struct ListingFailure {
    /// Identifier recovered from the record key
    pub id: String,

    /// Classified resolution error
    pub error: ClassifiedError,
}

/// CRUD over named extractor definitions
///
/// Implementations keep no in-memory state: every call re-reads the backing
/// medium. Every error is a [`ClassifiedError`].
pub trait ExtractorStore {
    /// List and resolve every stored extractor
    ///
    /// Fails as `Unknown` (fatal) only when the listing itself fails.
    fn get_all(&self) -> Result<ExtractorListing, ClassifiedError>;

    /// Create or overwrite the record for `extractor`, returning its identifier
    fn save(&self, extractor: &Extractor) -> Result<String, ClassifiedError>;

    /// Resolve one extractor
    ///
    /// `NotFound` if absent, `MalformedStoredData` if undecodable.
    fn get(&self, id: &str) -> Result<Extractor, ClassifiedError>;

    /// Permanently remove one extractor
    ///
    /// `NotFound` without any mutation if no record matches.
    fn delete(&self, id: &str) -> Result<(), ClassifiedError>;

    /// Whether a record exists and decodes
    fn contains(&self, id: &str) -> Result<bool, ClassifiedError> {
        match self.get(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Write-only persistence of extraction results
pub trait ReportSink {
    /// Create or overwrite the report `report_id` with `fields`
    fn write_as_report(&self, report_id: &str, fields: &Fields) -> Result<(), ClassifiedError>;
}

impl<T: ExtractorStore + ?Sized> ExtractorStore for &T {
    fn get_all(&self) -> Result<ExtractorListing, ClassifiedError> {
        (**self).get_all()
    }

    fn save(&self, extractor: &Extractor) -> Result<String, ClassifiedError> {
        (**self).save(extractor)
    }

    fn get(&self, id: &str) -> Result<Extractor, ClassifiedError> {
        (**self).get(id)
    }

    fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
        (**self).delete(id)
    }
}

impl<T: ReportSink + ?Sized> ReportSink for &T {
    fn write_as_report(&self, report_id: &str, fields: &Fields) -> Result<(), ClassifiedError> {
        (**self).write_as_report(report_id, fields)
    }
}
