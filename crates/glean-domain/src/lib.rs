//! Glean Domain Layer
//!
//! This crate contains the data model and the storage contract shared by every
//! other Glean crate. It defines what an extractor is, what extraction produces,
//! how failures are classified, and the trait boundaries that storage backends
//! implement.
//!
//! ## Key Concepts
//!
//! - **Extractor**: A named, persisted definition of how to pull fields out of a document
//! - **Field**: One named unit of extracted data
//! - **Report**: The persisted field output of one extraction run
//! - **ClassifiedError**: A storage failure tagged with a kind and a fatal hint
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - No I/O; backends live in `glean-store`
//! - Extraction logic lives in `glean-extractor`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod extractor;
pub mod field;
pub mod traits;

// Re-exports for convenience
pub use error::{classify, is_not_found, ClassifiedError, ErrorKind, Severity};
pub use extractor::{validate_name, Extractor, FieldRule, HtmlExtractor, NameError};
pub use field::{Field, FieldValue, Fields};
pub use traits::{ExtractorListing, ExtractorStore, ListingFailure, ReportSink};
