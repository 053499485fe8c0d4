//! Glean Storage Layer
//!
//! Implements the `ExtractorStore` and `ReportSink` traits from `glean-domain`
//! over two interchangeable backends.
//!
//! # Architecture
//!
//! - [`FileSystemExtractorStore`] / [`FileSystemReportSink`]: one file per
//!   record, `<base>/<name>.toml` for extractors and `<base>/<report_id>.json`
//!   for reports, replaced atomically
//! - [`SqliteStore`]: both traits over one SQLite database
//!
//! Both backends classify failures identically, so callers can swap them
//! without touching error handling.
//!
//! # Examples
//!
//! ```no_run
//! use glean_domain::{Extractor, ExtractorStore, FieldRule, HtmlExtractor};
//! use glean_store::FileSystemExtractorStore;
//!
//! let store = FileSystemExtractorStore::new("/var/lib/glean/extractors");
//! let id = store.save(&Extractor::Html(HtmlExtractor {
//!     name: "product-page".to_string(),
//!     fields: vec![FieldRule::text("title", "h1")],
//! })).unwrap();
//! let extractor = store.get(&id).unwrap();
//! assert_eq!(extractor.name(), "product-page");
//! ```

#![warn(missing_docs)]

mod codec;
mod fs;
mod sqlite;

pub use fs::{FileSystemExtractorStore, FileSystemReportSink, EXTRACTOR_EXTENSION, REPORT_EXTENSION};
pub use sqlite::SqliteStore;
