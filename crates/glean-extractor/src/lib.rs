//! Glean Extractor
//!
//! Runs extractor definitions against document content.
//!
//! # Overview
//!
//! An [`Extractor`](glean_domain::Extractor) is pure data: a name plus an
//! ordered set of field rules. This crate gives each variant its behaviour
//! through the [`Extract`] capability, and [`validate`] checks a definition
//! before it is persisted.
//!
//! # Architecture
//!
//! ```text
//! Document bytes → Extract (per variant) → Fields
//! ```
//!
//! # Example Usage
//!
//! ```
//! use glean_domain::{Extractor, FieldRule, HtmlExtractor};
//! use glean_extractor::Extract;
//!
//! let extractor = Extractor::Html(HtmlExtractor {
//!     name: "product-page".to_string(),
//!     fields: vec![FieldRule::text("title", "h1")],
//! });
//!
//! let fields = extractor.extract(b"<html><body><h1>Widget</h1></body></html>").unwrap();
//! assert_eq!(fields.get("title").and_then(|v| v.as_text()), Some("Widget"));
//! ```

#![warn(missing_docs)]

mod error;
mod extractor;
mod html;


pub use error::ExtractError;
pub use extractor::{validate, Extract};
