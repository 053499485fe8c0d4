//! Error types for extraction

use glean_domain::NameError;
use thiserror::Error;

/// Errors raised while running or validating an extractor
///
/// Extractor-internal failures, outside the storage classification.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A rule's selector does not parse
    #[error("Invalid selector '{selector}' for field '{field}': {reason}")]
    InvalidSelector {
        /// Field name of the offending rule
        field: String,
        /// Selector text as written
        selector: String,
        /// Parser message
        reason: String,
    },

    /// A rule has an empty name
    #[error("Field rule with selector '{selector}' has no name")]
    UnnamedField {
        /// Selector of the unnamed rule
        selector: String,
    },

    /// Two sibling rules share a name
    #[error("Field '{field}' is defined more than once at the same level")]
    DuplicateField {
        /// The repeated field name
        field: String,
    },

    /// The extractor name cannot identify a record
    #[error("Invalid extractor name: {0}")]
    InvalidName(#[from] NameError),
}
