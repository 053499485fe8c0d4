//! Job and result types

use glean_domain::Fields;
use serde::{Deserialize, Serialize};

/// One unit of work: extract `url` with `extractor_id`, store as `report_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Document location
    pub url: String,
    /// Name of the stored extractor to apply
    pub extractor_id: String,
    /// Identifier the report is written under
    pub report_id: String,
}

impl Job {
    /// Create a job
    pub fn new(
        url: impl Into<String>,
        extractor_id: impl Into<String>,
        report_id: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            extractor_id: extractor_id.into(),
            report_id: report_id.into(),
        }
    }

    /// Parse one JSON object per non-blank line
    ///
    /// Returns the 1-based line number with the parse error.
    pub fn parse_lines(input: &str) -> Result<Vec<Job>, (usize, serde_json::Error)> {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| serde_json::from_str(line).map_err(|e| (i + 1, e)))
            .collect()
    }
}

/// Outcome of a successful job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    /// Identifier the report was written under
    pub report_id: String,
    /// What the extractor produced
    pub fields: Fields,
}
