//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use colored::*;
use glean_domain::{Extractor, ExtractorListing};
use glean_worker::{JobReport, WorkerMetrics};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an extractor listing, including skipped records.
    pub fn format_listing(&self, listing: &ExtractorListing) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_listing_json(listing),
            OutputFormat::Table => Ok(self.format_listing_table(listing)),
            OutputFormat::Quiet => Ok(listing.names().join("\n")),
        }
    }

    fn format_listing_json(&self, listing: &ExtractorListing) -> Result<String> {
        let failures: Vec<serde_json::Value> = listing
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "id": f.id,
                    "error": f.error.to_string(),
                })
            })
            .collect();
        let value = serde_json::json!({
            "extractors": listing.extractors,
            "failures": failures,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_listing_table(&self, listing: &ExtractorListing) -> String {
        let mut lines = Vec::new();
        if listing.extractors.is_empty() {
            lines.push(self.colorize("No extractors found.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Name", "Kind", "Fields"]);
            for extractor in &listing.extractors {
                let fields: Vec<&str> = extractor.rules().iter().map(|r| r.name.as_str()).collect();
                let fields = fields.join(", ");
                builder.push_record([extractor.name(), extractor.kind(), fields.as_str()]);
            }
            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            lines.push(table.to_string());
        }

        for failure in &listing.failures {
            lines.push(self.warning(&format!("Skipped '{}': {}", failure.id, failure.error)));
        }
        lines.join("\n")
    }

    /// Format one extractor definition.
    ///
    /// TOML except in JSON mode, so the output can be edited and saved back.
    pub fn format_extractor(&self, extractor: &Extractor) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(extractor)?),
            OutputFormat::Table | OutputFormat::Quiet => toml::to_string_pretty(extractor)
                .map_err(|e| CliError::InvalidInput(format!("Cannot render extractor: {}", e))),
        }
    }

    /// Format a completed job.
    pub fn format_report(&self, report: &JobReport) -> Result<String> {
        match self.format {
            OutputFormat::Quiet => Ok(report.report_id.clone()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                self.success(&format!("Report '{}' written", report.report_id)),
                serde_json::to_string_pretty(&report.fields)?
            )),
        }
    }

    /// Format worker metrics.
    pub fn format_metrics(&self, metrics: &WorkerMetrics) -> String {
        match self.format {
            OutputFormat::Quiet => format!("{}/{}", metrics.succeeded, metrics.total_jobs()),
            OutputFormat::Json | OutputFormat::Table => metrics.summary(),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
