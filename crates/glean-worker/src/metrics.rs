//! Job outcome counters for the worker

use crate::error::JobFailureKind;
use std::collections::BTreeMap;

/// Metrics collected while the worker runs
#[derive(Debug, Clone, Default)]
pub struct WorkerMetrics {
    /// Jobs that wrote a report
    pub succeeded: usize,

    /// Failed jobs per failure kind
    pub failed: BTreeMap<JobFailureKind, usize>,

    /// Current run of consecutive fatal failures
    pub consecutive_fatal: usize,

    /// Total runtime in seconds
    pub total_runtime_secs: u64,
}

impl WorkerMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful job; ends any fatal run
    pub fn record_success(&mut self) {
        self.succeeded += 1;
        self.consecutive_fatal = 0;
    }

    /// Record a failed job
    pub fn record_failure(&mut self, kind: JobFailureKind, fatal: bool) {
        *self.failed.entry(kind).or_insert(0) += 1;
        if fatal {
            self.consecutive_fatal += 1;
        } else {
            self.consecutive_fatal = 0;
        }
    }

    /// Get total failed jobs across all kinds
    pub fn total_failed(&self) -> usize {
        self.failed.values().sum()
    }

    /// Get total jobs processed
    pub fn total_jobs(&self) -> usize {
        self.succeeded + self.total_failed()
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Worker Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Jobs processed: {}", self.total_jobs()),
            format!("Succeeded: {}", self.succeeded),
            format!("Total runtime: {}s", self.total_runtime_secs),
        ];

        if !self.failed.is_empty() {
            lines.push(String::new());
            lines.push("Failures by kind:".to_string());
            for (kind, count) in &self.failed {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total: {}", self.total_failed()));
        }

        lines.join("\n")
    }
}
