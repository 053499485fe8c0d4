//! Supervision loop feeding jobs to the orchestrator

use crate::error::{JobError, WorkerError};
use crate::fetch::DocumentFetcher;
use crate::job::{Job, JobReport};
use crate::metrics::WorkerMetrics;
use crate::orchestrator::Orchestrator;
use glean_domain::{ExtractorStore, ReportSink};
use std::time::Instant;
use tokio::sync::mpsc;

/// Background worker that runs queued jobs one at a time
///
/// A failed job is logged and counted, then the next job runs. The loop only
/// ends when the queue closes, on Ctrl+C, or after `max_consecutive_fatal`
/// fatal failures in a row.
///
/// # Examples
///
/// ```no_run
/// use glean_store::{FileSystemExtractorStore, FileSystemReportSink};
/// use glean_worker::{HttpFetcher, Job, Orchestrator, Worker, WorkerConfig};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = WorkerConfig::default();
///     let orchestrator = Orchestrator::new(
///         FileSystemExtractorStore::new(&config.extractor_dir),
///         FileSystemReportSink::new(&config.report_dir),
///         HttpFetcher::from_config(&config)?,
///     );
///     let mut worker = Worker::new(orchestrator, config.max_consecutive_fatal);
///
///     let (tx, rx) = mpsc::channel(16);
///     tx.send(Job::new("https://shop.example/widget", "product-page", "report-42")).await?;
///     drop(tx);
///
///     worker.run(rx).await?;
///     Ok(())
/// }
/// ```
pub struct Worker<S, R, F> {
    orchestrator: Orchestrator<S, R, F>,
    max_consecutive_fatal: usize,
    metrics: WorkerMetrics,
}

impl<S, R, F> Worker<S, R, F>
where
    S: ExtractorStore,
    R: ReportSink,
    F: DocumentFetcher,
{
    /// Create a worker; `max_consecutive_fatal = 0` never gives up
    pub fn new(orchestrator: Orchestrator<S, R, F>, max_consecutive_fatal: usize) -> Self {
        Self {
            orchestrator,
            max_consecutive_fatal,
            metrics: WorkerMetrics::new(),
        }
    }

    /// Run jobs until the channel closes or a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// [`WorkerError::TooManyFatalFailures`] once the fatal run reaches the
    /// configured limit.
    pub async fn run(&mut self, mut jobs: mpsc::Receiver<Job>) -> Result<(), WorkerError> {
        let started = Instant::now();
        tracing::info!(
            "Worker started (max consecutive fatal failures: {})",
            self.max_consecutive_fatal
        );

        let outcome = loop {
            tokio::select! {
                next = jobs.recv() => {
                    let Some(job) = next else {
                        tracing::info!("Job queue closed, stopping worker");
                        break Ok(());
                    };
                    if let Err(e) = self.process(&job).await {
                        break Err(e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping worker");
                    break Ok(());
                }
            }
        };

        self.metrics.total_runtime_secs += started.elapsed().as_secs();
        tracing::info!("Worker stopped. Final metrics:\n{}", self.metrics.summary());
        outcome
    }

    /// Run a single job and record its outcome
    ///
    /// Job failures are absorbed; only the fatal-run limit is an error.
    pub async fn process(&mut self, job: &Job) -> Result<Option<JobReport>, WorkerError> {
        match self.orchestrator.run(job).await {
            Ok(report) => {
                self.metrics.record_success();
                Ok(Some(report))
            }
            Err(e) => {
                self.record_failure(job, &e);
                if self.max_consecutive_fatal > 0
                    && self.metrics.consecutive_fatal >= self.max_consecutive_fatal
                {
                    tracing::error!(
                        "{} consecutive fatal failures, giving up",
                        self.metrics.consecutive_fatal
                    );
                    return Err(WorkerError::TooManyFatalFailures {
                        count: self.metrics.consecutive_fatal,
                        last: error_chain(&e),
                    });
                }
                Ok(None)
            }
        }
    }

    fn record_failure(&mut self, job: &Job, e: &JobError) {
        let kind = e.failure_kind();
        let fatal = e.is_fatal();
        if fatal {
            tracing::error!(
                "Job for report '{}' failed ({}): {}",
                job.report_id,
                kind,
                error_chain(e)
            );
        } else {
            tracing::warn!(
                "Job for report '{}' failed ({}): {}",
                job.report_id,
                kind,
                error_chain(e)
            );
        }
        self.metrics.record_failure(kind, fatal);
    }

    /// Get a reference to the worker's current metrics
    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }
}

/// Render an error with its sources, outermost first
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
