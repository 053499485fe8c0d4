//! Run command implementation.

use crate::cli::RunArgs;
use crate::error::Result;
use crate::output::Formatter;
use glean_worker::{HttpFetcher, Job, Orchestrator, Storage, WorkerConfig};

/// Execute a single extraction job.
pub async fn execute_run(
    args: RunArgs,
    config: &WorkerConfig,
    storage: &Storage,
    formatter: &Formatter,
) -> Result<()> {
    let fetcher = HttpFetcher::from_config(config)?;
    let orchestrator = Orchestrator::new(storage.store(), storage.sink(), fetcher);

    let job = Job::new(args.url, args.extractor_id, args.report_id);
    let report = orchestrator.run(&job).await?;

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}
