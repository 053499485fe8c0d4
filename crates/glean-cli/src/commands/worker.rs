//! Worker command implementation.

use crate::cli::WorkerArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use glean_worker::{HttpFetcher, Job, Orchestrator, Storage, Worker, WorkerConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Queue depth between the job reader and the worker
const QUEUE_CAPACITY: usize = 64;

/// Execute the worker loop over a job file or stdin.
pub async fn execute_worker(
    args: WorkerArgs,
    config: &WorkerConfig,
    storage: &Storage,
    formatter: &Formatter,
) -> Result<()> {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

    match args.jobs {
        Some(path) => {
            let contents = tokio::fs::read_to_string(&path).await?;
            let jobs = Job::parse_lines(&contents).map_err(|(line, e)| {
                CliError::InvalidInput(format!("{}:{}: {}", path.display(), line, e))
            })?;
            tracing::info!("Loaded {} jobs from {}", jobs.len(), path.display());
            tokio::spawn(async move {
                for job in jobs {
                    if tx.send(job).await.is_err() {
                        break;
                    }
                }
            });
        }
        None => {
            tokio::spawn(async move {
                let skipped = feed_lines(BufReader::new(tokio::io::stdin()), tx).await;
                if skipped > 0 {
                    tracing::warn!("Skipped {} unparseable job lines", skipped);
                }
            });
        }
    }

    let fetcher = HttpFetcher::from_config(config)?;
    let orchestrator = Orchestrator::new(storage.store(), storage.sink(), fetcher);
    let mut worker = Worker::new(orchestrator, config.max_consecutive_fatal);

    let outcome = worker.run(rx).await;
    println!("{}", formatter.format_metrics(worker.metrics()));
    outcome?;
    Ok(())
}

/// Forward JSON-lines jobs into the queue until input ends or the worker stops
///
/// Returns how many non-blank lines failed to parse.
async fn feed_lines<R>(reader: R, tx: mpsc::Sender<Job>) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut skipped = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read job input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Job>(&line) {
            Ok(job) => {
                if tx.send(job).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Skipping job line: {}", e);
                skipped += 1;
            }
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_lines_skips_bad_input() {
        let input: &[u8] = b"{\"url\":\"u1\",\"extractor_id\":\"e\",\"report_id\":\"r1\"}\n\nnot json\n{\"url\":\"u2\",\"extractor_id\":\"e\",\"report_id\":\"r2\"}\n";
        let (tx, mut rx) = mpsc::channel(8);

        let skipped = feed_lines(input, tx).await;
        assert_eq!(skipped, 1);

        assert_eq!(rx.recv().await.unwrap().report_id, "r1");
        assert_eq!(rx.recv().await.unwrap().report_id, "r2");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_feed_lines_stops_when_worker_gone() {
        let input: &[u8] = b"{\"url\":\"u1\",\"extractor_id\":\"e\",\"report_id\":\"r1\"}\n";
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        assert_eq!(feed_lines(input, tx).await, 0);
    }
}
