//! Single-job orchestration: resolve, fetch, extract, report

use crate::error::JobError;
use crate::fetch::DocumentFetcher;
use crate::job::{Job, JobReport};
use glean_domain::{ExtractorStore, ReportSink};
use glean_extractor::Extract;
use tracing::{debug, info};

/// Runs jobs against a store, a report sink and a document fetcher
///
/// Steps run strictly in order and stop at the first failure. Nothing is
/// rolled back, and no report is written unless every earlier step succeeded.
pub struct Orchestrator<S, R, F> {
    store: S,
    sink: R,
    fetcher: F,
}

impl<S, R, F> Orchestrator<S, R, F>
where
    S: ExtractorStore,
    R: ReportSink,
    F: DocumentFetcher,
{
    /// Create an orchestrator over the given collaborators
    pub fn new(store: S, sink: R, fetcher: F) -> Self {
        Self {
            store,
            sink,
            fetcher,
        }
    }

    /// Execute one job
    ///
    /// # Errors
    ///
    /// The failing step's error, wrapped in the matching [`JobError`]
    /// variant without reclassification.
    pub async fn run(&self, job: &Job) -> Result<JobReport, JobError> {
        // Store and sink calls block this thread. Jobs run one at a time, so
        // they stay inline; concurrent jobs would need spawn_blocking.
        info!(
            "Starting job: extractor '{}', url '{}', report '{}'",
            job.extractor_id, job.url, job.report_id
        );

        let extractor = self
            .store
            .get(&job.extractor_id)
            .map_err(JobError::Resolve)?;
        debug!("Resolved extractor '{}' ({})", extractor.name(), extractor.kind());

        let document = self.fetcher.fetch(&job.url).await.map_err(JobError::Fetch)?;
        debug!("Fetched {} bytes from {}", document.len(), job.url);

        let fields = extractor.extract(&document).map_err(JobError::Extraction)?;

        self.sink
            .write_as_report(&job.report_id, &fields)
            .map_err(JobError::Report)?;

        info!(
            "Job complete: report '{}' with {} fields",
            job.report_id,
            fields.len()
        );
        Ok(JobReport {
            report_id: job.report_id.clone(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::StaticFetcher;
    use glean_domain::{
        ClassifiedError, Extractor, ExtractorListing, FieldRule, Fields, HtmlExtractor, Severity,
    };
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryStore {
        extractors: RefCell<BTreeMap<String, Extractor>>,
        corrupt: Vec<String>,
    }

    impl ExtractorStore for MemoryStore {
        fn get_all(&self) -> Result<ExtractorListing, ClassifiedError> {
            Ok(ExtractorListing {
                extractors: self.extractors.borrow().values().cloned().collect(),
                failures: Vec::new(),
            })
        }

        fn save(&self, extractor: &Extractor) -> Result<String, ClassifiedError> {
            self.extractors
                .borrow_mut()
                .insert(extractor.name().to_string(), extractor.clone());
            Ok(extractor.name().to_string())
        }

        fn get(&self, id: &str) -> Result<Extractor, ClassifiedError> {
            if self.corrupt.iter().any(|c| c == id) {
                return Err(ClassifiedError::malformed(format!("extractor '{}'", id)));
            }
            self.extractors
                .borrow()
                .get(id)
                .cloned()
                .ok_or_else(|| ClassifiedError::not_found(format!("extractor '{}'", id)))
        }

        fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
            self.extractors
                .borrow_mut()
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| ClassifiedError::not_found(format!("extractor '{}'", id)))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        reports: RefCell<BTreeMap<String, Fields>>,
        fail: bool,
    }

    impl ReportSink for MemorySink {
        fn write_as_report(&self, report_id: &str, fields: &Fields) -> Result<(), ClassifiedError> {
            if self.fail {
                return Err(ClassifiedError::unknown("sink offline", Severity::Recoverable));
            }
            self.reports
                .borrow_mut()
                .insert(report_id.to_string(), fields.clone());
            Ok(())
        }
    }

    fn title_extractor(name: &str, selector: &str) -> Extractor {
        Extractor::Html(HtmlExtractor {
            name: name.to_string(),
            fields: vec![FieldRule::text("title", selector)],
        })
    }

    fn fetcher() -> StaticFetcher {
        StaticFetcher::new().with_document("http://shop.test/widget", "<h1>Widget</h1>")
    }

    #[tokio::test]
    async fn test_successful_job_writes_report() {
        let store = MemoryStore::default();
        store.save(&title_extractor("product-page", "h1")).unwrap();
        let sink = MemorySink::default();
        let orchestrator = Orchestrator::new(&store, &sink, fetcher());

        let report = orchestrator
            .run(&Job::new("http://shop.test/widget", "product-page", "report-42"))
            .await
            .unwrap();

        assert_eq!(report.report_id, "report-42");
        assert_eq!(
            serde_json::to_value(&report.fields).unwrap(),
            serde_json::json!({"title": "Widget"})
        );
        assert_eq!(sink.reports.borrow().get("report-42"), Some(&report.fields));
    }

    #[tokio::test]
    async fn test_unknown_extractor_writes_nothing() {
        let store = MemoryStore::default();
        let sink = MemorySink::default();
        let orchestrator = Orchestrator::new(&store, &sink, fetcher());

        let err = orchestrator
            .run(&Job::new("http://shop.test/widget", "missing", "report-42"))
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Resolve(_)));
        assert!(err.is_not_found());
        assert!(sink.reports.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_extractor_is_fatal() {
        let store = MemoryStore {
            corrupt: vec!["broken".to_string()],
            ..Default::default()
        };
        let sink = MemorySink::default();
        let orchestrator = Orchestrator::new(&store, &sink, fetcher());

        let err = orchestrator
            .run(&Job::new("http://shop.test/widget", "broken", "r"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_report() {
        let store = MemoryStore::default();
        store.save(&title_extractor("product-page", "h1")).unwrap();
        let sink = MemorySink::default();
        let orchestrator = Orchestrator::new(&store, &sink, StaticFetcher::new());

        let err = orchestrator
            .run(&Job::new("http://shop.test/gone", "product-page", "r"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Fetch(FetchError::Status { status: 404, .. })));
        assert!(sink.reports.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_bad_selector_is_extraction_error() {
        let store = MemoryStore::default();
        store.save(&title_extractor("broken-rule", "h1[")).unwrap();
        let sink = MemorySink::default();
        let orchestrator = Orchestrator::new(&store, &sink, fetcher());

        let err = orchestrator
            .run(&Job::new("http://shop.test/widget", "broken-rule", "r"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Extraction(_)));
        assert!(sink.reports.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_report_failure_is_surfaced() {
        let store = MemoryStore::default();
        store.save(&title_extractor("product-page", "h1")).unwrap();
        let sink = MemorySink {
            fail: true,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(&store, &sink, fetcher());

        let err = orchestrator
            .run(&Job::new("http://shop.test/widget", "product-page", "r"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Report(_)));
        assert!(!err.is_fatal());
    }
}
