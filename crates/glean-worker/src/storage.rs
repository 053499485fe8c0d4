//! Opening the configured storage backend

use crate::config::{StorageBackend, WorkerConfig};
use glean_domain::{ClassifiedError, ExtractorStore, ReportSink};
use glean_store::{FileSystemExtractorStore, FileSystemReportSink, SqliteStore};
use tracing::debug;

/// The extractor store and report sink selected by configuration
pub enum Storage {
    /// One file per record
    Filesystem {
        /// Extractor records
        store: FileSystemExtractorStore,
        /// Report records
        sink: FileSystemReportSink,
    },
    /// Both record types in one database
    Sqlite(SqliteStore),
}

impl Storage {
    /// Open the backend named in `config`
    pub fn open(config: &WorkerConfig) -> Result<Self, ClassifiedError> {
        match config.backend {
            StorageBackend::Filesystem => {
                debug!(
                    "Using filesystem storage: extractors in {}, reports in {}",
                    config.extractor_dir.display(),
                    config.report_dir.display()
                );
                Ok(Storage::Filesystem {
                    store: FileSystemExtractorStore::new(&config.extractor_dir),
                    sink: FileSystemReportSink::new(&config.report_dir),
                })
            }
            StorageBackend::Sqlite => {
                debug!("Using sqlite storage at {}", config.database_path.display());
                Ok(Storage::Sqlite(SqliteStore::new(&config.database_path)?))
            }
        }
    }

    /// Extractor store view
    pub fn store(&self) -> &dyn ExtractorStore {
        match self {
            Storage::Filesystem { store, .. } => store,
            Storage::Sqlite(db) => db,
        }
    }

    /// Report sink view
    pub fn sink(&self) -> &dyn ReportSink {
        match self {
            Storage::Filesystem { sink, .. } => sink,
            Storage::Sqlite(db) => db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_domain::{Extractor, FieldRule, HtmlExtractor};
    use tempfile::TempDir;

    fn sample() -> Extractor {
        Extractor::Html(HtmlExtractor {
            name: "sample".to_string(),
            fields: vec![FieldRule::text("title", "h1")],
        })
    }

    #[test]
    fn test_open_filesystem() {
        let dir = TempDir::new().unwrap();
        let config = WorkerConfig {
            extractor_dir: dir.path().join("extractors"),
            report_dir: dir.path().join("reports"),
            ..Default::default()
        };
        let storage = Storage::open(&config).unwrap();
        storage.store().save(&sample()).unwrap();
        assert!(dir.path().join("extractors").join("sample.toml").is_file());
    }

    #[test]
    fn test_open_sqlite() {
        let dir = TempDir::new().unwrap();
        let config = WorkerConfig {
            backend: StorageBackend::Sqlite,
            database_path: dir.path().join("glean.db"),
            ..Default::default()
        };
        let storage = Storage::open(&config).unwrap();
        storage.store().save(&sample()).unwrap();
        assert_eq!(storage.store().get("sample").unwrap(), sample());
    }

    #[test]
    fn test_open_sqlite_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let config = WorkerConfig {
            backend: StorageBackend::Sqlite,
            database_path: dir.path().join("no").join("such").join("glean.db"),
            ..Default::default()
        };
        let err = Storage::open(&config).err().unwrap();
        assert!(err.is_fatal());
    }
}
