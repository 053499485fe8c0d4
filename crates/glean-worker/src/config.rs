//! Configuration for the worker
//!
//! Storage locations, fetch behaviour, and the fatal-failure circuit.

use crate::error::WorkerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cap on a fetched document (10 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Which storage backend holds extractors and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One file per record under `extractor_dir` / `report_dir`
    #[default]
    Filesystem,
    /// Both record types in the database at `database_path`
    Sqlite,
}

/// Configuration for the extraction worker
///
/// # Examples
///
/// ```
/// use glean_worker::{StorageBackend, WorkerConfig};
///
/// let config = WorkerConfig::from_toml(r#"
///     backend = "sqlite"
///     database_path = "/var/lib/glean/glean.db"
/// "#).unwrap();
/// assert_eq!(config.backend, StorageBackend::Sqlite);
/// assert_eq!(config.max_consecutive_fatal, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Storage backend
    pub backend: StorageBackend,

    /// Directory of extractor records (filesystem backend)
    pub extractor_dir: PathBuf,

    /// Directory of reports (filesystem backend)
    pub report_dir: PathBuf,

    /// Database file (sqlite backend)
    pub database_path: PathBuf,

    /// Render proxy queried as `GET {endpoint}?url={url}`; direct fetch when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_endpoint: Option<String>,

    /// Maximum time for a single document fetch (seconds)
    pub fetch_timeout_secs: u64,

    /// Largest document body a fetch will accept
    pub max_document_bytes: u64,

    /// Consecutive fatal job failures before the worker gives up.
    /// 0 disables the limit.
    pub max_consecutive_fatal: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            extractor_dir: PathBuf::from("extractors"),
            report_dir: PathBuf::from("reports"),
            database_path: PathBuf::from("glean.db"),
            fetch_endpoint: None,
            fetch_timeout_secs: 30,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_consecutive_fatal: 5,
        }
    }
}

impl WorkerConfig {
    /// Get the fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.max_document_bytes == 0 {
            return Err("max_document_bytes must be greater than 0".to_string());
        }
        match self.backend {
            StorageBackend::Filesystem => {
                if self.extractor_dir.as_os_str().is_empty() {
                    return Err("extractor_dir must not be empty".to_string());
                }
                if self.report_dir.as_os_str().is_empty() {
                    return Err("report_dir must not be empty".to_string());
                }
            }
            StorageBackend::Sqlite => {
                if self.database_path.as_os_str().is_empty() {
                    return Err("database_path must not be empty".to_string());
                }
            }
        }
        if let Some(endpoint) = &self.fetch_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("fetch_endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Read and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WorkerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents).map_err(WorkerError::Config)?;
        config.validate().map_err(WorkerError::Config)?;
        Ok(config)
    }
}
