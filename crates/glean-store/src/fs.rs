//! Filesystem backends
//!
//! One file per record under a base directory. Records are replaced with a
//! write-temp-then-rename so a reader never observes a half-written file.
//! Concurrent writers are not coordinated beyond that: a listing taken by
//! `get_all` or `delete` can be stale by the time it is acted on.

use crate::codec;
use glean_domain::{
    validate_name, ClassifiedError, Extractor, ExtractorListing, ExtractorStore, Fields,
    ListingFailure, ReportSink, Severity,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Extension of extractor records
pub const EXTRACTOR_EXTENSION: &str = "toml";

/// Extension of report records
pub const REPORT_EXTENSION: &str = "json";

/// Extractor store keeping one TOML file per extractor
///
/// Record path: `<base_path>/<name>.toml`.
#[derive(Debug, Clone)]
pub struct FileSystemExtractorStore {
    base_path: PathBuf,
}

impl FileSystemExtractorStore {
    /// Create a store rooted at `base_path`
    ///
    /// The directory is created on the first save.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory holding the records
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the record for `id`
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", id, EXTRACTOR_EXTENSION))
    }

    /// Identifiers of every record in the base directory, sorted
    fn list_ids(&self) -> io::Result<Vec<String>> {
        let suffix = format!(".{}", EXTRACTOR_EXTENSION);
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            // Hidden files include in-flight temp files
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(id) = file_name.strip_suffix(&suffix) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl ExtractorStore for FileSystemExtractorStore {
    fn get_all(&self) -> Result<ExtractorListing, ClassifiedError> {
        let ids = self.list_ids().map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot list extractors in {}", self.base_path.display()),
                Severity::Fatal,
            )
            .with_source(e)
        })?;

        let mut listing = ExtractorListing::default();
        for id in ids {
            match self.get(&id) {
                Ok(extractor) => listing.extractors.push(extractor),
                Err(error) => {
                    warn!("Skipping extractor record '{}': {}", id, error);
                    listing.failures.push(ListingFailure { id, error });
                }
            }
        }

        debug!(
            "Listed {} extractors ({} unreadable) in {}",
            listing.extractors.len(),
            listing.failures.len(),
            self.base_path.display()
        );
        Ok(listing)
    }

    fn save(&self, extractor: &Extractor) -> Result<String, ClassifiedError> {
        let name = extractor.name();
        codec::check_name("extractor", name)?;

        let contents = codec::extractor_to_toml(extractor)?;
        let path = self.record_path(name);
        write_atomic(&self.base_path, &path, contents.as_bytes()).map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot write extractor record {}", path.display()),
                Severity::Fatal,
            )
            .with_source(e)
        })?;

        info!("Saved extractor '{}' to {}", name, path.display());
        Ok(name.to_string())
    }

    fn get(&self, id: &str) -> Result<Extractor, ClassifiedError> {
        // An identifier that cannot name a file was never written
        if let Err(e) = validate_name(id) {
            return Err(ClassifiedError::not_found(format!("extractor '{}'", id)).with_source(e));
        }

        let path = self.record_path(id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ClassifiedError::not_found(format!("extractor '{}'", id)).with_source(e));
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(ClassifiedError::malformed(format!(
                    "extractor record {} is not valid UTF-8",
                    path.display()
                ))
                .with_source(e));
            }
            Err(e) => {
                return Err(ClassifiedError::unknown(
                    format!("cannot read extractor record {}", path.display()),
                    Severity::Fatal,
                )
                .with_source(e));
            }
        };

        codec::extractor_from_toml(id, &contents)
    }

    fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
        let ids = match self.list_ids() {
            Ok(ids) => ids,
            // No directory means no records
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(ClassifiedError::unknown(
                    format!("cannot list extractors in {}", self.base_path.display()),
                    Severity::Recoverable,
                )
                .with_source(e));
            }
        };

        if !ids.iter().any(|candidate| candidate == id) {
            return Err(ClassifiedError::not_found(format!("extractor '{}'", id)));
        }

        let path = self.record_path(id);
        fs::remove_file(&path).map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot remove extractor record {}", path.display()),
                Severity::Recoverable,
            )
            .with_source(e)
        })?;

        info!("Deleted extractor '{}'", id);
        Ok(())
    }
}

/// Report sink keeping one JSON file per report
///
/// Record path: `<base_path>/<report_id>.json`. Reusing a report id replaces
/// the previous report.
#[derive(Debug, Clone)]
pub struct FileSystemReportSink {
    base_path: PathBuf,
}

impl FileSystemReportSink {
    /// Create a sink rooted at `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory holding the reports
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the report `report_id`
    pub fn report_path(&self, report_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", report_id, REPORT_EXTENSION))
    }
}

impl ReportSink for FileSystemReportSink {
    fn write_as_report(&self, report_id: &str, fields: &Fields) -> Result<(), ClassifiedError> {
        codec::check_name("report", report_id)?;

        let body = codec::report_to_json(report_id, fields)?;
        let path = self.report_path(report_id);
        write_atomic(&self.base_path, &path, body.as_bytes()).map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot write report {}", path.display()),
                Severity::Recoverable,
            )
            .with_source(e)
        })?;

        info!("Wrote report '{}' ({} fields)", report_id, fields.len());
        Ok(())
    }
}

/// Mode of persisted records, readable by other users
#[cfg(unix)]
const RECORD_MODE: u32 = 0o644;

/// Replace `target` with `contents` without exposing a partial file
fn write_atomic(dir: &Path, target: &Path, contents: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    // Temp files are created owner-only and the rename keeps that mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(RECORD_MODE))?;
    }
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
