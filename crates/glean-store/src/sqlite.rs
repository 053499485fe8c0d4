//! SQLite backend
//!
//! Extractors and reports share one database. Definitions are stored as
//! tagged JSON next to a denormalized `kind` column.

use crate::codec;
use glean_domain::{
    ClassifiedError, Extractor, ExtractorListing, ExtractorStore, Fields, ListingFailure,
    ReportSink, Severity,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// SQLite-based implementation of `ExtractorStore` and `ReportSink`
///
/// # Thread Safety
///
/// The connection sits behind a mutex, so one store can be shared across
/// threads; statements are serialized.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use glean_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("glean.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ClassifiedError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot open database {}", path.display()),
                Severity::Fatal,
            )
            .with_source(e)
        })?;
        conn.execute_batch(include_str!("schema.sql")).map_err(|e| {
            ClassifiedError::unknown("cannot initialize database schema", Severity::Fatal)
                .with_source(e)
        })?;
        debug!("Opened extractor database {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Stored body of a report, if one was written
    pub fn read_report(&self, report_id: &str) -> Result<Option<String>, ClassifiedError> {
        let conn = self.lock(Severity::Recoverable)?;
        conn.query_row(
            "SELECT body FROM reports WHERE report_id = ?1",
            params![report_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot read report '{}'", report_id),
                Severity::Recoverable,
            )
            .with_source(e)
        })
    }

    fn lock(&self, severity: Severity) -> Result<MutexGuard<'_, Connection>, ClassifiedError> {
        self.conn.lock().map_err(|_| {
            ClassifiedError::unknown("database connection lock poisoned", severity)
        })
    }

    fn list_names(&self) -> Result<Vec<String>, ClassifiedError> {
        let conn = self.lock(Severity::Fatal)?;
        let query = || -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT name FROM extractors ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        };
        query().map_err(|e| {
            ClassifiedError::unknown("cannot list extractors", Severity::Fatal).with_source(e)
        })
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn is_decode_failure(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..)
    )
}

impl ExtractorStore for SqliteStore {
    fn get_all(&self) -> Result<ExtractorListing, ClassifiedError> {
        // The connection lock is released before the per-record reads
        let names = self.list_names()?;

        let mut listing = ExtractorListing::default();
        for id in names {
            match self.get(&id) {
                Ok(extractor) => listing.extractors.push(extractor),
                Err(error) => {
                    warn!("Skipping extractor record '{}': {}", id, error);
                    listing.failures.push(ListingFailure { id, error });
                }
            }
        }
        Ok(listing)
    }

    fn save(&self, extractor: &Extractor) -> Result<String, ClassifiedError> {
        let name = extractor.name();
        codec::check_name("extractor", name)?;
        let definition = codec::extractor_to_json(extractor)?;

        let conn = self.lock(Severity::Fatal)?;
        conn.execute(
            "INSERT INTO extractors (name, kind, definition, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                 kind = excluded.kind,
                 definition = excluded.definition,
                 updated_at = excluded.updated_at",
            params![name, extractor.kind(), definition, now_secs()],
        )
        .map_err(|e| {
            ClassifiedError::unknown(format!("cannot save extractor '{}'", name), Severity::Fatal)
                .with_source(e)
        })?;

        info!("Saved extractor '{}'", name);
        Ok(name.to_string())
    }

    fn get(&self, id: &str) -> Result<Extractor, ClassifiedError> {
        let row: Option<(String, String)> = {
            let conn = self.lock(Severity::Fatal)?;
            conn.query_row(
                "SELECT kind, definition FROM extractors WHERE name = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| {
                if is_decode_failure(&e) {
                    ClassifiedError::malformed(format!("extractor record '{}' does not decode", id))
                        .with_source(e)
                } else {
                    ClassifiedError::unknown(
                        format!("cannot read extractor '{}'", id),
                        Severity::Fatal,
                    )
                    .with_source(e)
                }
            })?
        };

        let Some((kind, definition)) = row else {
            return Err(ClassifiedError::not_found(format!("extractor '{}'", id)));
        };

        let extractor = codec::extractor_from_json(id, &definition)?;
        if extractor.kind() != kind {
            return Err(ClassifiedError::malformed(format!(
                "extractor record '{}' has kind '{}' but definition is '{}'",
                id,
                kind,
                extractor.kind()
            )));
        }
        Ok(extractor)
    }

    fn delete(&self, id: &str) -> Result<(), ClassifiedError> {
        let conn = self.lock(Severity::Recoverable)?;
        let recoverable = |e: rusqlite::Error| {
            ClassifiedError::unknown(format!("cannot delete extractor '{}'", id), Severity::Recoverable)
                .with_source(e)
        };

        let exists = conn
            .query_row("SELECT 1 FROM extractors WHERE name = ?1", params![id], |_| Ok(()))
            .optional()
            .map_err(recoverable)?
            .is_some();
        if !exists {
            return Err(ClassifiedError::not_found(format!("extractor '{}'", id)));
        }

        conn.execute("DELETE FROM extractors WHERE name = ?1", params![id])
            .map_err(recoverable)?;

        info!("Deleted extractor '{}'", id);
        Ok(())
    }
}

impl ReportSink for SqliteStore {
    fn write_as_report(&self, report_id: &str, fields: &Fields) -> Result<(), ClassifiedError> {
        codec::check_name("report", report_id)?;
        let body = codec::report_to_json(report_id, fields)?;

        let conn = self.lock(Severity::Recoverable)?;
        conn.execute(
            "INSERT INTO reports (report_id, body, written_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(report_id) DO UPDATE SET
                 body = excluded.body,
                 written_at = excluded.written_at",
            params![report_id, body, now_secs()],
        )
        .map_err(|e| {
            ClassifiedError::unknown(
                format!("cannot write report '{}'", report_id),
                Severity::Recoverable,
            )
            .with_source(e)
        })?;

        info!("Wrote report '{}' ({} fields)", report_id, fields.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_domain::{ErrorKind, Field, FieldRule, HtmlExtractor};

    fn extractor(name: &str) -> Extractor {
        Extractor::Html(HtmlExtractor {
            name: name.to_string(),
            fields: vec![FieldRule::text("title", "h1")],
        })
    }

    fn store() -> SqliteStore {
        SqliteStore::new(":memory:").unwrap()
    }

    #[test]
    fn test_store_initialization() {
        assert!(SqliteStore::new(":memory:").is_ok());
    }

    #[test]
    fn test_save_is_upsert() {
        let store = store();
        store.save(&extractor("a")).unwrap();
        let updated = Extractor::Html(HtmlExtractor {
            name: "a".to_string(),
            fields: vec![FieldRule::text("heading", "h2")],
        });
        store.save(&updated).unwrap();

        assert_eq!(store.get("a").unwrap(), updated);
        assert_eq!(store.get_all().unwrap().extractors.len(), 1);
    }

    #[test]
    fn test_undecodable_definition_is_malformed() {
        let store = store();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO extractors (name, kind, definition, updated_at) VALUES ('bad', 'html', '{not json', 0)",
                [],
            )
            .unwrap();

        let err = store.get("bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStoredData);
        assert!(err.is_fatal());

        let listing = store.get_all().unwrap();
        assert!(listing.extractors.is_empty());
        assert_eq!(listing.failures.len(), 1);
        assert_eq!(listing.failures[0].id, "bad");
    }

    #[test]
    fn test_kind_column_mismatch_is_malformed() {
        let store = store();
        store.save(&extractor("a")).unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute("UPDATE extractors SET kind = 'pdf' WHERE name = 'a'", [])
            .unwrap();

        assert_eq!(store.get("a").unwrap_err().kind(), ErrorKind::MalformedStoredData);
    }

    #[test]
    fn test_non_text_definition_is_malformed() {
        let store = store();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO extractors (name, kind, definition, updated_at) VALUES ('blob', 'html', x'00ff', 0)",
                [],
            )
            .unwrap();

        assert_eq!(store.get("blob").unwrap_err().kind(), ErrorKind::MalformedStoredData);
    }

    #[test]
    fn test_report_upsert() {
        let store = store();
        let first: Fields = vec![Field::new("title", "Old".into())].into_iter().collect();
        let second: Fields = vec![Field::new("title", "Widget".into())].into_iter().collect();

        store.write_as_report("report-42", &first).unwrap();
        store.write_as_report("report-42", &second).unwrap();

        let body = store.read_report("report-42").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, serde_json::json!({"title": "Widget"}));
        assert_eq!(store.read_report("missing").unwrap(), None);
    }

    #[test]
    fn test_shared_across_threads() {
        let store = std::sync::Arc::new(store());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.save(&extractor(&format!("e{}", i))).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get_all().unwrap().names(), vec!["e0", "e1", "e2", "e3"]);
    }
}
