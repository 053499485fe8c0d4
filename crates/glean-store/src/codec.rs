//! Record encoding shared by the storage backends

use glean_domain::{validate_name, ClassifiedError, Extractor, Fields, Severity};

/// Reject identifiers that cannot name a record
///
/// Nothing has been written at this point, so the failure is recoverable.
pub(crate) fn check_name(what: &str, id: &str) -> Result<(), ClassifiedError> {
    validate_name(id).map_err(|e| {
        ClassifiedError::unknown(format!("invalid {} identifier '{}'", what, id), Severity::Recoverable)
            .with_source(e)
    })
}

/// Extractor definition as a TOML document
pub(crate) fn extractor_to_toml(extractor: &Extractor) -> Result<String, ClassifiedError> {
    toml::to_string_pretty(extractor).map_err(|e| {
        ClassifiedError::unknown(
            format!("cannot serialize extractor '{}'", extractor.name()),
            Severity::Fatal,
        )
        .with_source(e)
    })
}

/// Extractor definition as tagged JSON
pub(crate) fn extractor_to_json(extractor: &Extractor) -> Result<String, ClassifiedError> {
    serde_json::to_string(extractor).map_err(|e| {
        ClassifiedError::unknown(
            format!("cannot serialize extractor '{}'", extractor.name()),
            Severity::Fatal,
        )
        .with_source(e)
    })
}

pub(crate) fn extractor_from_toml(id: &str, contents: &str) -> Result<Extractor, ClassifiedError> {
    let extractor: Extractor = toml::from_str(contents).map_err(|e| {
        ClassifiedError::malformed(format!("extractor record '{}' does not decode", id)).with_source(e)
    })?;
    check_identity(id, extractor)
}

pub(crate) fn extractor_from_json(id: &str, contents: &str) -> Result<Extractor, ClassifiedError> {
    let extractor: Extractor = serde_json::from_str(contents).map_err(|e| {
        ClassifiedError::malformed(format!("extractor record '{}' does not decode", id)).with_source(e)
    })?;
    check_identity(id, extractor)
}

/// The name inside a record must agree with the key it is stored under
fn check_identity(id: &str, extractor: Extractor) -> Result<Extractor, ClassifiedError> {
    if extractor.name() != id {
        return Err(ClassifiedError::malformed(format!(
            "extractor record '{}' declares name '{}'",
            id,
            extractor.name()
        )));
    }
    Ok(extractor)
}

/// Report body as pretty JSON
pub(crate) fn report_to_json(report_id: &str, fields: &Fields) -> Result<String, ClassifiedError> {
    serde_json::to_string_pretty(fields).map_err(|e| {
        ClassifiedError::unknown(
            format!("cannot serialize report '{}'", report_id),
            Severity::Recoverable,
        )
        .with_source(e)
    })
}
