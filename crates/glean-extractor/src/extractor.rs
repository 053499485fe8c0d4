//! The extraction capability and variant dispatch

use crate::error::ExtractError;
use crate::html::CompiledRule;
use glean_domain::{validate_name, Extractor, Fields, HtmlExtractor};
use tracing::debug;

/// Capability shared by every extractor variant
pub trait Extract {
    /// Pull fields out of raw document content
    fn extract(&self, document: &[u8]) -> Result<Fields, ExtractError>;
}

impl Extract for Extractor {
    fn extract(&self, document: &[u8]) -> Result<Fields, ExtractError> {
        debug!(
            "Running {} extractor '{}' over {} bytes",
            self.kind(),
            self.name(),
            document.len()
        );
        match self {
            Extractor::Html(html) => html.extract(document),
        }
    }
}

impl Extract for HtmlExtractor {
    fn extract(&self, document: &[u8]) -> Result<Fields, ExtractError> {
        let rules = CompiledRule::compile_all(&self.fields)?;
        let text = String::from_utf8_lossy(document);
        Ok(crate::html::evaluate(&text, &rules))
    }
}

/// Check a definition before it is persisted
///
/// Verifies the name can identify a record and every rule compiles.
pub fn validate(extractor: &Extractor) -> Result<(), ExtractError> {
    validate_name(extractor.name())?;
    match extractor {
        Extractor::Html(html) => CompiledRule::compile_all(&html.fields).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_domain::FieldRule;

    fn html(name: &str, fields: Vec<FieldRule>) -> Extractor {
        Extractor::Html(HtmlExtractor {
            name: name.to_string(),
            fields,
        })
    }

    #[test]
    fn test_validate_accepts_good_definition() {
        let extractor = html("product-page", vec![FieldRule::text("title", "h1")]);
        assert!(validate(&extractor).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_selector() {
        let extractor = html("product-page", vec![FieldRule::text("title", "h1[")]);
        let err = validate(&extractor).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSelector { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_validate_rejects_bad_nested_selector() {
        let extractor = html(
            "product-page",
            vec![FieldRule::text("offers", ".offer").with_children(vec![FieldRule::text("price", ":::")])],
        );
        assert!(matches!(
            validate(&extractor),
            Err(ExtractError::InvalidSelector { ref field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_name() {
        let extractor = html("../etc", vec![]);
        assert!(matches!(validate(&extractor), Err(ExtractError::InvalidName(_))));
    }

    #[test]
    fn test_validate_rejects_unnamed_rule() {
        let extractor = html("ok", vec![FieldRule::text("", "h1")]);
        assert!(matches!(
            validate(&extractor),
            Err(ExtractError::UnnamedField { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_sibling_names() {
        let extractor = html(
            "product-page",
            vec![FieldRule::text("title", "h1"), FieldRule::text("title", "h2")],
        );
        assert!(matches!(
            validate(&extractor),
            Err(ExtractError::DuplicateField { ref field }) if field == "title"
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_nested_names() {
        let extractor = html(
            "product-page",
            vec![FieldRule::text("offers", ".offer").with_children(vec![
                FieldRule::text("price", ".price"),
                FieldRule::text("price", ".sale"),
            ])],
        );
        assert!(matches!(
            validate(&extractor),
            Err(ExtractError::DuplicateField { ref field }) if field == "price"
        ));
    }

    #[test]
    fn test_extract_fails_on_duplicate_names() {
        let extractor = html(
            "ok",
            vec![FieldRule::text("title", "h1"), FieldRule::text("title", "h2")],
        );
        let err = extractor
            .extract(b"<h1>First</h1><h2>Second</h2>")
            .unwrap_err();
        assert!(matches!(err, ExtractError::DuplicateField { .. }));
    }

    #[test]
    fn test_extract_fails_on_bad_selector() {
        let extractor = html("ok", vec![FieldRule::text("title", "h1[")]);
        assert!(extractor.extract(b"<h1>x</h1>").is_err());
    }
}
