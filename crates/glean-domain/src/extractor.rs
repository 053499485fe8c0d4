//! Extractor definitions - named rule sets describing how to pull fields from a document

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Polymorphic extractor definition
///
/// Variants are discriminated by a `kind` key in every persisted form, so a
/// backend decodes a record by looking at the tag rather than guessing the type.
///
/// # Examples
///
/// ```
/// use glean_domain::{Extractor, FieldRule, HtmlExtractor};
///
/// let extractor = Extractor::Html(HtmlExtractor {
///     name: "product-page".to_string(),
///     fields: vec![FieldRule::text("title", "h1")],
/// });
/// assert_eq!(extractor.name(), "product-page");
/// assert_eq!(extractor.kind(), "html");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extractor {
    /// Markup document extractor driven by CSS selectors
    Html(HtmlExtractor),
}

impl Extractor {
    /// Unique name, also used as the storage identifier
    pub fn name(&self) -> &str {
        match self {
            Extractor::Html(html) => &html.name,
        }
    }

    /// Discriminator value written alongside the persisted record
    pub fn kind(&self) -> &'static str {
        match self {
            Extractor::Html(_) => "html",
        }
    }

    /// Top-level field rules in declaration order
    pub fn rules(&self) -> &[FieldRule] {
        match self {
            Extractor::Html(html) => &html.fields,
        }
    }
}

impl From<HtmlExtractor> for Extractor {
    fn from(html: HtmlExtractor) -> Self {
        Extractor::Html(html)
    }
}

/// Extractor for HTML (and other markup) documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlExtractor {
    /// Unique extractor name
    pub name: String,

    /// Ordered field rules
    #[serde(default)]
    pub fields: Vec<FieldRule>,
}

/// One field-extraction rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Name of the produced field
    pub name: String,

    /// Selector evaluated relative to the enclosing scope
    pub selector: String,

    /// Read this attribute instead of the element text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Collect every match instead of the first one
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,

    /// Nested rules evaluated inside each matched element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldRule>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldRule {
    /// Rule reading the text of the first matching element
    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            attribute: None,
            multiple: false,
            children: Vec::new(),
        }
    }

    /// Read an attribute rather than text
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Collect every match
    pub fn all(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Evaluate nested rules inside each match
    pub fn with_children(mut self, children: Vec<FieldRule>) -> Self {
        self.children = children;
        self
    }
}

/// Reasons an identifier cannot name a storage record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Empty identifier
    #[error("name cannot be empty")]
    Empty,

    /// Leading dot would produce a hidden record
    #[error("name '{0}' cannot start with '.'")]
    Hidden(String),

    /// Character outside `[A-Za-z0-9._-]`
    #[error("name '{name}' contains invalid character {ch:?}")]
    InvalidCharacter {
        /// Offending name
        name: String,
        /// First invalid character
        ch: char,
    },
}

/// Check that an identifier maps to exactly one record under a base location
///
/// Extractor names and report ids both become `<base>/<id>.<ext>`, so path
/// separators and other special characters are rejected.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.starts_with('.') {
        return Err(NameError::Hidden(name.to_string()));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(NameError::InvalidCharacter {
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_page() -> Extractor {
        Extractor::Html(HtmlExtractor {
            name: "product-page".to_string(),
            fields: vec![
                FieldRule::text("title", "h1"),
                FieldRule::text("links", "a").with_attribute("href").all(),
                FieldRule::text("offers", ".offer")
                    .all()
                    .with_children(vec![FieldRule::text("price", ".price")]),
            ],
        })
    }

    #[test]
    fn test_json_carries_discriminator() {
        let json = serde_json::to_value(product_page()).unwrap();
        assert_eq!(json["kind"], "html");
        assert_eq!(json["name"], "product-page");
        assert_eq!(json["fields"][0]["selector"], "h1");
        // Defaults are not written out
        assert!(json["fields"][0].get("multiple").is_none());
    }

    #[test]
    fn test_toml_representation() {
        let toml_str = toml::to_string(&product_page()).unwrap();
        assert!(toml_str.contains("kind = \"html\""));
        let parsed: Extractor = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, product_page());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = serde_json::from_str::<Extractor>(r#"{"kind": "pdf", "name": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_accessors() {
        let extractor = product_page();
        assert_eq!(extractor.name(), "product-page");
        assert_eq!(extractor.kind(), "html");
        assert_eq!(extractor.rules().len(), 3);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("product-page").is_ok());
        assert!(validate_name("report_42.v2").is_ok());
        assert_eq!(validate_name(""), Err(NameError::Empty));
        assert!(matches!(validate_name(".hidden"), Err(NameError::Hidden(_))));
        assert!(matches!(
            validate_name("../escape"),
            Err(NameError::Hidden(_))
        ));
        assert!(matches!(
            validate_name("a/b"),
            Err(NameError::InvalidCharacter { ch: '/', .. })
        ));
        assert!(matches!(
            validate_name("with space"),
            Err(NameError::InvalidCharacter { ch: ' ', .. })
        ));
    }
}
