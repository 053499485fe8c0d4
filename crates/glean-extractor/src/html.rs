//! CSS selector evaluation for HTML extractors

use crate::error::ExtractError;
use glean_domain::{Field, FieldRule, FieldValue, Fields};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// A field rule with its selector parsed
pub(crate) struct CompiledRule {
    name: String,
    selector: Selector,
    attribute: Option<String>,
    multiple: bool,
    children: Vec<CompiledRule>,
}

impl CompiledRule {
    /// Parse every selector in a rule tree, failing on the first bad one
    ///
    /// Sibling rules must have distinct names, since they become keys of
    /// the same report object.
    pub(crate) fn compile_all(rules: &[FieldRule]) -> Result<Vec<Self>, ExtractError> {
        let mut seen = HashSet::new();
        rules
            .iter()
            .map(|rule| {
                let compiled = Self::compile(rule)?;
                if !seen.insert(rule.name.as_str()) {
                    return Err(ExtractError::DuplicateField {
                        field: rule.name.clone(),
                    });
                }
                Ok(compiled)
            })
            .collect()
    }

    fn compile(rule: &FieldRule) -> Result<Self, ExtractError> {
        if rule.name.is_empty() {
            return Err(ExtractError::UnnamedField {
                selector: rule.selector.clone(),
            });
        }
        let selector =
            Selector::parse(&rule.selector).map_err(|e| ExtractError::InvalidSelector {
                field: rule.name.clone(),
                selector: rule.selector.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name: rule.name.clone(),
            selector,
            attribute: rule.attribute.clone(),
            multiple: rule.multiple,
            children: Self::compile_all(&rule.children)?,
        })
    }
}

/// Where a rule's selector is evaluated
#[derive(Clone, Copy)]
enum Scope<'a> {
    Document(&'a Html),
    Element(ElementRef<'a>),
}

impl<'a> Scope<'a> {
    fn select(self, selector: &Selector) -> Vec<ElementRef<'a>> {
        match self {
            Scope::Document(document) => document.select(selector).collect(),
            Scope::Element(element) => element.select(selector).collect(),
        }
    }
}

/// Evaluate compiled rules against a whole document
pub(crate) fn evaluate(document: &str, rules: &[CompiledRule]) -> Fields {
    let html = Html::parse_document(document);
    evaluate_in(Scope::Document(&html), rules)
}

fn evaluate_in(scope: Scope<'_>, rules: &[CompiledRule]) -> Fields {
    rules
        .iter()
        .map(|rule| {
            let matches = scope.select(&rule.selector);
            let value = if rule.multiple {
                FieldValue::List(matches.into_iter().map(|el| element_value(el, rule)).collect())
            } else {
                matches
                    .into_iter()
                    .next()
                    .map(|el| element_value(el, rule))
                    .unwrap_or(FieldValue::Null)
            };
            Field::new(rule.name.clone(), value)
        })
        .collect()
}

fn element_value(element: ElementRef<'_>, rule: &CompiledRule) -> FieldValue {
    if let Some(attribute) = &rule.attribute {
        return element
            .value()
            .attr(attribute)
            .map(|v| FieldValue::Text(v.trim().to_string()))
            .unwrap_or(FieldValue::Null);
    }
    if !rule.children.is_empty() {
        return FieldValue::Group(evaluate_in(Scope::Element(element), &rule.children));
    }
    FieldValue::Text(collapse_whitespace(&element.text().collect::<String>()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Big \n\t Widget  "), "Big Widget");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_first_match_wins() {
        let rules = CompiledRule::compile_all(&[FieldRule::text("item", "li")]).unwrap();
        let fields = evaluate("<ul><li>one</li><li>two</li></ul>", &rules);
        assert_eq!(fields.get("item").and_then(FieldValue::as_text), Some("one"));
    }

    #[test]
    fn test_missing_element_is_null() {
        let rules = CompiledRule::compile_all(&[FieldRule::text("title", "h2")]).unwrap();
        let fields = evaluate("<h1>Widget</h1>", &rules);
        assert!(fields.get("title").unwrap().is_null());
    }

    #[test]
    fn test_missing_attribute_is_null() {
        let rules =
            CompiledRule::compile_all(&[FieldRule::text("link", "a").with_attribute("href")])
                .unwrap();
        let fields = evaluate("<a>no href</a>", &rules);
        assert!(fields.get("link").unwrap().is_null());
    }

    #[test]
    fn test_same_name_at_different_levels_is_allowed() {
        let rules = CompiledRule::compile_all(&[FieldRule::text("name", ".shop")
            .with_children(vec![FieldRule::text("name", "h2")])])
        .unwrap();
        let fields = evaluate(r#"<div class="shop"><h2>Acme</h2></div>"#, &rules);
        let FieldValue::Group(group) = fields.get("name").unwrap() else {
            panic!("expected a group");
        };
        assert_eq!(group.get("name").and_then(FieldValue::as_text), Some("Acme"));
    }

    #[test]
    fn test_multiple_with_no_matches_is_empty_list() {
        let rules = CompiledRule::compile_all(&[FieldRule::text("items", "li").all()]).unwrap();
        let fields = evaluate("<p>nothing</p>", &rules);
        assert_eq!(fields.get("items"), Some(&FieldValue::List(Vec::new())));
    }
}
