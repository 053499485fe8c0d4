//! Field module - the data produced by running an extractor

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One named unit of extracted data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, taken from the rule that produced it
    pub name: String,

    /// Extracted value
    pub value: FieldValue,
}

impl Field {
    /// Create a field
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Value of an extracted field
///
/// Serializes as plain JSON: `null`, a string, an array, or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Selector matched nothing, or the requested attribute is absent
    Null,

    /// Text or attribute value
    Text(String),

    /// One value per match
    List(Vec<FieldValue>),

    /// Nested fields evaluated inside one element
    Group(Fields),
}

impl FieldValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

/// Ordered collection of fields produced by one extraction
///
/// Serialized as an object keyed by field name, in rule order.
///
/// # Examples
///
/// ```
/// use glean_domain::{Field, Fields};
///
/// let fields: Fields = vec![Field::new("title", "Widget".into())].into_iter().collect();
/// assert_eq!(fields.get("title").and_then(|v| v.as_text()), Some("Widget"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<Field>);

impl Fields {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn push(&mut self, field: Field) {
        self.0.push(field);
    }

    /// Value of the first field with the given name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Iterate over fields in order
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}
