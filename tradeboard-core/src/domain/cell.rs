//! View-model cells: the values bound to template slots.
//!
//! A cell is either plain text (wrapped in the renderer's default element) or
//! a [`RichCell`] that names the element to create and its attributes.
//!
//! On the wire cells keep the dashboard's historical JSON shape:
//!
//! ```json
//! "No new trades today"
//! { "value": "US Equities", "htmlelement": "a", "attributes": "href=us-equities" }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One slot value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Rich(RichCell),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// The text content the bound element will carry.
    pub fn value(&self) -> &str {
        match self {
            Cell::Text(value) => value,
            Cell::Rich(rich) => &rich.value,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<RichCell> for Cell {
    fn from(rich: RichCell) -> Self {
        Cell::Rich(rich)
    }
}

/// A cell that specifies its own wrapping element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichCell {
    pub value: String,
    #[serde(rename = "htmlelement")]
    pub element: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl RichCell {
    pub fn new(element: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            element: element.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(key, value);
        self
    }
}

/// Ordered `key=value` pairs applied to a bound element.
///
/// Serialised as the semicolon-delimited string older templates expect
/// (`"href=abc;data-sign=+"`). Keys and values are not escaped: a `;` or `=`
/// inside either one corrupts the string form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the delimited form. Empty segments are skipped; a segment with
    /// no `=` becomes a key with an empty value.
    pub fn parse_delimited(text: &str) -> Self {
        let pairs = text
            .split(';')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();
        Self(pairs)
    }

    pub fn to_delimited(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_delimited())
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Attributes::parse_delimited(&text))
    }
}

/// Render a raw JSON column as slot text.
///
/// Strings pass through untouched, numbers use their JSON spelling, and
/// `null` becomes empty text.
pub fn column_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
