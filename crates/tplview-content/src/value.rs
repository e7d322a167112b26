//! The dynamic value tree templates are rendered against.
//!
//! [`ContentValue`] is an open, loosely-typed tree: scalars, sequences and
//! mappings with string keys. Keys keep the exact spelling and order they had
//! in the source document, and lookups through [`Lookup`] are case-sensitive.
//!
//! ```rust
//! use tplview_content::{ContentValue, Lookup};
//!
//! let value = ContentValue::from(serde_json::json!({ "Title": "X" }));
//! assert_eq!(value.lookup("Title").and_then(ContentValue::as_str), Some("X"));
//! assert!(value.lookup("title").is_none());
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Number;

/// Ordered mapping used for objects in a [`ContentValue`] tree.
pub type ContentMap = IndexMap<String, ContentValue>;

/// A node of normalized content.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContentValue {
    /// JSON `null`, or an empty XML element.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<ContentValue>),
    Mapping(ContentMap),
}

/// Name-based access into a content tree.
///
/// This is the capability the template engine uses to resolve variables. It
/// never folds case: `Title` and `title` are different names.
pub trait Lookup {
    /// Returns the value stored under `name`, if any.
    fn lookup(&self, name: &str) -> Option<&ContentValue>;

    /// Resolves a dotted path such as `CATALOG.CD.0.TITLE`.
    ///
    /// Numeric segments index into sequences; all other segments are looked
    /// up by name.
    fn lookup_path(&self, path: &str) -> Option<&ContentValue> {
        let mut segments = path.split('.');
        let first = self.lookup(segments.next()?)?;
        segments.try_fold(first, |current, segment| current.child(segment))
    }
}

impl ContentValue {
    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContentValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[ContentValue]> {
        match self {
            ContentValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a mapping.
    pub fn as_mapping(&self) -> Option<&ContentMap> {
        match self {
            ContentValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ContentValue::Null)
    }

    /// Name used in diagnostics for the kind of value.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentValue::Null => "null",
            ContentValue::Bool(_) => "bool",
            ContentValue::Number(_) => "number",
            ContentValue::String(_) => "string",
            ContentValue::Sequence(_) => "sequence",
            ContentValue::Mapping(_) => "mapping",
        }
    }

    /// Steps one segment down: by key for mappings, by index for sequences.
    fn child(&self, segment: &str) -> Option<&ContentValue> {
        match self {
            ContentValue::Mapping(map) => map.get(segment),
            ContentValue::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

impl Lookup for ContentValue {
    fn lookup(&self, name: &str) -> Option<&ContentValue> {
        self.as_mapping().and_then(|map| map.get(name))
    }
}

impl From<serde_json::Value> for ContentValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ContentValue::Null,
            serde_json::Value::Bool(b) => ContentValue::Bool(b),
            serde_json::Value::Number(n) => ContentValue::Number(n),
            serde_json::Value::String(s) => ContentValue::String(s),
            serde_json::Value::Array(items) => {
                ContentValue::Sequence(items.into_iter().map(ContentValue::from).collect())
            }
            serde_json::Value::Object(map) => ContentValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, ContentValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ContentValue {
    fn from(s: &str) -> Self {
        ContentValue::String(s.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(s: String) -> Self {
        ContentValue::String(s)
    }
}

impl Serialize for ContentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentValue::Null => serializer.serialize_unit(),
            ContentValue::Bool(b) => serializer.serialize_bool(*b),
            ContentValue::Number(n) => n.serialize(serializer),
            ContentValue::String(s) => serializer.serialize_str(s),
            ContentValue::Sequence(items) => serializer.collect_seq(items),
            ContentValue::Mapping(map) => serializer.collect_map(map),
        }
    }
}

/// Scalars print their plain text; containers print as compact JSON.
impl fmt::Display for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentValue::Null => Ok(()),
            ContentValue::Bool(b) => write!(f, "{}", b),
            ContentValue::Number(n) => write!(f, "{}", n),
            ContentValue::String(s) => f.write_str(s),
            container => {
                let json = serde_json::to_string(container).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = ContentValue::from(json!({ "zeta": 1, "Alpha": 2, "mid": 3 }));
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "Alpha", "mid"]);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let value = ContentValue::from(json!({ "Title": "X" }));
        assert_eq!(value.lookup("Title"), Some(&ContentValue::from("X")));
        assert_eq!(value.lookup("title"), None);
        assert_eq!(value.lookup("TITLE"), None);
    }

    #[test]
    fn test_lookup_path_through_sequences() {
        let value = ContentValue::from(json!({
            "CATALOG": { "CD": [ { "TITLE": "A" }, { "TITLE": "B" } ] }
        }));
        assert_eq!(
            value.lookup_path("CATALOG.CD.1.TITLE").and_then(ContentValue::as_str),
            Some("B")
        );
        assert!(value.lookup_path("CATALOG.CD.2.TITLE").is_none());
        assert!(value.lookup_path("CATALOG.CD.x").is_none());
    }

    #[test]
    fn test_lookup_on_scalar_is_none() {
        assert!(ContentValue::from("text").lookup("anything").is_none());
    }

    #[test]
    fn test_serialize_round_trips_to_same_json() {
        let source = json!({ "a": [1, 2.5, null, true], "B": { "c": "d" } });
        let value = ContentValue::from(source.clone());
        assert_eq!(serde_json::to_value(&value).unwrap(), source);
    }

    #[test]
    fn test_display_scalars_and_containers() {
        assert_eq!(ContentValue::Null.to_string(), "");
        assert_eq!(ContentValue::from(json!(42)).to_string(), "42");
        assert_eq!(ContentValue::from("hi").to_string(), "hi");
        assert_eq!(ContentValue::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ContentValue::from(json!({})).kind(), "mapping");
        assert_eq!(ContentValue::from(json!([])).kind(), "sequence");
        assert_eq!(ContentValue::Null.kind(), "null");
    }
}
