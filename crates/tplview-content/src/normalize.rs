//! Turning raw documents into template data.

use serde::Serialize;

use crate::case::KeyCase;
use crate::error::ContentError;
use crate::format::ContentFormat;
use crate::value::{ContentMap, ContentValue, Lookup};
use crate::xml::xml_to_json;

/// The single name templates use to reach the content document.
pub const ROOT_KEY: &str = "content";

const BOM: char = '\u{FEFF}';

/// Template data: a mapping with exactly one key, [`ROOT_KEY`], whose value is
/// the parsed document.
///
/// A template refers to document fields as `content.<field>`. Field names
/// keep the casing of the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedContent {
    root: ContentMap,
}

impl NormalizedContent {
    /// Wraps a document under the [`ROOT_KEY`].
    pub fn new(document: ContentValue) -> Self {
        let mut root = ContentMap::with_capacity(1);
        root.insert(ROOT_KEY.to_string(), document);
        Self { root }
    }

    /// Builds content from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Serialize`] if `value` cannot be represented
    /// as JSON (for example, a map with non-string keys).
    ///
    /// ```rust
    /// use serde::Serialize;
    /// use tplview_content::{KeyCase, Lookup, NormalizedContent};
    ///
    /// #[derive(Serialize)]
    /// struct Page { #[serde(rename = "Title")] title: String }
    ///
    /// let page = Page { title: "Home".into() };
    /// let content = NormalizedContent::from_serialize(&page, KeyCase::Camel).unwrap();
    /// assert!(content.lookup_path("content.title").is_some());
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(
        value: &T,
        case: KeyCase,
    ) -> Result<Self, ContentError> {
        let json =
            serde_json::to_value(value).map_err(|e| ContentError::Serialize(e.to_string()))?;
        Ok(Self::new(case.apply(ContentValue::from(json))))
    }

    /// The wrapped document.
    pub fn document(&self) -> &ContentValue {
        &self.root[ROOT_KEY]
    }

    /// The root mapping, holding only [`ROOT_KEY`].
    pub fn root(&self) -> &ContentMap {
        &self.root
    }

    pub fn into_document(mut self) -> ContentValue {
        self.root.swap_remove(ROOT_KEY).unwrap_or_default()
    }
}

impl Lookup for NormalizedContent {
    fn lookup(&self, name: &str) -> Option<&ContentValue> {
        self.root.get(name)
    }
}

impl Serialize for NormalizedContent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.root)
    }
}

/// Parses `raw` in the given format and wraps it as template data.
///
/// A leading byte-order mark is ignored.
///
/// XML is first converted to its JSON shape (see [`xml_to_json`]). The
/// document is then wrapped structurally, never by splicing text, so a
/// fragment that is only valid once wrapped is still rejected.
///
/// # Errors
///
/// Returns [`ContentError::Json`] or [`ContentError::Xml`] with the parser's
/// first failure message when `raw` is not well-formed.
///
/// ```rust
/// use tplview_content::{normalize, ContentFormat, Lookup};
///
/// let content = normalize(r#"{"Title":"X"}"#, ContentFormat::Json).unwrap();
/// assert_eq!(content.lookup_path("content.Title").unwrap().as_str(), Some("X"));
/// assert!(content.lookup_path("content.title").is_none());
/// ```
pub fn normalize(raw: &str, format: ContentFormat) -> Result<NormalizedContent, ContentError> {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    let json = match format {
        ContentFormat::Json => serde_json::from_str::<serde_json::Value>(raw)?,
        ContentFormat::Xml => xml_to_json(raw)?,
    };
    Ok(NormalizedContent::new(ContentValue::from(json)))
}
