//! Content document formats.

use std::fmt;
use std::path::Path;

use crate::error::ContentError;

/// Source format of a content document.
///
/// The format is decided by the file extension alone, compared
/// case-insensitively. The document text is never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFormat {
    Json,
    Xml,
}

/// Recognized content extensions, without the leading dot.
pub const CONTENT_EXTENSIONS: &[&str] = &["json", "xml"];

impl ContentFormat {
    /// Determines the format from a content path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnsupportedFormat`] for any extension other
    /// than `.json` or `.xml`, including a missing one.
    ///
    /// ```rust
    /// use tplview_content::ContentFormat;
    ///
    /// assert_eq!(ContentFormat::from_path("data/Feed.XML").unwrap(), ContentFormat::Xml);
    /// assert!(ContentFormat::from_path("data/feed.yaml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ContentError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }

    /// Maps a bare extension (no dot) to a format, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("json") {
            Some(ContentFormat::Json)
        } else if ext.eq_ignore_ascii_case("xml") {
            Some(ContentFormat::Xml)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentFormat::Json => "json",
            ContentFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentFormat::Json => f.write_str("JSON"),
            ContentFormat::Xml => f.write_str("XML"),
        }
    }
}
