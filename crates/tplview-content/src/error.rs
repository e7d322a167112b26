//! Error types for content normalization.

use std::path::PathBuf;

/// Errors that can occur while turning a content document into template data.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content file extension is neither `.json` nor `.xml`.
    #[error("Unsupported content type: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The JSON text is not well-formed.
    #[error("Invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    /// The XML text is not well-formed, or has no single root element.
    #[error("Invalid XML content: {message}")]
    Xml { message: String },

    /// The file bytes are not valid UTF-8 text.
    #[error("Invalid text encoding in {}: {message}", path.display())]
    Encoding { path: PathBuf, message: String },

    /// A serializable value could not be converted into content.
    #[error("Unable to serialize content: {0}")]
    Serialize(String),
}

impl ContentError {
    /// Create an XML error from any displayable message.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for ContentError {
    fn from(err: quick_xml::Error) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ContentError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::xml(err.to_string())
    }
}
