//! Error types for the render pipeline.
//!
//! [`RenderError`] covers every way a render can fail. None of them is fatal:
//! the pipeline turns each one into a diagnostic and an empty result, so the
//! variants mostly exist to pick the right message and level.

use std::io;
use std::path::PathBuf;

use tplview_content::ContentError;

/// Broad failure category, used to pick how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required file is missing or the output is unset.
    Readiness,
    /// A file could not be read, even after retrying.
    TransientIo,
    /// The content file extension is not supported.
    Format,
    /// The content document is malformed.
    ContentParse,
    /// The template failed to parse or evaluate.
    Template,
    /// The rendered text could not be written.
    Output,
}

/// Error type for render operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Template or content file missing, or no output path set.
    #[error("Unable to render as inputs or outputs not found or not specified")]
    NotReady,

    /// A file stayed unreadable after the retry.
    #[error("Unable to read file: {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Unsupported content type or malformed content.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Template syntax or evaluation error.
    #[error("Error: {0}")]
    Template(String),

    /// The output file could not be written.
    #[error("Unable to write output file: {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `render` was called before any content was set.
    #[error("No data loaded. Set content before calling render.")]
    ContentNotLoaded,

    /// `render` was called before a template was parsed.
    #[error("No template loaded. Call parse before calling render.")]
    TemplateNotLoaded,
}

impl RenderError {
    /// The failure category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            RenderError::NotReady => FailureKind::Readiness,
            RenderError::Unreadable { .. } => FailureKind::TransientIo,
            RenderError::Content(ContentError::UnsupportedFormat { .. }) => FailureKind::Format,
            RenderError::Content(_) => FailureKind::ContentParse,
            RenderError::Template(_)
            | RenderError::ContentNotLoaded
            | RenderError::TemplateNotLoaded => FailureKind::Template,
            RenderError::Output { .. } => FailureKind::Output,
        }
    }
}

// Keeps minijinja out of the public signatures.
impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        let mut message = err.to_string();
        if let Some(detail) = err.detail() {
            if !message.contains(detail) {
                message = format!("{} ({})", message, detail);
            }
        }
        RenderError::Template(message)
    }
}
