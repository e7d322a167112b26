//! Chainable content renderer.
//!
//! [`ContentRenderer`] is the in-memory half of the pipeline: set content,
//! parse a template, render. No files are involved, which makes it the
//! easiest way to embed the preview rules in another program.
//!
//! ```rust
//! use tplview_render::ContentRenderer;
//!
//! let output = ContentRenderer::new()
//!     .set_content_json(r#"{"title":"Hello"}"#)?
//!     .parse("{{ content.title }}")?
//!     .render()?;
//! assert_eq!(output, "Hello");
//! # Ok::<(), tplview_render::RenderError>(())
//! ```

use std::sync::Arc;

use serde::Serialize;
use tplview_content::{normalize, ContentFormat, KeyCase, NormalizedContent};

use crate::engine::{CompiledTemplate, MiniJinjaEngine, TemplateEngine};
use crate::error::RenderError;

/// Holds one piece of content and one compiled template.
///
/// Content and template can be replaced independently; each call to
/// [`render`](Self::render) uses whatever is currently set.
pub struct ContentRenderer {
    engine: Arc<dyn TemplateEngine>,
    content: Option<NormalizedContent>,
    template: Option<Box<dyn CompiledTemplate>>,
}

impl ContentRenderer {
    /// Creates a renderer using the MiniJinja engine.
    pub fn new() -> Self {
        Self::with_engine(Arc::new(MiniJinjaEngine::new()))
    }

    /// Creates a renderer using a custom template engine.
    pub fn with_engine(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            engine,
            content: None,
            template: None,
        }
    }

    /// Sets the content from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Content`] if the text is not valid JSON.
    pub fn set_content_json(self, json: &str) -> Result<Self, RenderError> {
        self.set_content_text(json, ContentFormat::Json)
    }

    /// Sets the content from XML text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Content`] if the text is not well-formed XML.
    pub fn set_content_xml(self, xml: &str) -> Result<Self, RenderError> {
        self.set_content_text(xml, ContentFormat::Xml)
    }

    /// Sets the content from text in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Content`] if the text does not parse.
    pub fn set_content_text(self, raw: &str, format: ContentFormat) -> Result<Self, RenderError> {
        Ok(self.set_normalized(normalize(raw, format)?))
    }

    /// Sets the content from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Content`] if the value cannot be serialized.
    pub fn set_content<T: Serialize + ?Sized>(
        self,
        value: &T,
        case: KeyCase,
    ) -> Result<Self, RenderError> {
        Ok(self.set_normalized(NormalizedContent::from_serialize(value, case)?))
    }

    /// Sets already normalized content.
    pub fn set_normalized(mut self, content: NormalizedContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Compiles the template, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] on a syntax error. The previous
    /// template is dropped either way.
    pub fn parse(mut self, template: &str) -> Result<Self, RenderError> {
        self.template = None;
        self.template = Some(self.engine.parse(template)?);
        Ok(self)
    }

    pub fn content(&self) -> Option<&NormalizedContent> {
        self.content.as_ref()
    }

    /// Renders the current template against the current content.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ContentNotLoaded`] or
    /// [`RenderError::TemplateNotLoaded`] if either is missing, or
    /// [`RenderError::Template`] if evaluation fails.
    pub fn render(&self) -> Result<String, RenderError> {
        let content = self.content.as_ref().ok_or(RenderError::ContentNotLoaded)?;
        let template = self.template.as_ref().ok_or(RenderError::TemplateNotLoaded)?;
        template.render(content)
    }
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new()
    }
}
