//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait, the only thing the render
//! pipeline knows about template languages: parse text into a
//! [`CompiledTemplate`], then render that against [`NormalizedContent`]. The
//! default implementation is [`MiniJinjaEngine`].

use std::sync::Arc;

use minijinja::{Environment, UndefinedBehavior};
use tplview_content::NormalizedContent;

use crate::context::template_context;
use crate::error::RenderError;
use crate::filters::register_filters;

/// A template engine that can compile template text.
///
/// Parsing is separate from rendering so that syntax errors surface before
/// any content is touched.
pub trait TemplateEngine: Send + Sync {
    /// Compiles template text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the text is not a valid template.
    fn parse(&self, source: &str) -> Result<Box<dyn CompiledTemplate>, RenderError>;
}

/// A parsed template, ready to render.
pub trait CompiledTemplate: Send + Sync {
    /// Renders the template against content.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if evaluation fails.
    fn render(&self, content: &NormalizedContent) -> Result<String, RenderError>;
}

impl<E: TemplateEngine + ?Sized> TemplateEngine for Arc<E> {
    fn parse(&self, source: &str) -> Result<Box<dyn CompiledTemplate>, RenderError> {
        (**self).parse(source)
    }
}

/// Name under which a parsed template is stored in its environment.
const TEMPLATE_NAME: &str = "preview";

/// MiniJinja-based template engine.
///
/// Provides Jinja2-compatible syntax with loops, conditionals and filters,
/// plus the extra filters from [`register_filters`]. Undefined lookups are
/// chainable: `content.missing.deeper` renders as empty text instead of
/// failing, which suits previewing documents with optional fields.
///
/// # Example
///
/// ```rust
/// use tplview_content::{normalize, ContentFormat};
/// use tplview_render::{MiniJinjaEngine, TemplateEngine};
///
/// let engine = MiniJinjaEngine::new();
/// let content = normalize(r#"{"name":"World"}"#, ContentFormat::Json).unwrap();
///
/// let template = engine.parse("Hello, {{ content.name }}!").unwrap();
/// assert_eq!(template.render(&content).unwrap(), "Hello, World!");
/// ```
#[derive(Clone)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates a new MiniJinja engine with default filters registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_keep_trailing_newline(true);
        register_filters(&mut env);
        Self { env }
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// This allows registering custom filters, functions, or configuring the
    /// environment directly. Templates parsed afterwards see the changes.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn parse(&self, source: &str) -> Result<Box<dyn CompiledTemplate>, RenderError> {
        let mut env = self.env.clone();
        env.add_template_owned(TEMPLATE_NAME, source.to_string())?;
        Ok(Box::new(MiniJinjaTemplate { env }))
    }
}

/// A template compiled into its own copy of the environment.
struct MiniJinjaTemplate {
    env: Environment<'static>,
}

impl CompiledTemplate for MiniJinjaTemplate {
    fn render(&self, content: &NormalizedContent) -> Result<String, RenderError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        Ok(template.render(template_context(content))?)
    }
}
