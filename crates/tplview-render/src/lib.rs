//! # tplview-render - Render Pipeline for Template Previews
//!
//! `tplview-render` reads a template file and a content file, normalizes the
//! content, evaluates the template and writes the result to an output file.
//! It is built to be driven by file-change notifications: a failed render
//! never panics or returns an error, it logs a diagnostic and yields an
//! empty string.
//!
//! ## Core Concepts
//!
//! - [`RenderPipeline`]: One render cycle from files to output, with retry
//! - [`ContentRenderer`]: In-memory set-content, parse, render
//! - [`TemplateEngine`]: Pluggable template language, [`MiniJinjaEngine`] by default
//! - [`DiagnosticsSink`]: Where warnings and errors go ([`ConsoleLog`], [`MemoryLog`])
//! - [`FileSystem`]: File access seam ([`RealFs`], [`MockFs`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tplview_render::{ConsoleLog, RenderPaths, RenderPipeline};
//!
//! let pipeline = RenderPipeline::new(
//!     RenderPaths::new("invoice.liquid", "invoice.json", "preview.txt"),
//!     Arc::new(ConsoleLog::new()),
//! );
//!
//! let text = pipeline.render();
//! if !text.is_empty() {
//!     println!("{}", text);
//! }
//! ```
//!
//! ## Templates
//!
//! Templates use Jinja syntax. Content is always under the `content` key, so
//! a document `{"Title": "X"}` is reached as `{{ content.Title }}`. Lookups
//! are case-sensitive and missing keys render as empty text. On top of the
//! MiniJinja built-ins, `prepend`, `append`, `plus`, `minus` and `size` are
//! available.
//!
//! ## Retry
//!
//! Editors often hold a file open for a moment after saving. Each input read
//! that fails is retried once after [`RetryPolicy::delay`] (one second by
//! default). A second failure abandons the render.

pub mod context;
mod diagnostics;
mod engine;
mod error;
mod filters;
mod fs;
mod pipeline;
mod renderer;

pub use diagnostics::{ConsoleLog, DiagnosticsSink, Level, MemoryLog};
pub use engine::{CompiledTemplate, MiniJinjaEngine, TemplateEngine};
pub use error::{FailureKind, RenderError};
pub use filters::register_filters;
pub use fs::{FileSystem, MockFs, RealFs};
pub use pipeline::{RenderPaths, RenderPipeline, RetryPolicy, DEFAULT_OUTPUT};
pub use renderer::ContentRenderer;
