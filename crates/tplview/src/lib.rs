//! # tplview - Live Template Preview
//!
//! `tplview` renders a template against a JSON or XML content file and
//! writes the result to an output file. In watch mode it renders again every
//! time either input is saved, so the output can be kept open in an editor
//! while the template is being written.
//!
//! This crate ties the pieces together:
//!
//! - [`tplview_content`]: JSON/XML normalization under the `content` key
//! - [`tplview_render`]: The render pipeline and diagnostics
//! - [`tplview_watch`]: File watches and the serialized render queue
//!
//! ## Example
//!
//! ```rust,no_run
//! use tplview::{Preview, PreviewConfig};
//!
//! let config = PreviewConfig::new()
//!     .with_template("invoice.liquid")
//!     .with_content("invoice.xml")
//!     .with_output("invoice.txt");
//!
//! let preview = Preview::new(config)?;
//! preview.render();
//! preview.start_watch();
//! // ... edit files, the output follows ...
//! preview.stop_watch();
//! print!("{}", preview.log());
//! # Ok::<(), tplview::PreviewError>(())
//! ```

mod config;
mod preview;
mod session;

pub use config::{Cli, PreviewConfig};
pub use preview::{Preview, PreviewBuilder, PreviewError};
pub use session::{run_session, EXIT_PROMPT};

pub use tplview_content;
pub use tplview_render;
pub use tplview_watch;
