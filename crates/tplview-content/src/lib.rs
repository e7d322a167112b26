//! # tplview-content - Template Data From JSON and XML
//!
//! `tplview-content` turns a content document into the data a template is
//! rendered against. Whatever the source format, the result has the same
//! shape: one root mapping with a single key, `content`, holding the parsed
//! document.
//!
//! ## Core Concepts
//!
//! - [`ContentFormat`]: JSON or XML, chosen by file extension only
//! - [`ContentValue`]: Dynamic value tree (null, bool, number, string, sequence, mapping)
//! - [`NormalizedContent`]: The `{ "content": <document> }` wrapper handed to templates
//! - [`Lookup`]: Case-sensitive, name-based access used for variable resolution
//! - [`xml_to_json`]: Converts XML into the JSON shape templates expect
//!
//! ## Quick Start
//!
//! ```rust
//! use tplview_content::{normalize, ContentFormat, Lookup};
//!
//! let xml = r#"<CATALOG><CD PRICE="10.90"><TITLE>Empire Burlesque</TITLE></CD></CATALOG>"#;
//! let content = normalize(xml, ContentFormat::Xml).unwrap();
//!
//! let price = content.lookup_path("content.CATALOG.CD.PRICE").unwrap();
//! assert_eq!(price.as_str(), Some("10.90"));
//! ```
//!
//! ## Key Casing
//!
//! Field names are never case-folded or reordered. A document with `"Title"`
//! is reached as `content.Title`; `content.title` resolves to nothing. Values
//! built from Rust types can opt into camelCase with [`KeyCase::Camel`].

mod case;
mod error;
mod format;
mod normalize;
mod value;
pub mod xml;

pub use case::{to_camel_case, KeyCase};
pub use error::ContentError;
pub use format::{ContentFormat, CONTENT_EXTENSIONS};
pub use normalize::{normalize, NormalizedContent, ROOT_KEY};
pub use value::{ContentMap, ContentValue, Lookup};
pub use xml::xml_to_json;
