//! Exposes normalized content to MiniJinja.
//!
//! Content is not serialized into engine values up front. Each mapping and
//! sequence is seen by the engine as a [`ContentObject`]: a shared handle on
//! the document root plus the position of the node inside it. Lookups are
//! answered on demand with the same case-sensitive names the content tree
//! uses, and reaching a child never copies the document.
//!
//! ```rust
//! use tplview_content::{normalize, ContentFormat};
//! use tplview_render::context::template_context;
//!
//! let content = normalize(r#"{"Title":"X"}"#, ContentFormat::Json).unwrap();
//! let env = minijinja::Environment::new();
//! let out = env
//!     .render_str("{{ content.Title }}|{{ content.title }}", template_context(&content))
//!     .unwrap();
//! assert_eq!(out, "X|");
//! ```

use std::sync::Arc;

use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use tplview_content::{ContentValue, NormalizedContent};

static NULL: ContentValue = ContentValue::Null;

/// A mapping or sequence from a content tree, seen by the engine as an object.
///
/// `path` holds one position per level below the root: the entry index for
/// mappings, the item index for sequences.
#[derive(Debug)]
pub struct ContentObject {
    root: Arc<ContentValue>,
    path: Vec<usize>,
}

impl ContentObject {
    /// Wraps a whole tree. The object stands for the root node.
    pub fn new(root: Arc<ContentValue>) -> Self {
        Self {
            root,
            path: Vec::new(),
        }
    }

    /// The node this object stands for.
    pub fn node(&self) -> &ContentValue {
        self.path.iter().fold(&*self.root, |node, &index| match node {
            ContentValue::Mapping(map) => map.get_index(index).map_or(&NULL, |(_, v)| v),
            ContentValue::Sequence(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        })
    }

    /// Whether `other` shares this object's document.
    pub fn shares_root(&self, other: &ContentObject) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    fn child(&self, index: usize, value: &ContentValue) -> Value {
        match value {
            ContentValue::Sequence(_) | ContentValue::Mapping(_) => {
                let mut path = Vec::with_capacity(self.path.len() + 1);
                path.extend_from_slice(&self.path);
                path.push(index);
                Value::from_object(ContentObject {
                    root: Arc::clone(&self.root),
                    path,
                })
            }
            scalar => scalar_value(scalar),
        }
    }
}

impl Object for ContentObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        match self.node() {
            ContentValue::Sequence(_) => ObjectRepr::Seq,
            _ => ObjectRepr::Map,
        }
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match self.node() {
            ContentValue::Mapping(map) => {
                let (index, _, value) = map.get_full(key.as_str()?)?;
                Some(self.child(index, value))
            }
            ContentValue::Sequence(items) => {
                let index = key.as_usize()?;
                items.get(index).map(|value| self.child(index, value))
            }
            _ => None,
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        match self.node() {
            ContentValue::Mapping(map) => {
                Enumerator::Values(map.keys().map(|k| Value::from(k.as_str())).collect())
            }
            ContentValue::Sequence(items) => Enumerator::Seq(items.len()),
            _ => Enumerator::NonEnumerable,
        }
    }
}

fn scalar_value(value: &ContentValue) -> Value {
    match value {
        ContentValue::Bool(b) => Value::from(*b),
        ContentValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        ContentValue::String(s) => Value::from(s.as_str()),
        _ => Value::from(()),
    }
}

/// Converts one content node into an engine value.
///
/// Scalars become native values. A container is copied once and wrapped.
pub fn to_value(value: &ContentValue) -> Value {
    match value {
        ContentValue::Sequence(_) | ContentValue::Mapping(_) => {
            Value::from_object(ContentObject::new(Arc::new(value.clone())))
        }
        scalar => scalar_value(scalar),
    }
}

/// The root context for a render: an object whose only key is `content`.
///
/// The document is copied once per call; everything reached from it during
/// the render shares that copy.
pub fn template_context(content: &NormalizedContent) -> Value {
    Value::from_object(ContentObject::new(Arc::new(ContentValue::Mapping(
        content.root().clone(),
    ))))
}
