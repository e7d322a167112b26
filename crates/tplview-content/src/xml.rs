//! XML to JSON conversion.
//!
//! XML documents are converted into the same shape a JSON document would
//! have, so templates address both formats the same way:
//!
//! | XML | JSON |
//! |-----|------|
//! | `<a>text</a>` | `"a": "text"` |
//! | `<a/>` | `"a": null` |
//! | `<a x="1"/>` | `"a": { "x": "1" }` |
//! | `<a x="1">text</a>` | `"a": { "x": "1", "#text": "text" }` |
//! | `<p><a/><b/></p>` | `"p": { "a": null, "b": null }` |
//! | `<p><a/><a/></p>` | `"p": { "a": [null, null] }` |
//!
//! Attribute values are always strings, element text is always a string,
//! and the root element becomes the single top-level key. The XML
//! declaration, comments, processing instructions and doctype are dropped.
//! CDATA sections are treated as text.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::ContentError;

/// Field name holding an element's text when the element also has attributes
/// or child elements.
pub const TEXT_FIELD: &str = "#text";

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    fields: Map<String, Value>,
    text: Vec<String>,
}

impl OpenElement {
    fn start(tag: &BytesStart<'_>) -> Result<Self, ContentError> {
        let mut fields = Map::new();
        for attr in tag.attributes() {
            let attr = attr?;
            let key = utf8(attr.key.as_ref())?;
            let value = attr.unescape_value()?.into_owned();
            insert_repeated(&mut fields, key, Value::String(value));
        }
        Ok(Self {
            name: utf8(tag.name().as_ref())?,
            fields,
            text: Vec::new(),
        })
    }

    fn push_text(&mut self, text: String) {
        if !text.is_empty() {
            self.text.push(text);
        }
    }

    fn add_child(&mut self, name: String, value: Value) {
        insert_repeated(&mut self.fields, name, value);
    }

    /// Collapses the element into its JSON value.
    fn finish(self) -> (String, Value) {
        let OpenElement {
            name,
            mut fields,
            mut text,
        } = self;

        let value = match (fields.is_empty(), text.len()) {
            (true, 0) => Value::Null,
            (true, _) => Value::String(text.concat()),
            (false, 0) => Value::Object(fields),
            (false, 1) => {
                fields.insert(TEXT_FIELD.to_string(), Value::String(text.remove(0)));
                Value::Object(fields)
            }
            (false, _) => {
                let parts = text.into_iter().map(Value::String).collect();
                fields.insert(TEXT_FIELD.to_string(), Value::Array(parts));
                Value::Object(fields)
            }
        };
        (name, value)
    }
}

/// Adds `value` under `name`, turning repeated names into a sequence.
fn insert_repeated(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<String, ContentError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ContentError::xml(format!("invalid UTF-8 in name: {}", e)))
}

/// Parses XML text and converts it to an equivalent JSON value.
///
/// The result is always an object with a single key, the root element name.
///
/// # Errors
///
/// Returns [`ContentError::Xml`] when the document is not well-formed, has no
/// root element, has more than one root element, or has text outside the
/// root element.
///
/// ```rust
/// use tplview_content::xml_to_json;
///
/// let json = xml_to_json(r#"<CD PRICE="10.90"><TITLE>Empire</TITLE></CD>"#).unwrap();
/// assert_eq!(json["CD"]["PRICE"], "10.90");
/// assert_eq!(json["CD"]["TITLE"], "Empire");
/// ```
pub fn xml_to_json(xml: &str) -> Result<Value, ContentError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ContentError::xml(format!("{} (at byte {})", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(tag) => {
                ensure_single_root(&root, &stack)?;
                stack.push(OpenElement::start(&tag)?);
            }
            Event::Empty(tag) => {
                ensure_single_root(&root, &stack)?;
                let (name, value) = OpenElement::start(&tag)?.finish();
                close_into(&mut stack, &mut root, name, value);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ContentError::xml("closing tag without a matching opening tag"))?;
                let (name, value) = element.finish();
                close_into(&mut stack, &mut root, name, value);
            }
            Event::Text(text) => {
                let text = text.unescape()?.into_owned();
                append_text(&mut stack, text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                append_text(&mut stack, text)?;
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions and doctype
            // carry no content.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ContentError::xml(format!(
            "unexpected end of document: <{}> is not closed",
            open.name
        )));
    }

    let (name, value) = root.ok_or_else(|| ContentError::xml("document has no root element"))?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

fn ensure_single_root(
    root: &Option<(String, Value)>,
    stack: &[OpenElement],
) -> Result<(), ContentError> {
    match root {
        Some((name, _)) if stack.is_empty() => Err(ContentError::xml(format!(
            "document has more than one root element (after <{}>)",
            name
        ))),
        _ => Ok(()),
    }
}

fn close_into(
    stack: &mut [OpenElement],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) {
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => *root = Some((name, value)),
    }
}

fn append_text(stack: &mut [OpenElement], text: String) -> Result<(), ContentError> {
    match stack.last_mut() {
        Some(element) => {
            element.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ContentError::xml(format!(
            "text outside of the root element: {:?}",
            text.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_element_becomes_string() {
        let json = xml_to_json("<title>Hello</title>").unwrap();
        assert_eq!(json, json!({ "title": "Hello" }));
    }

    #[test]
    fn test_empty_element_becomes_null() {
        assert_eq!(xml_to_json("<a/>").unwrap(), json!({ "a": null }));
        assert_eq!(xml_to_json("<a></a>").unwrap(), json!({ "a": null }));
    }

    #[test]
    fn test_attributes_become_string_fields() {
        let json = xml_to_json(r#"<CD PRICE="10.90" YEAR="1985"/>"#).unwrap();
        assert_eq!(json, json!({ "CD": { "PRICE": "10.90", "YEAR": "1985" } }));
    }

    #[test]
    fn test_attributes_with_text_use_text_field() {
        let json = xml_to_json(r#"<price currency="USD">10.90</price>"#).unwrap();
        assert_eq!(
            json,
            json!({ "price": { "currency": "USD", "#text": "10.90" } })
        );
    }

    #[test]
    fn test_single_child_is_object_and_repeated_children_are_sequence() {
        let single = xml_to_json("<c><cd><t>A</t></cd></c>").unwrap();
        assert_eq!(single, json!({ "c": { "cd": { "t": "A" } } }));

        let repeated = xml_to_json("<c><cd><t>A</t></cd><cd><t>B</t></cd><cd><t>C</t></cd></c>")
            .unwrap();
        assert_eq!(
            repeated,
            json!({ "c": { "cd": [ { "t": "A" }, { "t": "B" }, { "t": "C" } ] } })
        );
    }

    #[test]
    fn test_preserves_element_casing_and_order() {
        let json = xml_to_json("<Root><zeta>1</zeta><Alpha>2</Alpha></Root>").unwrap();
        let keys: Vec<&String> = json["Root"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "Alpha"]);
    }

    #[test]
    fn test_declaration_and_comments_are_ignored() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- catalog -->
<CATALOG><!-- first --><CD>x</CD></CATALOG>"#;
        assert_eq!(xml_to_json(xml).unwrap(), json!({ "CATALOG": { "CD": "x" } }));
    }

    #[test]
    fn test_entities_and_cdata_are_text() {
        let json = xml_to_json("<a>Tom &amp; Jerry</a>").unwrap();
        assert_eq!(json["a"], "Tom & Jerry");

        let json = xml_to_json("<a><![CDATA[<b>raw</b>]]></a>").unwrap();
        assert_eq!(json["a"], "<b>raw</b>");
    }

    #[test]
    fn test_mixed_content_collects_text_parts() {
        let json = xml_to_json("<p>one<br/>two</p>").unwrap();
        assert_eq!(json, json!({ "p": { "br": null, "#text": ["one", "two"] } }));
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        let err = xml_to_json("<a><b></a></b>").unwrap_err();
        assert!(matches!(err, ContentError::Xml { .. }));
    }

    #[test]
    fn test_unclosed_root_is_rejected() {
        let err = xml_to_json("<a><b>text</b>").unwrap_err();
        assert!(err.to_string().contains("not closed"), "{}", err);
    }

    #[test]
    fn test_multiple_roots_are_rejected() {
        let err = xml_to_json("<a/><b/>").unwrap_err();
        assert!(err.to_string().contains("more than one root"), "{}", err);
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let err = xml_to_json("   ").unwrap_err();
        assert!(err.to_string().contains("no root element"), "{}", err);
    }

    #[test]
    fn test_text_outside_root_is_rejected() {
        let err = xml_to_json("stray <a/>").unwrap_err();
        assert!(err.to_string().contains("outside of the root"), "{}", err);
    }
}
