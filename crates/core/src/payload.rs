//! OpenRosa XML submission documents.
//!
//! Each upload row becomes one XML instance: the root element is named by
//! the form id, slash paths materialize as nested elements, and the
//! `meta` block carries the instance identifier (plus `deprecatedID` for
//! edits, which tells the platform to replace the prior record).

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::CoreError;
use crate::flatten::{FlatField, FlatSchema};
use crate::ident::ensure_uuid_prefix;
use crate::schema::FieldKind;
use crate::upload::UploadRow;

/// Build the XML payload for one upload row.
///
/// * `instance_id` — identifier to use for `meta/instanceID`; a fresh
///   UUID is generated when `None`.
/// * `deprecated_id` — identifier of the submission being replaced
///   (edit mode only).
///
/// Blank cells are omitted from the document. Geopoint columns recombine
/// into a single space-separated value; `select_multiple` cells are
/// normalized to space-separated tokens.
pub fn build_submission_xml(
    row: &UploadRow,
    form_id: &str,
    schema: &FlatSchema,
    instance_id: Option<&str>,
    deprecated_id: Option<&str>,
) -> Result<Vec<u8>, CoreError> {
    if form_id.trim().is_empty() {
        return Err(CoreError::Validation("form id must not be empty".to_string()));
    }

    let mut root = XmlNode::new(form_id);

    for field in &schema.fields {
        if let Some(value) = field_value(row, field) {
            root.set_path_text(&field.path, value);
        }
    }

    let instance_id = match instance_id {
        Some(id) => ensure_uuid_prefix(id),
        None => format!("uuid:{}", uuid::Uuid::new_v4()),
    };
    let meta = root.ensure_child("meta");
    meta.ensure_child("instanceID").text = Some(instance_id);
    if let Some(deprecated) = deprecated_id {
        meta.ensure_child("deprecatedID").text = Some(ensure_uuid_prefix(deprecated));
    }

    serialize(&root, form_id)
}

/// Extract and normalize the value one field contributes, if any.
fn field_value(row: &UploadRow, field: &FlatField) -> Option<String> {
    match field.kind {
        FieldKind::Geopoint => {
            let component = |suffix: &str| {
                row.get(&format!("{}{suffix}", field.path))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            };
            let lat = component("_latitude")?;
            let lon = component("_longitude")?;
            let alt = component("_altitude").unwrap_or("0");
            let precision = component("_precision").unwrap_or("0.0");
            Some(format!("{lat} {lon} {alt} {precision}"))
        }
        FieldKind::SelectMultiple => {
            let raw = row.get(&field.path)?;
            let tokens: Vec<&str> = raw
                .split([',', ' '])
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.is_empty() {
                None
            } else {
                Some(tokens.join(" "))
            }
        }
        _ => row
            .get(&field.path)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from),
    }
}

/// Minimal ordered element tree used to assemble the document before
/// serialization.
struct XmlNode {
    name: String,
    text: Option<String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Child with the given name, created in place if absent.
    fn ensure_child(&mut self, name: &str) -> &mut XmlNode {
        let pos = match self.children.iter().position(|c| c.name == name) {
            Some(pos) => pos,
            None => {
                self.children.push(XmlNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[pos]
    }

    /// Set the leaf text under a slash path, creating intermediate
    /// elements as needed.
    fn set_path_text(&mut self, path: &str, value: String) {
        let mut node = self;
        for part in path.split('/') {
            node = node.ensure_child(part);
        }
        node.text = Some(value);
    }
}

fn serialize(root: &XmlNode, form_id: &str) -> Result<Vec<u8>, CoreError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| CoreError::Payload(e.to_string()))?;

    let mut start = BytesStart::new(root.name.as_str());
    start.push_attribute(("id", form_id));
    writer
        .write_event(Event::Start(start))
        .map_err(|e| CoreError::Payload(e.to_string()))?;
    for child in &root.children {
        write_node(&mut writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(root.name.as_str())))
        .map_err(|e| CoreError::Payload(e.to_string()))?;

    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), CoreError> {
    writer
        .write_event(Event::Start(BytesStart::new(node.name.as_str())))
        .map_err(|e| CoreError::Payload(e.to_string()))?;
    if let Some(text) = &node.text {
        writer
            .write_event(Event::Text(BytesText::new(text.as_str())))
            .map_err(|e| CoreError::Payload(e.to_string()))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(|e| CoreError::Payload(e.to_string()))?;
    Ok(())
}
