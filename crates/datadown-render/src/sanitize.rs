//! XML name sanitizing for data-mode keys.
//!
//! Heading text is free-form, but XML element names are not. Keys are
//! rewritten so that every character is legal in an element name.

use crate::data::DataNode;

/// Rewrite a string into a valid XML element name.
///
/// ```
/// use datadown_render::sanitize::sanitize_xml_name;
///
/// assert_eq!(sanitize_xml_name("My Key"), "My_Key");
/// assert_eq!(sanitize_xml_name("1st Item"), "_1st_Item");
/// ```
pub fn sanitize_xml_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            // Names start with a letter or underscore
            if c.is_alphabetic() || c == '_' {
                out.push(c);
            } else {
                out.push('_');
                if c.is_alphanumeric() {
                    out.push(c);
                }
            }
        } else if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Recursively sanitize every map key in a data tree.
pub fn sanitize_keys(node: &DataNode) -> DataNode {
    match node {
        DataNode::Map(entries) => DataNode::Map(
            entries
                .iter()
                .map(|(key, value)| (sanitize_xml_name(key), sanitize_keys(value)))
                .collect(),
        ),
        DataNode::Array(items) => DataNode::Array(items.iter().map(sanitize_keys).collect()),
        DataNode::String(_) => node.clone(),
    }
}
