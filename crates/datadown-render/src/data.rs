//! Heading-keyed data tree.
//!
//! The minified mode drops the document structure and keeps only what a
//! data consumer cares about: headings become nested map keys, and the
//! content under each heading becomes a string or a list.

use datadown_core::{Block, Document, Inline, ListItem};
use log::trace;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A node of the minified data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataNode {
    String(String),
    Array(Vec<DataNode>),
    /// Entries in document order
    Map(Vec<(String, DataNode)>),
}

impl DataNode {
    /// Look up a key in a map node.
    pub fn get(&self, key: &str) -> Option<&DataNode> {
        match self {
            DataNode::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The string value, if this is a string node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataNode::String(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is an array node.
    pub fn as_array(&self) -> Option<&[DataNode]> {
        match self {
            DataNode::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl Serialize for DataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataNode::String(s) => serializer.serialize_str(s),
            DataNode::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DataNode::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

type Entries = Vec<(String, DataNode)>;

/// Heading path from the root to the current key.
type HeadingPath = Vec<(u8, String)>;

/// Convert a document into its heading-keyed data tree.
///
/// Content before the first heading is dropped. A key whose only content
/// is one list becomes an array; other content is joined into a string.
/// A key that gains sub-headings becomes a map, discarding its text.
pub fn to_data(document: &Document) -> DataNode {
    let mut root = DataNode::Map(Vec::new());
    let mut path: HeadingPath = Vec::new();
    let mut pending: Vec<DataNode> = Vec::new();

    for block in &document.children {
        let Block::Heading { level, children } = block else {
            collect_content(block, &mut pending);
            continue;
        };

        if path.is_empty() {
            if !pending.is_empty() {
                trace!("dropping {} nodes before the first heading", pending.len());
            }
            pending.clear();
        } else {
            attach(&mut root, &path, std::mem::take(&mut pending));
        }

        let key = flatten(children, ' ').trim().to_string();
        while path.last().map(|(l, _)| *l >= *level).unwrap_or(false) {
            path.pop();
        }
        let parent = ensure_map(&mut root, &path);
        if !parent.iter().any(|(k, _)| *k == key) {
            parent.push((key.clone(), DataNode::String(String::new())));
        }
        path.push((*level, key));
    }

    if !path.is_empty() {
        attach(&mut root, &path, pending);
    }
    root
}

fn as_map_mut(node: &mut DataNode) -> &mut Entries {
    if !matches!(node, DataNode::Map(_)) {
        *node = DataNode::Map(Vec::new());
    }
    match node {
        DataNode::Map(entries) => entries,
        _ => unreachable!("node was just replaced by a map"),
    }
}

/// Walk `path`, turning every node on it into a map, and return the
/// entries at its end.
fn ensure_map<'a>(root: &'a mut DataNode, path: &[(u8, String)]) -> &'a mut Entries {
    let mut current = root;
    for (_, segment) in path {
        let entries = as_map_mut(current);
        let idx = match entries.iter().position(|(k, _)| k == segment) {
            Some(idx) => idx,
            None => {
                entries.push((segment.clone(), DataNode::Map(Vec::new())));
                entries.len() - 1
            }
        };
        current = &mut entries[idx].1;
    }
    as_map_mut(current)
}

/// Store collected content under the key at the end of `path`.
fn attach(root: &mut DataNode, path: &[(u8, String)], content: Vec<DataNode>) {
    if content.is_empty() {
        return;
    }
    let Some(((_, key), parent_path)) = path.split_last() else {
        return;
    };
    let parent = ensure_map(root, parent_path);
    let Some((_, target)) = parent.iter_mut().find(|(k, _)| k == key) else {
        return;
    };

    // Sub-headings win over text
    if matches!(target, DataNode::Map(_)) {
        return;
    }
    let untouched = matches!(target, DataNode::String(s) if s.is_empty());
    if untouched && matches!(content.as_slice(), [DataNode::Array(_)]) {
        *target = content
            .into_iter()
            .next()
            .unwrap_or(DataNode::Array(Vec::new()));
        return;
    }

    let mut combined = String::new();
    push_joined(&mut combined, target);
    for node in &content {
        push_joined(&mut combined, node);
    }
    *target = DataNode::String(combined.trim().to_string());
}

fn push_joined(buf: &mut String, node: &DataNode) {
    match node {
        DataNode::String(s) if !s.is_empty() => {
            buf.push_str(s);
            buf.push_str("\n\n");
        }
        DataNode::Array(items) => {
            for item in items {
                stringify_item(buf, item, 0);
            }
            buf.push('\n');
        }
        _ => {}
    }
}

/// Write a list item as a `* item` line, nested items indented by 2.
fn stringify_item(buf: &mut String, node: &DataNode, indent: usize) {
    match node {
        DataNode::String(s) => {
            buf.push_str(&" ".repeat(indent));
            buf.push_str("* ");
            buf.push_str(s);
            buf.push('\n');
        }
        DataNode::Array(items) => {
            for item in items {
                stringify_item(buf, item, indent + 2);
            }
        }
        DataNode::Map(_) => {}
    }
}

fn collect_content(block: &Block, out: &mut Vec<DataNode>) {
    match block {
        Block::Paragraph { children } | Block::Heading { children, .. } => {
            let text = flatten(children, '\n').trim().to_string();
            if !text.is_empty() {
                out.push(DataNode::String(text));
            }
        }
        Block::CodeBlock { language, content } => {
            out.push(DataNode::String(fence(language.as_deref(), content)));
        }
        Block::List { items, .. } => out.push(list_to_array(items)),
        Block::BlockQuote { children } => {
            for child in children {
                collect_content(child, out);
            }
        }
        Block::Table { header, rows, .. } => {
            let lines: Vec<String> = std::iter::once(header)
                .chain(rows.iter())
                .map(|row| {
                    row.iter()
                        .map(|cell| flatten(&cell.children, ' '))
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect();
            out.push(DataNode::String(lines.join("\n")));
        }
        Block::ThematicBreak => {}
    }
}

fn fence(language: Option<&str>, content: &str) -> String {
    let mut out = String::from("```");
    out.push_str(language.unwrap_or(""));
    out.push('\n');
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
    out
}

/// Turn list items into an array. An item holding only text becomes a
/// string; an item with text and a nested list contributes both.
fn list_to_array(items: &[ListItem]) -> DataNode {
    let mut out = Vec::new();
    for item in items {
        let mut parts = Vec::new();
        let mut text = String::new();
        collect_item_parts(&item.children, &mut parts, &mut text);
        flush_text(&mut parts, &mut text);

        out.extend(parts);
    }
    DataNode::Array(out)
}

fn collect_item_parts(blocks: &[Block], parts: &mut Vec<DataNode>, text: &mut String) {
    for block in blocks {
        match block {
            Block::Paragraph { children } | Block::Heading { children, .. } => {
                append_text(text, &flatten(children, ' '));
            }
            Block::CodeBlock { content, .. } => append_text(text, content),
            Block::List { items, .. } => {
                flush_text(parts, text);
                parts.push(list_to_array(items));
            }
            Block::BlockQuote { children } => collect_item_parts(children, parts, text),
            Block::Table { .. } | Block::ThematicBreak => {}
        }
    }
}

fn append_text(text: &mut String, more: &str) {
    let more = more.trim();
    if more.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(more);
}

fn flush_text(parts: &mut Vec<DataNode>, text: &mut String) {
    let value = std::mem::take(text);
    let value = value.trim();
    if !value.is_empty() {
        parts.push(DataNode::String(value.to_string()));
    }
}

/// Flatten inline content, writing `line_break` for soft and hard breaks.
fn flatten(inlines: &[Inline], line_break: char) -> String {
    let mut out = String::new();
    push_flat(inlines, line_break, &mut out);
    out
}

fn push_flat(inlines: &[Inline], line_break: char, out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { value } | Inline::CodeSpan { value } => out.push_str(value),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::LineBreak => out.push(line_break),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Link { children, .. } => push_flat(children, line_break, out),
        }
    }
}
