//! XML renderer.
//!
//! Every node becomes an element named after its `type` tag. Scalar
//! fields become attributes; text and code become character data.
//! In data mode, map keys are sanitized into element names and array
//! entries are wrapped in `<item>` elements.

use crate::data::DataNode;
use crate::sanitize::sanitize_keys;
use crate::{Renderer, Result};
use datadown_config::RenderOptions;
use datadown_core::{Block, ConvertError, Document, Inline, TableCell};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;

const FORMAT: &str = "xml";

/// Root element of data-mode output
const DATA_ROOT: &str = "data";

/// Element wrapping each array entry in data mode
const DATA_ITEM: &str = "item";

/// The `xml` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRenderer;

impl Renderer for XmlRenderer {
    fn name(&self) -> &str {
        FORMAT
    }

    fn render(&self, document: &Document, options: &RenderOptions) -> Result<String> {
        let mut out = XmlOut::new(options)?;
        out.container("document", &[], document.is_empty(), |out| {
            document.children.iter().try_for_each(|b| write_block(out, b))
        })?;
        out.finish()
    }

    fn render_data(&self, data: &DataNode, options: &RenderOptions) -> Result<String> {
        let mut out = XmlOut::new(options)?;
        write_data(&mut out, DATA_ROOT, &sanitize_keys(data))?;
        out.finish()
    }
}

/// Thin wrapper over the quick-xml writer mapping its errors.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new(options: &RenderOptions) -> Result<Self> {
        let writer = if options.pretty {
            Writer::new_with_indent(Vec::new(), b' ', options.indent)
        } else {
            Writer::new(Vec::new())
        };
        let mut out = Self { writer };
        out.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(out)
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| ConvertError::serialization(FORMAT, e))
    }

    fn start(name: &str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
        let mut start = BytesStart::new(name.to_string());
        for (key, value) in attrs {
            start.push_attribute((*key, xml_safe(value).as_ref()));
        }
        start
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Empty(Self::start(name, attrs)))
    }

    /// Element holding character data; empty text gives an empty element.
    fn text(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty(name, attrs);
        }
        self.write(Event::Start(Self::start(name, attrs)))?;
        self.write(Event::Text(BytesText::new(&xml_safe(text))))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Element holding child elements written by `body`.
    fn container<F>(&mut self, name: &str, attrs: &[(&str, &str)], empty: bool, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if empty {
            return self.empty(name, attrs);
        }
        self.write(Event::Start(Self::start(name, attrs)))?;
        body(self)?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| ConvertError::serialization(FORMAT, e))
    }
}

/// Replace characters XML 1.0 cannot carry, even escaped, with U+FFFD.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| match c {
        '\t' | '\n' | '\r' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        c => !c.is_ascii_control() || c == '\u{7F}',
    };
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if allowed(c) { c } else { '\u{FFFD}' })
                .collect(),
        )
    }
}

fn write_block(out: &mut XmlOut, block: &Block) -> Result<()> {
    let name = block.kind();
    match block {
        Block::Heading { level, children } => {
            let level = level.to_string();
            write_inline_container(out, name, &[("level", level.as_str())], children)
        }
        Block::Paragraph { children } => write_inline_container(out, name, &[], children),
        Block::CodeBlock { language, content } => match language {
            Some(language) => out.text(name, &[("language", language.as_str())], content),
            None => out.text(name, &[], content),
        },
        Block::List {
            ordered,
            start,
            tight,
            items,
        } => {
            let ordered = ordered.to_string();
            let tight = tight.to_string();
            let start = start.map(|s| s.to_string());
            let mut attrs = vec![("ordered", ordered.as_str())];
            if let Some(start) = &start {
                attrs.push(("start", start.as_str()));
            }
            attrs.push(("tight", tight.as_str()));

            out.container(name, &attrs, items.is_empty(), |out| {
                items.iter().try_for_each(|item| {
                    out.container("list_item", &[], item.children.is_empty(), |out| {
                        item.children.iter().try_for_each(|b| write_block(out, b))
                    })
                })
            })
        }
        Block::BlockQuote { children } => out.container(name, &[], children.is_empty(), |out| {
            children.iter().try_for_each(|b| write_block(out, b))
        }),
        Block::ThematicBreak => out.empty(name, &[]),
        Block::Table {
            alignments,
            header,
            rows,
        } => {
            let alignments = alignments
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(",");
            out.container(name, &[("alignments", alignments.as_str())], false, |out| {
                write_row(out, "header", header)?;
                rows.iter().try_for_each(|row| write_row(out, "row", row))
            })
        }
    }
}

fn write_row(out: &mut XmlOut, name: &str, cells: &[TableCell]) -> Result<()> {
    out.container(name, &[], cells.is_empty(), |out| {
        cells
            .iter()
            .try_for_each(|cell| write_inline_container(out, "table_cell", &[], &cell.children))
    })
}

fn write_inline_container(
    out: &mut XmlOut,
    name: &str,
    attrs: &[(&str, &str)],
    children: &[Inline],
) -> Result<()> {
    out.container(name, attrs, children.is_empty(), |out| {
        children.iter().try_for_each(|i| write_inline(out, i))
    })
}

fn write_inline(out: &mut XmlOut, inline: &Inline) -> Result<()> {
    let name = inline.kind();
    match inline {
        Inline::Text { value } | Inline::CodeSpan { value } => out.text(name, &[], value),
        Inline::Emphasis { children } | Inline::Strong { children } => {
            write_inline_container(out, name, &[], children)
        }
        Inline::Link {
            url,
            title,
            children,
        } => {
            let mut attrs = vec![("url", url.as_str())];
            if let Some(title) = title {
                attrs.push(("title", title.as_str()));
            }
            write_inline_container(out, name, &attrs, children)
        }
        Inline::Image { url, title, alt } => {
            let mut attrs = vec![("url", url.as_str())];
            if let Some(title) = title {
                attrs.push(("title", title.as_str()));
            }
            attrs.push(("alt", alt.as_str()));
            out.empty(name, &attrs)
        }
        Inline::LineBreak | Inline::SoftBreak => out.empty(name, &[]),
    }
}

fn write_data(out: &mut XmlOut, name: &str, node: &DataNode) -> Result<()> {
    match node {
        DataNode::String(s) => out.text(name, &[], s),
        DataNode::Array(items) => out.container(name, &[], items.is_empty(), |out| {
            items
                .iter()
                .try_for_each(|item| write_data(out, DATA_ITEM, item))
        }),
        DataNode::Map(entries) => out.container(name, &[], entries.is_empty(), |out| {
            entries
                .iter()
                .try_for_each(|(key, value)| write_data(out, key, value))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadown_core::Alignment;

    fn compact(doc: &Document) -> String {
        XmlRenderer.render(doc, &RenderOptions::compact()).unwrap()
    }

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    #[test]
    fn test_empty_document() {
        assert_eq!(compact(&Document::default()), format!("{}<document/>", DECL));
    }

    #[test]
    fn test_heading_with_attribute() {
        let doc = Document::new(vec![Block::Heading {
            level: 1,
            children: vec![Inline::text("Hello")],
        }]);
        assert_eq!(
            compact(&doc),
            format!(
                r#"{}<document><heading level="1"><text>Hello</text></heading></document>"#,
                DECL
            )
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = Document::new(vec![Block::Paragraph {
            children: vec![Inline::text("a < b & c")],
        }]);
        assert!(compact(&doc).contains("<text>a &lt; b &amp; c</text>"));
    }

    #[test]
    fn test_code_block_and_link() {
        let doc = Document::new(vec![
            Block::CodeBlock {
                language: Some("rust".to_string()),
                content: "fn main() {}\n".to_string(),
            },
            Block::Paragraph {
                children: vec![Inline::Link {
                    url: "http://x.com?a=1&b=2".to_string(),
                    title: None,
                    children: vec![Inline::text("x")],
                }],
            },
        ]);
        let xml = compact(&doc);
        assert!(xml.contains("<code_block language=\"rust\">fn main() {}\n</code_block>"));
        assert!(xml.contains(r#"<link url="http://x.com?a=1&amp;b=2"><text>x</text></link>"#));
    }

    #[test]
    fn test_list_and_table() {
        let doc = Document::new(vec![
            Block::List {
                ordered: true,
                start: Some(3),
                tight: true,
                items: vec![datadown_core::ListItem::new(vec![Block::Paragraph {
                    children: vec![Inline::text("x")],
                }])],
            },
            Block::Table {
                alignments: vec![Alignment::Left, Alignment::Right],
                header: vec![TableCell::new(vec![Inline::text("a")]), TableCell::new(vec![])],
                rows: vec![],
            },
        ]);
        let xml = compact(&doc);
        assert!(xml.contains(
            r#"<list ordered="true" start="3" tight="true"><list_item><paragraph><text>x</text></paragraph></list_item></list>"#
        ));
        assert!(xml.contains(
            r#"<table alignments="left,right"><header><table_cell><text>a</text></table_cell><table_cell/></header></table>"#
        ));
    }

    #[test]
    fn test_control_characters_replaced() {
        assert_eq!(xml_safe("plain\ttext\n"), "plain\ttext\n");
        assert_eq!(xml_safe("a\u{1}b\u{FFFF}"), "a\u{FFFD}b\u{FFFD}");

        let doc = Document::new(vec![
            Block::Paragraph {
                children: vec![Inline::text("a\u{1}b")],
            },
            Block::CodeBlock {
                language: Some("x\u{0}".to_string()),
                content: "\u{8}".to_string(),
            },
        ]);
        let xml = compact(&doc);
        assert!(xml.contains("<text>a\u{FFFD}b</text>"));
        assert!(xml.contains("<code_block language=\"x\u{FFFD}\">\u{FFFD}</code_block>"));
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let doc = Document::new(vec![Block::ThematicBreak]);
        let xml = XmlRenderer.render(&doc, &RenderOptions::default()).unwrap();
        assert!(xml.contains("\n  <thematic_break/>"));
    }

    #[test]
    fn test_render_data_sanitizes_keys() {
        let data = DataNode::Map(vec![
            (
                "My Key".to_string(),
                DataNode::String("value".to_string()),
            ),
            (
                "1st".to_string(),
                DataNode::Array(vec![DataNode::String("a".to_string())]),
            ),
        ]);
        let xml = XmlRenderer.render_data(&data, &RenderOptions::compact()).unwrap();
        assert_eq!(
            xml,
            format!(
                "{}<data><My_Key>value</My_Key><_1st><item>a</item></_1st></data>",
                DECL
            )
        );
    }
}
