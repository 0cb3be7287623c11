//! Typed Markdown document tree.
//!
//! The tree is built once per conversion and never mutated after it is
//! handed to a renderer. Every node serializes as an object carrying a
//! `"type"` discriminator plus its own fields, for example
//! `{"type":"heading","level":2,"children":[...]}`.

use crate::enums::Alignment;
use serde::{Deserialize, Serialize};

/// Root container of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "document")]
pub struct Document {
    /// Top-level blocks in source order
    pub children: Vec<Block>,
}

impl Document {
    /// Create a document from its top-level blocks.
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }

    /// True if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// ATX or setext heading, level 1-6
    Heading { level: u8, children: Vec<Inline> },

    /// Paragraph of inline content
    Paragraph { children: Vec<Inline> },

    /// Fenced or indented code; `content` keeps the trailing newline of each line
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        content: String,
    },

    /// Ordered or bullet list
    List {
        ordered: bool,
        /// First number of an ordered list
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        /// False when items are separated by blank lines
        tight: bool,
        items: Vec<ListItem>,
    },

    /// Block quote (`>` prefix)
    BlockQuote { children: Vec<Block> },

    /// Horizontal rule
    ThematicBreak,

    /// Pipe table
    Table {
        alignments: Vec<Alignment>,
        header: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },
}

impl Block {
    /// The `type` discriminator this block serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::CodeBlock { .. } => "code_block",
            Block::List { .. } => "list",
            Block::BlockQuote { .. } => "block_quote",
            Block::ThematicBreak => "thematic_break",
            Block::Table { .. } => "table",
        }
    }
}

/// A single item of a [`Block::List`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "list_item")]
pub struct ListItem {
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }
}

/// A single cell of a [`Block::Table`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "table_cell")]
pub struct TableCell {
    pub children: Vec<Inline>,
}

impl TableCell {
    pub fn new(children: Vec<Inline>) -> Self {
        Self { children }
    }
}

/// Span-level node.
///
/// `Text` and `CodeSpan` values are literal; they are never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// Literal text
    Text { value: String },

    /// `*emphasis*` or `_emphasis_`
    Emphasis { children: Vec<Inline> },

    /// `**strong**` or `__strong__`
    Strong { children: Vec<Inline> },

    /// `` `code` ``
    CodeSpan { value: String },

    /// `[label](url "title")`
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        children: Vec<Inline>,
    },

    /// `![alt](url "title")`
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        alt: String,
    },

    /// Hard line break (two trailing spaces or a trailing backslash)
    LineBreak,

    /// Plain line ending inside a paragraph
    SoftBreak,
}

impl Inline {
    /// Shorthand for a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text {
            value: value.into(),
        }
    }

    /// The `type` discriminator this inline serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            Inline::Text { .. } => "text",
            Inline::Emphasis { .. } => "emphasis",
            Inline::Strong { .. } => "strong",
            Inline::CodeSpan { .. } => "code_span",
            Inline::Link { .. } => "link",
            Inline::Image { .. } => "image",
            Inline::LineBreak => "line_break",
            Inline::SoftBreak => "soft_break",
        }
    }

    /// Child inlines of container nodes; empty for leaves.
    pub fn children(&self) -> &[Inline] {
        match self {
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Link { children, .. } => children,
            _ => &[],
        }
    }
}

/// Flatten inline content into plain text.
///
/// Markup is dropped, images contribute their alt text, soft breaks
/// become spaces and hard breaks become newlines.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { value } | Inline::CodeSpan { value } => out.push_str(value),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak => out.push(' '),
            Inline::LineBreak => out.push('\n'),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Link { children, .. } => push_plain_text(children, out),
        }
    }
}

/// Nesting depth of an inline sequence; a flat run of text has depth 1.
pub fn inline_depth(inlines: &[Inline]) -> usize {
    inlines
        .iter()
        .map(|inline| 1 + inline_depth(inline.children()))
        .max()
        .unwrap_or(0)
}
