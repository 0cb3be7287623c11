//! Datadown Parser
//!
//! Parses a complete Markdown document into the typed tree defined in
//! `datadown-core`.
//!
//! # Overview
//!
//! Parsing runs in two phases. The block scanner groups lines into raw
//! blocks (headings, paragraphs, code, lists, quotes, tables), then the
//! tree builder runs the inline parser over each block's text. Parsing
//! is total: malformed Markdown degrades to literal text.
//!
//! # Example
//!
//! ```
//! use datadown_config::ParseOptions;
//! use datadown_core::{Block, Inline};
//! use datadown_parser::parse_document;
//!
//! let doc = parse_document("# Hello\n\nThis is **bold**.", &ParseOptions::default()).unwrap();
//! assert_eq!(doc.children.len(), 2);
//! assert!(matches!(doc.children[0], Block::Heading { level: 1, .. }));
//! ```

pub mod block;
pub mod builder;
pub mod entities;
pub mod inline;
pub mod tokenizer;

pub use block::{scan, BlockScanner, RawBlock, RawItem};
pub use builder::{build, TreeBuilder};
pub use entities::decode_entity;
pub use inline::{parse_inline, InlineParser};

pub use datadown_core::Result;

use datadown_config::ParseOptions;
use datadown_core::Document;
use log::debug;

/// Parse Markdown text into a document tree.
///
/// The only possible error is an internal invariant violation.
pub fn parse_document(text: &str, options: &ParseOptions) -> Result<Document> {
    debug!("parsing {} bytes of markdown", text.len());
    let blocks = scan(text, options);
    build(blocks, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadown_core::{Block, Inline, ListItem};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(text: &str) -> Document {
        init();
        parse_document(text, &ParseOptions::default()).unwrap()
    }

    fn para(text: &str) -> Block {
        Block::Paragraph {
            children: vec![Inline::text(text)],
        }
    }

    #[test]
    fn test_heading_and_bold_paragraph() {
        let doc = parse("# Hello\n\nThis is **bold**.");
        assert_eq!(
            doc.children,
            vec![
                Block::Heading {
                    level: 1,
                    children: vec![Inline::text("Hello")]
                },
                Block::Paragraph {
                    children: vec![
                        Inline::text("This is "),
                        Inline::Strong {
                            children: vec![Inline::text("bold")]
                        },
                        Inline::text("."),
                    ]
                },
            ]
        );
    }

    #[test]
    fn test_tight_bullet_list() {
        let doc = parse("- a\n- b");
        assert_eq!(
            doc.children,
            vec![Block::List {
                ordered: false,
                start: None,
                tight: true,
                items: vec![ListItem::new(vec![para("a")]), ListItem::new(vec![para("b")])],
            }]
        );
    }

    #[test]
    fn test_fenced_code_with_language() {
        let doc = parse("```rust\nfn main() {}\n```");
        assert_eq!(
            doc.children,
            vec![Block::CodeBlock {
                language: Some("rust".to_string()),
                content: "fn main() {}\n".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_unclosed_emphasis() {
        assert_eq!(parse("*unclosed").children, vec![para("*unclosed")]);
    }

    #[test]
    fn test_quote_lazy_continuation() {
        let doc = parse("> a\nb");
        assert_eq!(
            doc.children,
            vec![Block::BlockQuote {
                children: vec![Block::Paragraph {
                    children: vec![Inline::text("a"), Inline::SoftBreak, Inline::text("b")]
                }]
            }]
        );
    }

    #[test]
    fn test_hard_break_in_paragraph() {
        let doc = parse("line one  \nline two");
        assert_eq!(
            doc.children,
            vec![Block::Paragraph {
                children: vec![
                    Inline::text("line one"),
                    Inline::LineBreak,
                    Inline::text("line two"),
                ]
            }]
        );
    }

    #[test]
    fn test_garbage_is_total() {
        for input in ["]][[**__``", "***\n___\n---", "> > > -", "|||\n|-|", "\t\t- \t*"] {
            assert!(parse_document(input, &ParseOptions::default()).is_ok());
        }
    }
}
