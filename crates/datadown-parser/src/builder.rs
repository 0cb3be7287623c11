//! Tree builder.
//!
//! Turns raw blocks into the typed document tree, running the inline
//! parser over every piece of inline content and checking the
//! structural invariants the renderers rely on.

use crate::block::{RawBlock, RawItem};
use crate::inline::InlineParser;
use datadown_config::ParseOptions;
use datadown_core::{Block, ConvertError, Document, ListItem, Result, TableCell};
use log::debug;

/// Builds a [`Document`] from raw blocks.
#[derive(Debug, Clone)]
pub struct TreeBuilder<'o> {
    inline: InlineParser<'o>,
}

impl<'o> TreeBuilder<'o> {
    /// Create a builder using the given dialect options.
    pub fn new(options: &'o ParseOptions) -> Self {
        Self {
            inline: InlineParser::new(options),
        }
    }

    /// Build the document.
    ///
    /// Fails only when a raw block breaks an invariant, which would be a
    /// bug in the scanner.
    pub fn build(&self, blocks: Vec<RawBlock>) -> Result<Document> {
        let children = self.build_blocks(blocks)?;
        debug!("built document with {} blocks", children.len());
        Ok(Document::new(children))
    }

    fn build_blocks(&self, blocks: Vec<RawBlock>) -> Result<Vec<Block>> {
        blocks.into_iter().map(|b| self.build_block(b)).collect()
    }

    fn build_block(&self, block: RawBlock) -> Result<Block> {
        match block {
            RawBlock::Heading { level, text, line } => {
                if !(1..=6).contains(&level) {
                    return Err(ConvertError::invariant(
                        format!("heading level {} out of range", level),
                        Some(line),
                    ));
                }
                Ok(Block::Heading {
                    level,
                    children: self.inline.parse(&text),
                })
            }
            RawBlock::Paragraph { text, .. } => Ok(Block::Paragraph {
                children: self.inline.parse(&text),
            }),
            RawBlock::CodeBlock {
                language, content, ..
            } => Ok(Block::CodeBlock { language, content }),
            RawBlock::List {
                ordered,
                start,
                tight,
                items,
                line,
            } => {
                if items.is_empty() {
                    return Err(ConvertError::invariant("list without items", Some(line)));
                }
                let items = items
                    .into_iter()
                    .map(|item| self.build_item(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Block::List {
                    ordered,
                    start,
                    tight,
                    items,
                })
            }
            RawBlock::BlockQuote { children, .. } => Ok(Block::BlockQuote {
                children: self.build_blocks(children)?,
            }),
            RawBlock::ThematicBreak { .. } => Ok(Block::ThematicBreak),
            RawBlock::Table {
                alignments,
                header,
                rows,
                line,
            } => {
                if alignments.len() != header.len() {
                    return Err(ConvertError::invariant(
                        format!(
                            "table has {} alignments for {} columns",
                            alignments.len(),
                            header.len()
                        ),
                        Some(line),
                    ));
                }
                if let Some(row) = rows.iter().find(|row| row.len() > header.len()) {
                    return Err(ConvertError::invariant(
                        format!(
                            "table row has {} cells but header has {}",
                            row.len(),
                            header.len()
                        ),
                        Some(line),
                    ));
                }
                Ok(Block::Table {
                    alignments,
                    header: self.build_cells(header),
                    rows: rows.into_iter().map(|row| self.build_cells(row)).collect(),
                })
            }
        }
    }

    fn build_item(&self, item: RawItem) -> Result<ListItem> {
        Ok(ListItem::new(self.build_blocks(item.children)?))
    }

    fn build_cells(&self, cells: Vec<String>) -> Vec<TableCell> {
        cells
            .iter()
            .map(|cell| TableCell::new(self.inline.parse(cell)))
            .collect()
    }
}

/// Build a document from raw blocks with the given options.
pub fn build(blocks: Vec<RawBlock>, options: &ParseOptions) -> Result<Document> {
    TreeBuilder::new(options).build(blocks)
}
