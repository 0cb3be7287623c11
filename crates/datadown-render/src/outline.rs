//! Plain-text outline renderer.
//!
//! Produces a readable outline with all inline markup flattened:
//! headings keep their `#` markers, list items become indented bullets
//! or numbers, quotes are prefixed with `> `, code blocks are indented
//! by 4 spaces and tables are padded into aligned columns.

use crate::data::DataNode;
use crate::table;
use crate::{Renderer, Result};
use datadown_config::RenderOptions;
use datadown_core::ast::plain_text;
use datadown_core::{Block, Document, ListItem};

/// Indentation of code block lines
const CODE_INDENT: &str = "    ";

/// The `text` / `outline` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

impl Renderer for OutlineRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn aliases(&self) -> &[&str] {
        &["outline"]
    }

    fn render(&self, document: &Document, _options: &RenderOptions) -> Result<String> {
        Ok(finish(blocks_lines(&document.children, true)))
    }

    fn render_data(&self, data: &DataNode, options: &RenderOptions) -> Result<String> {
        let mut lines = Vec::new();
        data_lines(data, 0, options.indent, &mut lines);
        Ok(finish(lines))
    }
}

fn finish(lines: Vec<String>) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render a sequence of blocks, separated by blank lines when `spaced`.
fn blocks_lines(blocks: &[Block], spaced: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for block in blocks {
        let rendered = block_lines(block);
        if rendered.is_empty() {
            continue;
        }
        if spaced && !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(rendered);
    }
    lines
}

fn block_lines(block: &Block) -> Vec<String> {
    match block {
        Block::Heading { level, children } => {
            vec![format!(
                "{} {}",
                "#".repeat(usize::from(*level)),
                plain_text(children)
            )]
        }
        Block::Paragraph { children } => plain_text(children).lines().map(str::to_string).collect(),
        Block::CodeBlock { content, .. } => content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", CODE_INDENT, line)
                }
            })
            .collect(),
        Block::List {
            ordered,
            start,
            tight,
            items,
        } => list_lines(*ordered, start.unwrap_or(1), *tight, items),
        Block::BlockQuote { children } => blocks_lines(children, true)
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect(),
        Block::ThematicBreak => vec!["---".to_string()],
        Block::Table {
            alignments,
            header,
            rows,
        } => {
            let header: Vec<String> = header.iter().map(|c| plain_text(&c.children)).collect();
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| row.iter().map(|c| plain_text(&c.children)).collect())
                .collect();
            table::layout(&header, &rows, alignments)
        }
    }
}

fn list_lines(ordered: bool, start: u64, tight: bool, items: &[ListItem]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}.", start.saturating_add(i as u64))
        } else {
            "-".to_string()
        };
        if !tight && i > 0 {
            lines.push(String::new());
        }

        let continuation = " ".repeat(marker.len() + 1);
        let content = blocks_lines(&item.children, !tight);
        if content.is_empty() {
            lines.push(marker);
            continue;
        }
        for (n, line) in content.into_iter().enumerate() {
            if n == 0 {
                lines.push(format!("{} {}", marker, line));
            } else if line.is_empty() {
                lines.push(line);
            } else {
                lines.push(format!("{}{}", continuation, line));
            }
        }
    }
    lines
}

/// Render the data tree as an indented key outline.
fn data_lines(node: &DataNode, depth: usize, unit: usize, out: &mut Vec<String>) {
    let pad = " ".repeat(depth * unit);
    match node {
        DataNode::String(s) => {
            out.extend(s.lines().map(|line| format!("{}{}", pad, line).trim_end().to_string()));
        }
        DataNode::Array(items) => {
            for item in items {
                match item {
                    DataNode::String(s) => {
                        for (n, line) in s.lines().enumerate() {
                            let bullet = if n == 0 { "- " } else { "  " };
                            out.push(format!("{}{}{}", pad, bullet, line));
                        }
                    }
                    nested => data_lines(nested, depth + 1, unit, out),
                }
            }
        }
        DataNode::Map(entries) => {
            for (key, value) in entries {
                match value {
                    DataNode::String(s) if !s.contains('\n') => {
                        let line = format!("{}{}: {}", pad, key, s);
                        out.push(line.trim_end().to_string());
                    }
                    _ => {
                        out.push(format!("{}{}:", pad, key));
                        data_lines(value, depth + 1, unit, out);
                    }
                }
            }
        }
    }
}
