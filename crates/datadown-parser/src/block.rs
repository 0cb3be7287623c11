//! Block structure scanner.
//!
//! The scanner walks the input line by line and groups lines into raw
//! blocks. Containers (block quotes and list items) collect their lines,
//! strip their markers and are scanned recursively. Inline content is
//! left as raw text for the inline parser.

use crate::tokenizer::{
    atx_heading, fence_open, indent_width, innermost_content, interrupts_paragraph, is_blank,
    is_fence_close, is_paragraph_text, is_thematic_break, list_marker, quote_content,
    setext_level, split_table_row, strip_columns, table_delimiter, trim_indent, Fence, ListMarker,
};
use datadown_config::ParseOptions;
use datadown_core::Alignment;
use log::{debug, warn};

/// A block before inline parsing. `line` is the 1-based source line
/// where the block starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBlock {
    Heading {
        level: u8,
        text: String,
        line: usize,
    },
    Paragraph {
        text: String,
        line: usize,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
        line: usize,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        tight: bool,
        items: Vec<RawItem>,
        line: usize,
    },
    BlockQuote {
        children: Vec<RawBlock>,
        line: usize,
    },
    ThematicBreak {
        line: usize,
    },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        line: usize,
    },
}

impl RawBlock {
    /// Source line where the block starts.
    pub fn line(&self) -> usize {
        match self {
            RawBlock::Heading { line, .. }
            | RawBlock::Paragraph { line, .. }
            | RawBlock::CodeBlock { line, .. }
            | RawBlock::List { line, .. }
            | RawBlock::BlockQuote { line, .. }
            | RawBlock::ThematicBreak { line }
            | RawBlock::Table { line, .. } => *line,
        }
    }
}

/// A list item before inline parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub children: Vec<RawBlock>,
    pub line: usize,
}

/// A source line with container markers already removed.
#[derive(Debug, Clone)]
struct Line {
    number: usize,
    text: String,
}

/// Blocks found in a run of lines.
struct Scanned {
    blocks: Vec<RawBlock>,
    /// A blank line separated two of the blocks
    blank_between: bool,
}

/// Split input into numbered lines, normalizing CRLF and CR endings.
fn split_lines(text: &str) -> Vec<Line> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    // A final newline terminates the last line rather than starting a new one
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    body.split('\n')
        .enumerate()
        .map(|(i, text)| Line {
            number: i + 1,
            text: text.to_string(),
        })
        .collect()
}

/// Block scanner.
#[derive(Debug, Clone)]
pub struct BlockScanner<'o> {
    options: &'o ParseOptions,
}

impl<'o> BlockScanner<'o> {
    /// Create a scanner using the given dialect options.
    pub fn new(options: &'o ParseOptions) -> Self {
        Self { options }
    }

    /// Scan a whole document into raw blocks.
    pub fn scan(&self, text: &str) -> Vec<RawBlock> {
        let lines = split_lines(text);
        let scanned = self.scan_lines(&lines, 0);
        debug!(
            "scanned {} lines into {} top-level blocks",
            lines.len(),
            scanned.blocks.len()
        );
        scanned.blocks
    }

    fn scan_lines(&self, lines: &[Line], depth: usize) -> Scanned {
        let mut blocks = Vec::new();
        let mut blank_between = false;
        let mut saw_blank = false;
        let mut pos = 0;

        while pos < lines.len() {
            if is_blank(&lines[pos].text) {
                saw_blank = true;
                pos += 1;
                continue;
            }
            if saw_blank && !blocks.is_empty() {
                blank_between = true;
            }
            saw_blank = false;

            let (block, next) = self.scan_block(lines, pos, depth);
            blocks.push(block);
            pos = next;
        }

        Scanned {
            blocks,
            blank_between,
        }
    }

    /// Scan the block starting at `pos`, returning it and the next line index.
    fn scan_block(&self, lines: &[Line], pos: usize, depth: usize) -> (RawBlock, usize) {
        let line = &lines[pos];
        let text = line.text.as_str();

        if indent_width(text) >= 4 {
            if self.options.indented_code {
                return self.indented_code(lines, pos);
            }
            return self.paragraph(lines, pos);
        }
        if let Some(fence) = fence_open(text) {
            return self.fenced_code(lines, pos, fence);
        }
        if let Some((level, heading)) = atx_heading(text) {
            let block = RawBlock::Heading {
                level,
                text: heading,
                line: line.number,
            };
            return (block, pos + 1);
        }
        if quote_content(text).is_some() {
            return self.block_quote(lines, pos, depth);
        }
        if is_thematic_break(text) {
            return (RawBlock::ThematicBreak { line: line.number }, pos + 1);
        }
        if let Some(marker) = list_marker(text) {
            return self.list(lines, pos, depth, marker);
        }
        if self.options.tables {
            if let Some(table) = self.table(lines, pos) {
                return table;
            }
        }
        self.paragraph(lines, pos)
    }

    fn paragraph(&self, lines: &[Line], start: usize) -> (RawBlock, usize) {
        let number = lines[start].number;
        let mut text_lines = vec![trim_indent(&lines[start].text)];
        let mut pos = start + 1;

        while pos < lines.len() {
            let text = lines[pos].text.as_str();
            if is_blank(text) {
                break;
            }
            if let Some(level) = setext_level(text) {
                let block = RawBlock::Heading {
                    level,
                    text: text_lines.join("\n").trim().to_string(),
                    line: number,
                };
                return (block, pos + 1);
            }
            if interrupts_paragraph(text) {
                break;
            }
            text_lines.push(trim_indent(text));
            pos += 1;
        }

        let block = RawBlock::Paragraph {
            text: text_lines.join("\n").trim_end().to_string(),
            line: number,
        };
        (block, pos)
    }

    fn fenced_code(&self, lines: &[Line], start: usize, fence: Fence) -> (RawBlock, usize) {
        let mut content = String::new();
        let mut pos = start + 1;
        let mut closed = false;

        while pos < lines.len() {
            let text = lines[pos].text.as_str();
            pos += 1;
            if is_fence_close(text, &fence) {
                closed = true;
                break;
            }
            content.push_str(&strip_columns(text, fence.indent));
            content.push('\n');
        }
        if !closed {
            debug!("unterminated code fence at line {}", lines[start].number);
        }

        let block = RawBlock::CodeBlock {
            language: fence.language,
            content,
            line: lines[start].number,
        };
        (block, pos)
    }

    fn indented_code(&self, lines: &[Line], start: usize) -> (RawBlock, usize) {
        let mut end = start;
        let mut pos = start;
        while pos < lines.len() {
            let text = lines[pos].text.as_str();
            if is_blank(text) {
                pos += 1;
                continue;
            }
            if indent_width(text) < 4 {
                break;
            }
            pos += 1;
            end = pos;
        }

        let mut content = String::new();
        for line in &lines[start..end] {
            content.push_str(&strip_columns(&line.text, 4));
            content.push('\n');
        }

        let block = RawBlock::CodeBlock {
            language: None,
            content,
            line: lines[start].number,
        };
        (block, end)
    }

    fn block_quote(&self, lines: &[Line], start: usize, depth: usize) -> (RawBlock, usize) {
        let mut inner = Collected::default();
        let mut pos = start;

        while pos < lines.len() {
            let line = &lines[pos];
            if let Some(rest) = quote_content(&line.text) {
                inner.push(line.number, rest);
                pos += 1;
                continue;
            }
            if is_blank(&line.text) || !inner.accepts_lazy(&line.text) {
                break;
            }
            inner.push(line.number, trim_indent(&line.text).to_string());
            pos += 1;
        }

        let number = lines[start].number;
        if depth >= self.options.nesting_depth() {
            return (too_deep(&lines[start..pos], number), pos);
        }

        let children = self.scan_lines(&inner.lines, depth + 1).blocks;
        (
            RawBlock::BlockQuote {
                children,
                line: number,
            },
            pos,
        )
    }

    fn list(
        &self,
        lines: &[Line],
        start: usize,
        depth: usize,
        first: ListMarker,
    ) -> (RawBlock, usize) {
        let kind = first.kind;
        let start_number = first.number;
        let number = lines[start].number;
        let mut items = Vec::new();
        let mut tight = true;
        let mut marker = first;
        let mut pos = start;

        loop {
            let item_start = pos;
            let item_line = lines[pos].number;
            let content_indent = marker.content_indent;
            let starts_blank = marker.is_empty();
            let mut content = Collected::default();
            content.push(item_line, marker.content.clone());
            pos += 1;

            while pos < lines.len() {
                let line = &lines[pos];
                if is_blank(&line.text) {
                    // An item may begin with at most one blank line
                    if starts_blank && content.lines.len() == 1 {
                        break;
                    }
                    content.push(line.number, String::new());
                    pos += 1;
                    continue;
                }
                if indent_width(&line.text) >= content_indent {
                    content.push(line.number, strip_columns(&line.text, content_indent));
                    pos += 1;
                    continue;
                }
                // A marker left of the content column starts a sibling or ends the list
                if list_marker(&line.text).is_some() {
                    break;
                }
                if !content.ends_blank() && content.accepts_lazy(&line.text) {
                    content.push(line.number, trim_indent(&line.text).to_string());
                    pos += 1;
                    continue;
                }
                break;
            }

            // Trailing blank lines belong to whatever follows the item
            let mut trailing_blanks = 0;
            while content.lines.len() > 1 && content.ends_blank() {
                content.lines.pop();
                trailing_blanks += 1;
            }
            let item_end = pos;
            pos -= trailing_blanks;

            if depth >= self.options.nesting_depth() {
                items.push(RawItem {
                    children: vec![too_deep(&lines[item_start..pos], item_line)],
                    line: item_line,
                });
            } else {
                let scanned = self.scan_lines(&content.lines, depth + 1);
                if scanned.blank_between {
                    tight = false;
                }
                items.push(RawItem {
                    children: scanned.blocks,
                    line: item_line,
                });
            }

            // Does another item of the same list follow?
            let next = item_end;
            if next >= lines.len() || is_thematic_break(&lines[next].text) {
                break;
            }
            match list_marker(&lines[next].text) {
                Some(next_marker) if next_marker.kind == kind => {
                    if trailing_blanks > 0 {
                        tight = false;
                    }
                    marker = next_marker;
                    pos = next;
                }
                _ => break,
            }
        }

        let block = RawBlock::List {
            ordered: kind.is_ordered(),
            start: start_number,
            tight,
            items,
            line: number,
        };
        (block, pos)
    }

    fn table(&self, lines: &[Line], start: usize) -> Option<(RawBlock, usize)> {
        let header_line = lines[start].text.as_str();
        if !header_line.contains('|') {
            return None;
        }
        let alignments = table_delimiter(&lines.get(start + 1)?.text)?;
        let header = split_table_row(header_line);
        if header.len() != alignments.len() {
            return None;
        }

        let mut rows = Vec::new();
        let mut pos = start + 2;
        while pos < lines.len() {
            let text = lines[pos].text.as_str();
            if is_blank(text) || interrupts_paragraph(text) {
                break;
            }
            let mut cells = split_table_row(text);
            cells.resize(header.len(), String::new());
            rows.push(cells);
            pos += 1;
        }

        let block = RawBlock::Table {
            alignments,
            header,
            rows,
            line: lines[start].number,
        };
        Some((block, pos))
    }
}

/// Lines collected for a container, with the fenced code state of their
/// innermost content kept up to date as lines arrive.
#[derive(Debug, Default)]
struct Collected {
    lines: Vec<Line>,
    open_fence: Option<Fence>,
}

impl Collected {
    fn push(&mut self, number: usize, text: String) {
        let inner = innermost_content(&text);
        self.open_fence = match self.open_fence.take() {
            Some(fence) if is_fence_close(&inner, &fence) => None,
            Some(fence) => Some(fence),
            None => fence_open(&inner),
        };
        self.lines.push(Line { number, text });
    }

    fn ends_blank(&self) -> bool {
        self.lines.last().map(|l| is_blank(&l.text)).unwrap_or(false)
    }

    /// Check whether `line` continues the paragraph at the end of the
    /// container without repeating the container's markers.
    fn accepts_lazy(&self, line: &str) -> bool {
        let Some(last) = self.lines.last() else {
            return false;
        };
        if is_blank(&last.text) || !is_paragraph_text(&last.text) {
            return false;
        }
        if interrupts_paragraph(line) || setext_level(line).is_some() {
            return false;
        }
        self.open_fence.is_none()
    }
}

/// Containers nested past the limit are kept as paragraph text.
fn too_deep(lines: &[Line], number: usize) -> RawBlock {
    warn!(
        "nesting limit reached at line {}, keeping content as text",
        number
    );
    let text = lines
        .iter()
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    RawBlock::Paragraph { text, line: number }
}

/// Scan text into raw blocks with the given options.
pub fn scan(text: &str, options: &ParseOptions) -> Vec<RawBlock> {
    BlockScanner::new(options).scan(text)
}
