//! Line classification for the block scanner.
//!
//! Every function here looks at a single line and answers one question:
//! does it open a heading, a fence, a quote, a list item, a table row?
//! Indentation is measured in columns with tab stops of 4.

use datadown_core::Alignment;
use regex::Regex;
use std::sync::LazyLock;

/// Width of a tab stop when measuring indentation.
pub const TAB_STOP: usize = 4;

/// Regex for ATX headings (indentation already removed)
static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})(?:[ \t]+(.*))?$").unwrap());

/// Regex for an opening code fence: ``` or ~~~ plus optional info string
static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,}|~{3,})(.*)$").unwrap());

/// Regex for a closing code fence (nothing but trailing whitespace after it)
static FENCE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,}|~{3,})[ \t]*$").unwrap());

/// Regex for thematic breaks: 3+ of the same -, * or _ with optional spacing
static THEMATIC_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// Regex for setext heading underlines
static SETEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(=+|-+)[ \t]*$").unwrap());

/// Regex for ordered list markers: 1-9 digits followed by . or )
static ORDERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,9})([.)])").unwrap());

/// Regex for a table delimiter row such as `| :-- | --: |`
static TABLE_DELIMITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$").unwrap()
});

/// True for lines containing only spaces and tabs.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

/// Leading indentation in columns.
pub fn indent_width(line: &str) -> usize {
    let mut column = 0;
    for c in line.chars() {
        match c {
            ' ' => column += 1,
            '\t' => column += TAB_STOP - column % TAB_STOP,
            _ => break,
        }
    }
    column
}

/// Remove up to `columns` columns of leading indentation.
///
/// A tab straddling the cut is split into the spaces that remain.
pub fn strip_columns(line: &str, columns: usize) -> String {
    let mut column = 0;
    for (offset, c) in line.char_indices() {
        if column >= columns {
            return line[offset..].to_string();
        }
        match c {
            ' ' => column += 1,
            '\t' => {
                let next = column + TAB_STOP - column % TAB_STOP;
                if next > columns {
                    let mut out = " ".repeat(next - columns);
                    out.push_str(&line[offset + 1..]);
                    return out;
                }
                column = next;
            }
            _ => return line[offset..].to_string(),
        }
    }
    String::new()
}

/// The line without its leading spaces and tabs.
pub fn trim_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// Parse an ATX heading, returning its level and text.
///
/// A closing sequence of `#` is removed when preceded by a space.
pub fn atx_heading(line: &str) -> Option<(u8, String)> {
    if indent_width(line) > 3 {
        return None;
    }
    let caps = ATX_HEADING_RE.captures(trim_indent(line))?;
    let level = caps.get(1).map(|m| m.as_str().len()).unwrap_or(1) as u8;
    let content = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();

    let without_closing = content.trim_end_matches('#');
    let text = if without_closing.is_empty() {
        ""
    } else if without_closing.ends_with([' ', '\t']) {
        without_closing.trim_end()
    } else {
        content
    };
    Some((level, text.to_string()))
}

/// An opening code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// Fence character: '`' or '~'
    pub ch: char,
    /// Number of fence characters
    pub len: usize,
    /// Columns of indentation before the fence
    pub indent: usize,
    /// First word of the info string
    pub language: Option<String>,
}

/// Parse an opening code fence.
pub fn fence_open(line: &str) -> Option<Fence> {
    let indent = indent_width(line);
    if indent > 3 {
        return None;
    }
    let caps = FENCE_OPEN_RE.captures(trim_indent(line))?;
    let marker = caps.get(1)?.as_str();
    let info = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
    let ch = marker.chars().next()?;

    // A backtick fence's info string may not contain backticks,
    // otherwise the line is an inline code span.
    if ch == '`' && info.contains('`') {
        return None;
    }

    let language = info
        .split_whitespace()
        .next()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    Some(Fence {
        ch,
        len: marker.chars().count(),
        indent,
        language,
    })
}

/// Check whether `line` closes the given fence.
pub fn is_fence_close(line: &str, fence: &Fence) -> bool {
    if indent_width(line) > 3 {
        return false;
    }
    match FENCE_CLOSE_RE.captures(trim_indent(line)) {
        Some(caps) => {
            let marker = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            marker.starts_with(fence.ch) && marker.chars().count() >= fence.len
        }
        None => false,
    }
}

/// Check for a thematic break (`---`, `***`, `_ _ _`).
pub fn is_thematic_break(line: &str) -> bool {
    indent_width(line) <= 3 && THEMATIC_BREAK_RE.is_match(trim_indent(line))
}

/// Heading level of a setext underline: `===` is 1, `---` is 2.
pub fn setext_level(line: &str) -> Option<u8> {
    if indent_width(line) > 3 {
        return None;
    }
    let caps = SETEXT_RE.captures(trim_indent(line))?;
    let underline = caps.get(1)?.as_str();
    Some(if underline.starts_with('=') { 1 } else { 2 })
}

/// Content of a block quote line with its `>` marker removed.
pub fn quote_content(line: &str) -> Option<String> {
    if indent_width(line) > 3 {
        return None;
    }
    let rest = trim_indent(line).strip_prefix('>')?;
    let rest = match rest.strip_prefix(' ') {
        Some(stripped) => stripped.to_string(),
        None => match rest.strip_prefix('\t') {
            // The tab counts as the optional space plus padding.
            Some(stripped) => format!("  {}", stripped),
            None => rest.to_string(),
        },
    };
    Some(rest)
}

/// Kind of list marker; items with different kinds belong to different lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `-`, `*` or `+`
    Bullet(char),
    /// Number followed by `.` or `)`
    Ordered(char),
}

impl MarkerKind {
    /// Check if this is an ordered marker.
    pub fn is_ordered(&self) -> bool {
        matches!(self, MarkerKind::Ordered(_))
    }
}

/// A list item marker and the first line of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: MarkerKind,
    /// Number of an ordered marker
    pub number: Option<u64>,
    /// Column where item content starts; continuation lines need this indent
    pub content_indent: usize,
    /// Rest of the marker line
    pub content: String,
}

impl ListMarker {
    /// True if the item starts with a blank line.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.content)
    }

    /// Whether this item may interrupt a paragraph.
    pub fn can_interrupt_paragraph(&self) -> bool {
        !self.is_empty() && self.number.map(|n| n == 1).unwrap_or(true)
    }
}

/// Parse a list item marker.
pub fn list_marker(line: &str) -> Option<ListMarker> {
    let indent = indent_width(line);
    if indent > 3 {
        return None;
    }
    let rest = trim_indent(line);

    let (kind, number, marker_len) = match rest.chars().next()? {
        c @ ('-' | '*' | '+') => (MarkerKind::Bullet(c), None, 1),
        _ => {
            let caps = ORDERED_MARKER_RE.captures(rest)?;
            let digits = caps.get(1)?.as_str();
            let delimiter = caps.get(2)?.as_str().chars().next()?;
            let number = digits.parse::<u64>().ok()?;
            (MarkerKind::Ordered(delimiter), Some(number), digits.len() + 1)
        }
    };

    let after = &rest[marker_len..];
    let marker_end = indent + marker_len;

    if is_blank(after) {
        return Some(ListMarker {
            kind,
            number,
            content_indent: marker_end + 1,
            content: String::new(),
        });
    }
    if !after.starts_with([' ', '\t']) {
        return None;
    }

    // Columns of whitespace between the marker and the content
    let mut column = marker_end;
    let mut content_offset = after.len();
    for (offset, c) in after.char_indices() {
        match c {
            ' ' => column += 1,
            '\t' => column += TAB_STOP - column % TAB_STOP,
            _ => {
                content_offset = offset;
                break;
            }
        }
    }
    let spacing = column - marker_end;
    let text = &after[content_offset..];

    if spacing >= 5 {
        // Content starting 5+ columns out is indented code inside the item
        Some(ListMarker {
            kind,
            number,
            content_indent: marker_end + 1,
            content: format!("{}{}", " ".repeat(spacing - 1), text),
        })
    } else {
        Some(ListMarker {
            kind,
            number,
            content_indent: marker_end + spacing,
            content: text.to_string(),
        })
    }
}

/// Split a table row into trimmed cells.
///
/// Outer pipes are optional; `\|` is a literal pipe inside a cell.
pub fn split_table_row(line: &str) -> Vec<String> {
    let mut row = line.trim();
    if let Some(stripped) = row.strip_prefix('|') {
        row = stripped;
    }
    if row.ends_with('|') && !row.ends_with("\\|") {
        row = &row[..row.len() - 1];
    }

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Parse a table delimiter row into column alignments.
pub fn table_delimiter(line: &str) -> Option<Vec<Alignment>> {
    if indent_width(line) > 3 || !TABLE_DELIMITER_RE.is_match(trim_indent(line)) {
        return None;
    }
    // A bare `---` is a thematic break or setext underline, not a table
    if !line.contains('|') {
        return None;
    }
    split_table_row(line)
        .iter()
        .map(|cell| Alignment::from_delimiter(cell))
        .collect()
}

/// Check whether a line starts a block that interrupts a paragraph.
pub fn interrupts_paragraph(line: &str) -> bool {
    if is_blank(line) || indent_width(line) > 3 {
        return false;
    }
    atx_heading(line).is_some()
        || fence_open(line).is_some()
        || quote_content(line).is_some()
        || is_thematic_break(line)
        || list_marker(line)
            .map(|m| m.can_interrupt_paragraph())
            .unwrap_or(false)
}

/// Strip nested quote and list markers to reach the innermost content.
pub fn innermost_content(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        if let Some(rest) = quote_content(&current) {
            current = rest;
            continue;
        }
        if is_thematic_break(&current) {
            break;
        }
        match list_marker(&current) {
            Some(marker) if !marker.is_empty() => current = marker.content,
            _ => break,
        }
    }
    current
}

/// Check whether a line is plain paragraph text once its container
/// markers are removed.
pub fn is_paragraph_text(line: &str) -> bool {
    let inner = innermost_content(line);
    !is_blank(&inner)
        && atx_heading(&inner).is_none()
        && fence_open(&inner).is_none()
        && !is_thematic_break(&inner)
        && !list_marker(&inner).is_some_and(|marker| marker.is_empty())
        && indent_width(&inner) <= 3
}
