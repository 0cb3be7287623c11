//! Table layout for the text outline.
//!
//! Columns are sized to their widest cell, measured in terminal display
//! columns so that wide (CJK) characters and emoji line up.

use datadown_core::Alignment;
use unicode_width::UnicodeWidthStr;

/// Minimum column width (characters)
const MIN_COL_WIDTH: usize = 3;

/// Separator between columns
const COLUMN_SEPARATOR: &str = " | ";

/// Display width of a string.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad `text` to `width` display columns according to `alignment`.
pub fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(display_width(text));
    match alignment {
        Alignment::Right => format!("{}{}", " ".repeat(fill), text),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
        }
        Alignment::Left | Alignment::None => format!("{}{}", text, " ".repeat(fill)),
    }
}

/// Column widths: the widest cell of each column, at least [`MIN_COL_WIDTH`].
pub fn column_widths(header: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = header
        .iter()
        .map(|cell| display_width(cell).max(MIN_COL_WIDTH))
        .collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    widths
}

/// Lay out a table as text lines: header, rule, then body rows.
///
/// Trailing padding is trimmed from each line.
pub fn layout(header: &[String], rows: &[Vec<String>], alignments: &[Alignment]) -> Vec<String> {
    let widths = column_widths(header, rows);
    let alignment = |col: usize| alignments.get(col).copied().unwrap_or_default();

    let render_row = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(col, &width)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                pad(cell, width, alignment(col))
            })
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR)
            .trim_end()
            .to_string()
    };

    let rule = widths
        .iter()
        .map(|&width| "-".repeat(width))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(header));
    lines.push(rule);
    lines.extend(rows.iter().map(|row| render_row(row.as_slice())));
    lines
}
