//! Core enums for the document model.

use serde::{Deserialize, Serialize};

/// Column alignment of a table, taken from the delimiter row.
///
/// `---` is [`Alignment::None`], `:--` left, `--:` right and `:-:` center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// No explicit alignment
    #[default]
    None,
    /// Left aligned (`:---`)
    Left,
    /// Centered (`:---:`)
    Center,
    /// Right aligned (`---:`)
    Right,
}

impl Alignment {
    /// Parse a single delimiter-row cell such as `:---:`.
    ///
    /// Returns `None` when the cell is not a valid delimiter.
    pub fn from_delimiter(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        let left = cell.starts_with(':');
        let right = cell.len() > 1 && cell.ends_with(':');
        let dashes = cell.trim_start_matches(':').trim_end_matches(':');
        if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
            return None;
        }
        Some(match (left, right) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        })
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alignment::None => write!(f, "none"),
            Alignment::Left => write!(f, "left"),
            Alignment::Center => write!(f, "center"),
            Alignment::Right => write!(f, "right"),
        }
    }
}
