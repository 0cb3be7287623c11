//! Parser options.
//!
//! This module contains the `ParseOptions` struct which selects the
//! Markdown dialect and the nesting limit the parser enforces.

use serde::{Deserialize, Deserializer, Serialize};

/// Default limit for nested containers and inline brackets.
///
/// At this depth the JSON encoding of the deepest tree stays below
/// serde_json's default recursion limit of 128.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Hard cap on any configured nesting limit.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Dialect switches for the Markdown parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParseOptions {
    /// Recognize pipe tables.
    /// Default: true
    #[serde(default = "default_true")]
    pub tables: bool,

    /// Treat lines indented by 4+ columns as code blocks.
    /// Default: false (only fenced code blocks are recognized)
    #[serde(default)]
    pub indented_code: bool,

    /// Decode `&name;`, `&#123;` and `&#x1F;` character references.
    /// Default: true
    #[serde(default = "default_true")]
    pub decode_entities: bool,

    /// Deepest container/bracket nesting parsed structurally; anything
    /// deeper is kept as literal text. Clamped to [`MAX_NESTING_DEPTH`].
    /// Default: 16
    #[serde(
        default = "default_max_nesting_depth",
        deserialize_with = "deserialize_nesting_depth"
    )]
    pub max_nesting_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tables: true,
            indented_code: false,
            decode_entities: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Merge another ParseOptions into this one.
    ///
    /// All fields are copied from `other`.
    pub fn merge(&mut self, other: &ParseOptions) {
        self.tables = other.tables;
        self.indented_code = other.indented_code;
        self.decode_entities = other.decode_entities;
        self.max_nesting_depth = other.max_nesting_depth;
    }

    /// The nesting limit the parser enforces, never above [`MAX_NESTING_DEPTH`].
    pub fn nesting_depth(&self) -> usize {
        self.max_nesting_depth.min(MAX_NESTING_DEPTH)
    }

    /// Strict CommonMark-like core without the table extension.
    pub fn commonmark() -> Self {
        Self {
            tables: false,
            indented_code: true,
            ..Self::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

fn deserialize_nesting_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    usize::deserialize(deserializer).map(|depth| depth.min(MAX_NESTING_DEPTH))
}
