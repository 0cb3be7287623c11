//! Renderer options.

use serde::{Deserialize, Serialize};

/// Shape of the data handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The full typed document tree
    #[default]
    Document,
    /// Heading-keyed data tree (headings become nested keys)
    Minified,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Document => write!(f, "document"),
            Mode::Minified => write!(f, "minified"),
        }
    }
}

/// Options shared by all renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderOptions {
    /// Pretty-print structured output (JSON, XML).
    /// Default: true
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Indent width used when pretty-printing and in the text outline.
    /// Default: 2
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Render the document tree or the minified data tree.
    /// Default: document
    #[serde(default)]
    pub mode: Mode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
            mode: Mode::Document,
        }
    }
}

impl RenderOptions {
    /// Merge another RenderOptions into this one.
    pub fn merge(&mut self, other: &RenderOptions) {
        self.pretty = other.pretty;
        self.indent = other.indent;
        self.mode = other.mode;
    }

    /// Default options with compact output.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    /// Default options in minified mode.
    pub fn minified() -> Self {
        Self {
            mode: Mode::Minified,
            ..Self::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_indent() -> usize {
    2
}
