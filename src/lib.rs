//! Datadown - convert Markdown into structured data.
//!
//! Markdown text is parsed into a typed document tree, which a renderer
//! then serializes into JSON, YAML, TOML, XML or a plain-text outline.
//! Parsing is total: malformed markup degrades to literal text, so the
//! only error an ordinary caller sees is an unknown format id.
//!
//! # Example
//!
//! ```
//! use datadown::{convert, ErrorKind};
//!
//! let json = datadown::convert("# Hello world\n\nThis is **bold**.", "json").unwrap();
//! assert!(json.contains("\"type\": \"strong\""));
//!
//! let err = convert("anything", "docx").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
//! ```
//!
//! # Minified mode
//!
//! With [`Mode::Minified`], headings become nested keys and the content
//! under them becomes strings or lists:
//!
//! ```
//! use datadown::{convert_with, Config};
//!
//! let config = Config::from_toml_str("[render]\nMode = \"minified\"\nPretty = false").unwrap();
//! let json = convert_with("# Fruit\n\n- apple\n- pear", "json", &config).unwrap();
//! assert_eq!(json, r#"{"Fruit":["apple","pear"]}"#);
//! ```

mod convert;

pub use convert::{convert, convert_with, Conversion, Converter};

pub use datadown_config::{Config, Mode, ParseOptions, RenderOptions};
pub use datadown_core::{
    Alignment, Block, ConvertError, Document, ErrorKind, Inline, ListItem, Result, TableCell,
};
pub use datadown_parser::parse_document;
pub use datadown_render::{registry, to_data, DataNode, Registry, Renderer};
