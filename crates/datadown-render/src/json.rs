//! JSON renderer.

use crate::data::DataNode;
use crate::{Renderer, Result};
use datadown_config::RenderOptions;
use datadown_core::{ConvertError, Document};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

const FORMAT: &str = "json";

/// The `json` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        FORMAT
    }

    fn render(&self, document: &Document, options: &RenderOptions) -> Result<String> {
        to_json(document, options)
    }

    fn render_data(&self, data: &DataNode, options: &RenderOptions) -> Result<String> {
        to_json(data, options)
    }
}

/// Serialize with the indent width from `options`, or compactly.
fn to_json<T: Serialize>(value: &T, options: &RenderOptions) -> Result<String> {
    if !options.pretty {
        return serde_json::to_string(value).map_err(|e| ConvertError::serialization(FORMAT, e));
    }

    let indent = " ".repeat(options.indent);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value
        .serialize(&mut serializer)
        .map_err(|e| ConvertError::serialization(FORMAT, e))?;
    String::from_utf8(buf).map_err(|e| ConvertError::serialization(FORMAT, e))
}
