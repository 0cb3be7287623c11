//! TOML renderer.

use crate::data::DataNode;
use crate::{Renderer, Result};
use datadown_config::RenderOptions;
use datadown_core::{ConvertError, Document};
use serde::Serialize;

const FORMAT: &str = "toml";

/// The `toml` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlRenderer;

impl Renderer for TomlRenderer {
    fn name(&self) -> &str {
        FORMAT
    }

    fn render(&self, document: &Document, options: &RenderOptions) -> Result<String> {
        to_toml(document, options)
    }

    fn render_data(&self, data: &DataNode, options: &RenderOptions) -> Result<String> {
        to_toml(data, options)
    }
}

fn to_toml<T: Serialize>(value: &T, options: &RenderOptions) -> Result<String> {
    let result = if options.pretty {
        ::toml::to_string_pretty(value)
    } else {
        ::toml::to_string(value)
    };
    result.map_err(|e| ConvertError::serialization(FORMAT, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadown_core::{Block, Inline};

    #[test]
    fn test_render_document() {
        let doc = Document::new(vec![
            Block::Heading {
                level: 1,
                children: vec![Inline::text("Title")],
            },
            Block::ThematicBreak,
        ]);
        let out = TomlRenderer.render(&doc, &RenderOptions::default()).unwrap();
        assert!(out.contains(r#"type = "document""#));

        let back: Document = ::toml::from_str(&out).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_render_data() {
        let data = DataNode::Map(vec![(
            "Section".to_string(),
            DataNode::Map(vec![("key".to_string(), DataNode::String("value".to_string()))]),
        )]);
        let out = TomlRenderer.render_data(&data, &RenderOptions::default()).unwrap();
        let value: ::toml::Value = ::toml::from_str(&out).unwrap();
        assert_eq!(value["Section"]["key"].as_str(), Some("value"));
    }
}
