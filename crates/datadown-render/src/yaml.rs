//! YAML renderer.

use crate::data::DataNode;
use crate::{Renderer, Result};
use datadown_config::RenderOptions;
use datadown_core::{ConvertError, Document};

const FORMAT: &str = "yaml";

/// The `yaml` / `yml` format.
///
/// Block style is always used; `serde_yaml` has no compact mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRenderer;

impl Renderer for YamlRenderer {
    fn name(&self) -> &str {
        FORMAT
    }

    fn aliases(&self) -> &[&str] {
        &["yml"]
    }

    fn render(&self, document: &Document, _options: &RenderOptions) -> Result<String> {
        serde_yaml::to_string(document).map_err(|e| ConvertError::serialization(FORMAT, e))
    }

    fn render_data(&self, data: &DataNode, _options: &RenderOptions) -> Result<String> {
        serde_yaml::to_string(data).map_err(|e| ConvertError::serialization(FORMAT, e))
    }
}
