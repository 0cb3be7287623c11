//! The conversion pipeline: format lookup, parsing, rendering.

use datadown_config::{Config, Mode};
use datadown_core::Result;
use datadown_parser::parse_document;
use datadown_render::{registry, to_data, Registry};
use log::{debug, trace};

/// A rendered document tagged with the canonical format that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Canonical format id (aliases are resolved, e.g. `yml` gives `yaml`)
    pub format: String,
    /// The rendered output
    pub output: String,
}

/// Convert Markdown into `format` with the default configuration.
///
/// # Example
///
/// ```
/// let json = datadown::convert("*unclosed", "json").unwrap();
/// assert!(json.contains("\"value\": \"*unclosed\""));
/// ```
pub fn convert(text: &str, format: &str) -> Result<String> {
    Converter::new().convert(text, format)
}

/// Convert Markdown into `format` with an explicit configuration.
pub fn convert_with(text: &str, format: &str, config: &Config) -> Result<String> {
    Converter::with_config(config.clone()).convert(text, format)
}

/// Reusable conversion settings.
///
/// A `Converter` holds no per-call state, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Converter {
    config: Config,
    registry: &'static Registry,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Converter with the default configuration and the built-in formats.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            registry: registry(),
        }
    }

    /// Use a caller-built registry instead of the built-in one.
    pub fn with_registry(mut self, registry: &'static Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn convert(&self, text: &str, format: &str) -> Result<String> {
        self.convert_tagged(text, format).map(|c| c.output)
    }

    /// Convert and report which format was used.
    ///
    /// The format is resolved before any parsing happens.
    pub fn convert_tagged(&self, text: &str, format: &str) -> Result<Conversion> {
        let renderer = self.registry.lookup(format)?;
        debug!(
            "converting {} bytes to {} ({} mode)",
            text.len(),
            renderer.name(),
            self.config.render.mode
        );

        let document = parse_document(text, &self.config.parse)?;
        trace!("parsed {} top-level blocks", document.children.len());

        let output = match self.config.render.mode {
            Mode::Document => renderer.render(&document, &self.config.render)?,
            Mode::Minified => renderer.render_data(&to_data(&document), &self.config.render)?,
        };
        debug!("rendered {} bytes of {}", output.len(), renderer.name());

        Ok(Conversion {
            format: renderer.name().to_string(),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadown_config::RenderOptions;
    use datadown_core::{ConvertError, Document, ErrorKind};
    use datadown_render::{DataNode, Renderer};
    use std::sync::LazyLock;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    struct CountRenderer;

    impl Renderer for CountRenderer {
        fn name(&self) -> &str {
            "count"
        }

        fn render(&self, document: &Document, _options: &RenderOptions) -> Result<String> {
            Ok(document.children.len().to_string())
        }

        fn render_data(&self, _data: &DataNode, _options: &RenderOptions) -> Result<String> {
            Err(ConvertError::serialization("count", "no data mode"))
        }
    }

    static CUSTOM: LazyLock<Registry> = LazyLock::new(|| {
        let mut registry = Registry::new();
        registry.register(Box::new(CountRenderer));
        registry
    });

    #[test]
    fn test_convert_json() {
        init();
        let out = convert("# Hi", "json").unwrap();
        assert!(out.contains("\"type\": \"heading\""));
    }

    #[test]
    fn test_unsupported_format() {
        init();
        let err = convert("# Hi", "docx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(matches!(err, ConvertError::UnsupportedFormat(ref id) if id == "docx"));
    }

    #[test]
    fn test_tagged_resolves_alias() {
        init();
        let conversion = Converter::new().convert_tagged("text", " YML ").unwrap();
        assert_eq!(conversion.format, "yaml");
        assert!(conversion.output.contains("type: document"));
    }

    #[test]
    fn test_convert_with_compact_config() {
        init();
        let config = Config::from_toml_str("[render]\nPretty = false").unwrap();
        let out = convert_with("a", "json", &config).unwrap();
        assert_eq!(
            out,
            r#"{"type":"document","children":[{"type":"paragraph","children":[{"type":"text","value":"a"}]}]}"#
        );
    }

    #[test]
    fn test_minified_mode() {
        init();
        let config = Config::from_toml_str("[render]\nMode = \"minified\"\nPretty = false").unwrap();
        let out = convert_with("# A\n\nbody\n\n## B\n\n- x\n- y", "json", &config).unwrap();
        assert_eq!(out, r#"{"A":{"B":["x","y"]}}"#);
    }

    #[test]
    fn test_custom_registry() {
        init();
        let converter = Converter::new().with_registry(&CUSTOM);
        assert_eq!(converter.convert("# a\n\nb", "COUNT").unwrap(), "2");
        assert_eq!(
            converter.convert("a", "json").unwrap_err().kind(),
            ErrorKind::UnsupportedFormat
        );
    }

    #[test]
    fn test_parse_options_are_applied() {
        init();
        let config = Config::from_toml_str("[parse]\nTables = false").unwrap();
        let converter = Converter::with_config(config);
        let out = converter.convert("| a |\n|---|", "json").unwrap();
        assert!(!out.contains("\"table\""));
    }
}
