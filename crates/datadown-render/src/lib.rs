//! Datadown Render
//!
//! Serializers that turn a parsed [`Document`] (or its minified
//! [`DataNode`] form) into an output format, and the registry that
//! resolves format identifiers to them.
//!
//! # Example
//!
//! ```
//! use datadown_config::RenderOptions;
//! use datadown_core::{Block, Document, Inline};
//! use datadown_render::registry;
//!
//! let doc = Document::new(vec![Block::Paragraph {
//!     children: vec![Inline::text("hi")],
//! }]);
//! let json = registry()
//!     .lookup("JSON")
//!     .unwrap()
//!     .render(&doc, &RenderOptions::compact())
//!     .unwrap();
//! assert_eq!(json, r#"{"type":"document","children":[{"type":"paragraph","children":[{"type":"text","value":"hi"}]}]}"#);
//! ```

pub mod data;
pub mod json;
pub mod outline;
pub mod sanitize;
pub mod table;
pub mod toml_fmt;
pub mod xml;
pub mod yaml;

pub use data::{to_data, DataNode};
pub use datadown_core::Result;
pub use json::JsonRenderer;
pub use outline::OutlineRenderer;
pub use toml_fmt::TomlRenderer;
pub use xml::XmlRenderer;
pub use yaml::YamlRenderer;

use datadown_config::RenderOptions;
use datadown_core::{ConvertError, Document};
use log::debug;
use std::collections::HashMap;
use std::sync::LazyLock;

/// An output format.
///
/// Renderers are stateless; one instance serves every conversion.
pub trait Renderer: Send + Sync {
    /// Canonical format identifier, lowercase.
    fn name(&self) -> &str;

    /// Additional identifiers that resolve to this renderer.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Serialize the full document tree.
    fn render(&self, document: &Document, options: &RenderOptions) -> Result<String>;

    /// Serialize the heading-keyed data tree.
    fn render_data(&self, data: &DataNode, options: &RenderOptions) -> Result<String>;
}

/// Get all built-in renderers.
pub fn builtin_renderers() -> Vec<Box<dyn Renderer>> {
    vec![
        Box::new(JsonRenderer),
        Box::new(YamlRenderer),
        Box::new(TomlRenderer),
        Box::new(XmlRenderer),
        Box::new(OutlineRenderer),
    ]
}

/// Registry mapping format identifiers to renderers.
///
/// Identifiers are matched case-insensitively after trimming whitespace.
#[derive(Default)]
pub struct Registry {
    /// Registered renderers in registration order
    renderers: Vec<Box<dyn Renderer>>,
    /// Normalized identifier (name or alias) to index in `renderers`
    ids: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in renderers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for renderer in builtin_renderers() {
            registry.register(renderer);
        }
        registry
    }

    /// Register a renderer under its name and aliases.
    ///
    /// A later registration takes over identifiers already in use.
    pub fn register(&mut self, renderer: Box<dyn Renderer>) {
        let idx = self.renderers.len();
        let ids: Vec<String> = std::iter::once(renderer.name())
            .chain(renderer.aliases().iter().copied())
            .map(normalize_id)
            .collect();
        for id in ids {
            if self.ids.insert(id.clone(), idx).is_some() {
                debug!("format id '{}' re-registered", id);
            }
        }
        self.renderers.push(renderer);
    }

    /// Resolve a format identifier.
    pub fn lookup(&self, format: &str) -> Result<&dyn Renderer> {
        self.ids
            .get(&normalize_id(format))
            .map(|&idx| self.renderers[idx].as_ref())
            .ok_or_else(|| ConvertError::UnsupportedFormat(format.to_string()))
    }

    /// Check whether a format identifier resolves.
    pub fn contains(&self, format: &str) -> bool {
        self.ids.contains_key(&normalize_id(format))
    }

    /// Canonical names of the formats that currently resolve.
    pub fn formats(&self) -> Vec<&str> {
        self.renderers
            .iter()
            .enumerate()
            .filter(|(idx, r)| self.ids.get(&normalize_id(r.name())) == Some(idx))
            .map(|(_, r)| r.name())
            .collect()
    }

    /// Get the number of registered renderers.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Check if no renderer is registered.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("formats", &self.formats())
            .finish()
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::with_builtins);

/// The process-wide registry of built-in formats.
///
/// Built on first use and read-only afterwards.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadown_core::ErrorKind;

    struct ShoutRenderer;

    impl Renderer for ShoutRenderer {
        fn name(&self) -> &str {
            "shout"
        }

        fn aliases(&self) -> &[&str] {
            &["json"]
        }

        fn render(&self, document: &Document, _options: &RenderOptions) -> Result<String> {
            Ok(format!("{} BLOCKS", document.children.len()))
        }

        fn render_data(&self, _data: &DataNode, _options: &RenderOptions) -> Result<String> {
            Ok("DATA".to_string())
        }
    }

    #[test]
    fn test_builtin_formats() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.formats(), vec!["json", "yaml", "toml", "xml", "text"]);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_trimmed() {
        let registry = registry();
        assert_eq!(registry.lookup("JSON").unwrap().name(), "json");
        assert_eq!(registry.lookup(" yml ").unwrap().name(), "yaml");
        assert_eq!(registry.lookup("Outline").unwrap().name(), "text");
        assert!(registry.contains("xml"));
        assert!(!registry.contains("pdf"));
    }

    #[test]
    fn test_lookup_unknown_format() {
        let Err(err) = registry().lookup("xml-not-registered") else {
            panic!("xml-not-registered resolved to a renderer");
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(err.to_string(), "unsupported format: xml-not-registered");
    }

    #[test]
    fn test_register_overrides_alias() {
        let mut registry = Registry::with_builtins();
        registry.register(Box::new(ShoutRenderer));

        let doc = Document::default();
        let out = registry
            .lookup("json")
            .unwrap()
            .render(&doc, &RenderOptions::default())
            .unwrap();
        assert_eq!(out, "0 BLOCKS");
        assert!(!registry.formats().contains(&"json"));
        assert!(registry.formats().contains(&"shout"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("json").is_err());
    }
}
