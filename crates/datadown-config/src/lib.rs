//! Datadown Config
//!
//! This crate holds the options that steer parsing and rendering,
//! and loads them from TOML.
//!
//! # Example
//!
//! ```
//! use datadown_config::Config;
//!
//! let config = Config::from_toml_str("[parse]\nTables = false").unwrap();
//! assert!(!config.parse.tables);
//! assert!(config.render.pretty);
//! ```

mod parse;
mod render;

pub use parse::{ParseOptions, DEFAULT_MAX_NESTING_DEPTH, MAX_NESTING_DEPTH};
pub use render::{Mode, RenderOptions};

pub use datadown_core::Result;

use datadown_core::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default TOML configuration string.
///
/// [`Config::default()`] and this string describe the same configuration.
const DEFAULT_TOML: &str = r#"[parse]
Tables          = true
IndentedCode    = false
DecodeEntities  = true
MaxNestingDepth = 16

[render]
Pretty = true
Indent = 2
Mode   = "document"
"#;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Markdown dialect options
    #[serde(default)]
    pub parse: ParseOptions,

    /// Output options
    #[serde(default)]
    pub render: RenderOptions,
}

impl Config {
    /// Returns the default TOML configuration string.
    ///
    /// # Example
    ///
    /// ```
    /// use datadown_config::Config;
    /// let toml = Config::default_toml();
    /// assert!(toml.contains("[parse]"));
    /// assert!(toml.contains("[render]"));
    /// ```
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }

    /// Parse a configuration from a TOML string.
    ///
    /// Missing sections and keys take their default values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConvertError::Config(format!("Parse error: {}", e)))
    }

    /// Load configuration from a specific path.
    ///
    /// ```no_run
    /// use datadown_config::Config;
    /// use std::path::Path;
    /// let config = Config::load_from(Path::new("./datadown.toml")).unwrap();
    /// ```
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ConvertError::Config(format!("Parse error in {}: {}", path.display(), e))
        })
    }

    /// Merge another config into this one.
    ///
    /// Values from `other` take precedence over values in `self`.
    ///
    /// ```
    /// use datadown_config::Config;
    ///
    /// let mut base = Config::default();
    /// let override_config = Config::from_toml_str("[render]\nPretty = false").unwrap();
    ///
    /// base.merge(&override_config);
    /// assert!(!base.render.pretty);
    /// ```
    pub fn merge(&mut self, other: &Config) {
        self.parse.merge(&other.parse);
        self.render.merge(&other.render);
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConvertError::Config(format!("Serialization error: {}", e)))?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadown_core::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.parse.tables);
        assert!(!config.parse.indented_code);
        assert!(config.render.pretty);
        assert_eq!(config.render.mode, Mode::Document);
    }

    #[test]
    fn test_default_toml_matches_default() {
        let config: Config = toml::from_str(DEFAULT_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[parse\nTables = ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_merge() {
        let mut base = Config::default();
        let override_toml = r#"
            [parse]
            Tables = false
            [render]
            Mode = "minified"
        "#;
        let override_config = Config::from_toml_str(override_toml).unwrap();

        base.merge(&override_config);
        assert!(!base.parse.tables);
        assert_eq!(base.render.mode, Mode::Minified);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load_from(Path::new("/definitely/not/here/datadown.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("datadown-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.parse.max_nesting_depth = 10;
        config.render.indent = 4;

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
