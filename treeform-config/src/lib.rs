//! Shared configuration loader for treeform.
//!
//! `defaults/treeform.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`TreeformConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use treeform::document::is_valid_name;
use treeform::XmlOptions;

const DEFAULT_TOML: &str = include_str!("../defaults/treeform.default.toml");

/// Top-level configuration consumed by treeform applications.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeformConfig {
    pub engine: EngineConfig,
    pub xml: XmlConfig,
}

/// Dispatch engine knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// 0 means unbounded.
    pub max_depth: usize,
    pub fallback: bool,
}

impl EngineConfig {
    pub fn depth_limit(&self) -> Option<usize> {
        (self.max_depth > 0).then_some(self.max_depth)
    }
}

/// XML output knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct XmlConfig {
    pub root_tag: String,
    pub indent: String,
    pub declaration: bool,
}

impl XmlConfig {
    pub fn options(&self) -> XmlOptions {
        XmlOptions {
            indent: self.indent.clone(),
            declaration: self.declaration,
        }
    }
}

/// Builds a [`TreeformConfig`] from the embedded defaults plus whatever the
/// caller layers on top; later layers win key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Defaults only: unbounded depth, fallback on, `<objects>` root.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file that must exist, such as the CLI's `--config` argument.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that may be absent, such as a per-user settings file.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one dotted key, e.g. `engine.max_depth`, above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers, deserialize, and reject an `xml.root_tag` that is
    /// not a valid XML name.
    pub fn build(self) -> Result<TreeformConfig, ConfigError> {
        let config: TreeformConfig = self.builder.build()?.try_deserialize()?;
        if !is_valid_name(&config.xml.root_tag) {
            return Err(ConfigError::Message(format!(
                "xml.root_tag '{}' is not a valid XML name",
                config.xml.root_tag
            )));
        }
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults with nothing layered on top.
pub fn load_defaults() -> Result<TreeformConfig, ConfigError> {
    Loader::new().build()
}
