//! Shared configuration loader for the clip toolchain.
//!
//! `defaults/clip.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files
//! on top of those defaults via [`Loader`] before deserializing into
//! [`ClipConfig`].

use clip_content::parse::{EmptyBlockPolicy, IdPolicy, ParseOptions};
use clip_content::render::{Flavor, HtmlOptions, LineBreakStyle, MarkdownOptions};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/clip.default.toml");

/// Top-level configuration consumed by clip applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipConfig {
    pub parse: ParseConfig,
    pub markdown: MarkdownConfig,
    pub html: HtmlConfig,
}

/// Mirrors the knobs exposed by the HTML parser.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub nesting_limit: usize,
    pub id_policy: IdPolicy,
    pub empty_block_policy: EmptyBlockPolicy,
    pub preserve_whitespace: bool,
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        ParseOptions {
            nesting_limit: config.nesting_limit,
            id_policy: config.id_policy,
            empty_block_policy: config.empty_block_policy,
            preserve_whitespace: config.preserve_whitespace,
            ..ParseOptions::default()
        }
    }
}

/// Mirrors the knobs exposed by the Markdown renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub flavor: Flavor,
    pub use_code_fences: bool,
    pub max_nesting_level: usize,
    pub line_break_style: LineBreakStyle,
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        MarkdownOptions {
            flavor: config.flavor,
            use_code_fences: config.use_code_fences,
            max_nesting_level: config.max_nesting_level,
            line_break_style: config.line_break_style,
        }
    }
}

/// Mirrors the knobs exposed by the HTML renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub semantic_tags: bool,
    pub clean_output: bool,
}

impl From<&HtmlConfig> for HtmlOptions {
    fn from(config: &HtmlConfig) -> Self {
        HtmlOptions {
            semantic_tags: config.semantic_tags,
            clean_output: config.clean_output,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ClipConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ClipConfig, ConfigError> {
    Loader::new().build()
}
