//! Output renderers and the renderer registry.
//!
//! Each output format implements [`Renderer`]; the registry maps names to
//! renderer instances and supports extension-based detection for CLI use.
//! Rendering is one-way: documents come in through the parsers, never back
//! through a renderer.

pub mod html;
pub mod markdown;

pub use html::{render_html, HtmlOptions};
pub use markdown::{render_markdown, Flavor, LineBreakStyle, MarkdownOptions};

use crate::error::ClipError;
use crate::model::ClippyContent;
use std::collections::HashMap;

/// Trait for output renderers
///
/// Implementors serialize a document into one output format. Options are
/// carried by the renderer instance itself, so a registry can hold several
/// pre-configured variants of the same format.
pub trait Renderer: Send + Sync {
    /// The name of this renderer (e.g., "html", "markdown", "json")
    fn name(&self) -> &str;

    /// Optional description of this renderer
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this renderer (e.g., ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for automatic renderer detection from output filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Render a document into this output format
    fn render(&self, content: &ClippyContent) -> Result<String, ClipError>;
}

/// HTML fragment output.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    pub options: HtmlOptions,
}

impl Renderer for HtmlRenderer {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragment"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn render(&self, content: &ClippyContent) -> Result<String, ClipError> {
        render_html(content, &self.options)
    }
}

/// Flavor-aware Markdown output.
#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    pub options: MarkdownOptions,
}

impl MarkdownRenderer {
    pub fn for_flavor(flavor: Flavor) -> Self {
        Self {
            options: MarkdownOptions::for_flavor(flavor),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Markdown (github, discord, slack, or standard flavor)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn render(&self, content: &ClippyContent) -> Result<String, ClipError> {
        Ok(render_markdown(content, &self.options))
    }
}

/// Pretty-printed canonical JSON, the interchange form itself.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Canonical JSON interchange form"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn render(&self, content: &ClippyContent) -> Result<String, ClipError> {
        content.to_json_pretty()
    }
}

/// Registry of output renderers
///
/// Renderers are registered and retrieved by name.
///
/// # Examples
///
/// ```ignore
/// let registry = RendererRegistry::default();
/// let renderer = registry.get("markdown")?;
/// let output = renderer.render(&content)?;
/// ```
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        RendererRegistry {
            renderers: HashMap::new(),
        }
    }

    /// Register a renderer
    ///
    /// If a renderer with the same name already exists, it will be replaced.
    pub fn register<R: Renderer + 'static>(&mut self, renderer: R) {
        self.renderers
            .insert(renderer.name().to_string(), Box::new(renderer));
    }

    /// Get a renderer by name
    pub fn get(&self, name: &str) -> Result<&dyn Renderer, ClipError> {
        self.renderers
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ClipError::UnknownRenderer(name.to_string()))
    }

    /// Check if a renderer exists
    pub fn has(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// List all available renderer names (sorted)
    pub fn list_renderers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect renderer from filename based on file extension
    ///
    /// Returns the renderer name if a matching extension is found, or None
    /// otherwise.
    pub fn detect_renderer_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        for renderer in self.renderers.values() {
            if renderer.file_extensions().contains(&extension) {
                return Some(renderer.name().to_string());
            }
        }

        None
    }

    /// Render a document using the named renderer
    pub fn render(&self, content: &ClippyContent, name: &str) -> Result<String, ClipError> {
        self.get(name)?.render(content)
    }

    /// Create a registry with the built-in renderers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HtmlRenderer::default());
        registry.register(MarkdownRenderer::default());
        registry.register(JsonRenderer);
        registry
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
