//! Normalized rich-text content captured from web pages
//!
//!     This crate is the core of the clip toolchain: it parses captured HTML
//!     (or plain text) into a normalized block/inline document model, checks
//!     and repairs it, and renders it back out as HTML, flavor-aware
//!     Markdown, or canonical JSON.
//!
//!     TLDR for renderer authors:
//!         - Parsing is fail-open: malformed input degrades, it never errors.
//!           Rendering may error (serializer failures), checking never does.
//!         - New output formats implement the Renderer trait (./render/mod.rs)
//!           and register in RendererRegistry. Options live on the renderer
//!           instance, not on the call.
//!         - The model is the contract. Renderers take `&ClippyContent` and
//!           must handle every block and inline variant; the closed enums make
//!           the compiler enforce that.
//!
//! Architecture
//!
//!     Everything flows through one value type, [`ClippyContent`]
//!     (./model.rs): a version tag, ordered blocks, optional capture
//!     metadata. The parser is the only producer, the renderers are the only
//!     consumers, and the validator sits between them for documents that
//!     arrive over the wire instead of through our own parser.
//!
//!     This is a pure lib: it powers clip-cli but is shell agnostic, no code
//!     here should suppose a shell environment, std print, env vars etc.
//!     Diagnostics go through tracing.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── links.rs                # Shared link target policy
//!     ├── model.rs                # Document model + size limits
//!     ├── parse
//!     │   ├── block.rs            # HTML block structure + plain text
//!     │   ├── inline.rs           # Formatting runs, links, whitespace
//!     │   └── mod.rs              # Options, warnings, session state
//!     ├── platform.rs             # Capability records + compatibility check
//!     ├── render
//!     │   ├── html.rs
//!     │   ├── markdown.rs         # Flavor-aware, hand-written
//!     │   └── mod.rs              # Renderer trait + RendererRegistry
//!     └── validate.rs             # validate() and sanitize()
//!
//! Core Algorithms
//!
//!     The hard part of HTML capture is that real pages nest arbitrarily and
//!     interleave block and inline content freely, while the model is strict:
//!     blocks at the top, inline runs inside them, lists as pure trees with
//!     at most one nested list per item. The block parser (./parse/block.rs)
//!     does that flattening, and the inline walker (./parse/inline.rs)
//!     resolves arbitrarily nested formatting tags into flat spans carrying
//!     a formatting set, merging adjacent equal-formatted runs.
//!
//!     Markdown output is hand-written rather than delegated to a Markdown
//!     library because two of the dialects we target (Slack, Discord) are
//!     not CommonMark and no serializer crate speaks them.
//!
//! Library Choices
//!
//!     HTML parsing and serialization are offloaded to html5ever with the
//!     rcdom tree — we never hand-parse markup. Timestamps are chrono,
//!     errors are thiserror enums per concern, diagnostics are tracing.
//!     Serde does the wire shape; the JSON form is the interchange format
//!     other tools in the toolchain consume, so its field names and type
//!     tags are stable.

pub mod error;
pub mod links;
pub mod model;
pub mod parse;
pub mod platform;
pub mod render;
pub mod validate;

pub use error::ClipError;
pub use model::{
    BlockKind, ClippyContent, ContentBlock, ContentMetadata, Formatting, FormattingKind,
    InlineContent,
};
pub use parse::{parse_document, parse_document_full, parse_text, ParseOptions, ParseWarning};
pub use platform::{
    validate_for_platform, CompatibilityReport, PlatformCapabilities, PlatformRegistry,
};
pub use render::{
    render_html, render_markdown, Flavor, HtmlOptions, MarkdownOptions, Renderer, RendererRegistry,
};
pub use validate::{sanitize, validate, ValidationReport};
