//! Core data structures for captured content.
//!
//! A [`ClippyContent`] is the normalized, platform-independent form of a web
//! capture: a version tag, an ordered sequence of blocks, and optional
//! capture metadata. Blocks and inline runs are closed sum types so every
//! dispatch site (parser, validator, renderers) is checked for
//! exhaustiveness. Values are built once by the parser (or repaired once by
//! `sanitize`) and consumed immutably after that.

use crate::error::ClipError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural and size limits enforced by the parser and checked by the
/// validator. They exist to bound work on untrusted captured markup.
pub mod limits {
    /// Maximum number of top-level blocks in a document.
    pub const MAX_BLOCKS: usize = 1000;
    /// Maximum text length of a single span, in bytes.
    pub const MAX_TEXT_LEN: usize = 50_000;
    /// Maximum length of a link target.
    pub const MAX_URL_LEN: usize = 2000;
    /// Maximum length of a quote citation.
    pub const MAX_CITATION_LEN: usize = 500;
    /// Default cap on list nesting depth.
    pub const DEFAULT_NESTING_LIMIT: usize = 10;
}

/// Root document value: version tag, ordered blocks, capture metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippyContent {
    pub version: String,
    pub blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ContentMetadata>,
}

impl ClippyContent {
    /// The wire format version this library produces and accepts.
    pub const VERSION: &'static str = "1.0";

    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            blocks,
            metadata: None,
        }
    }

    /// A document with zero blocks, as produced for empty input.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_metadata(mut self, metadata: ContentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Serialize to the JSON wire shape.
    pub fn to_json(&self) -> Result<String, ClipError> {
        serde_json::to_string(self).map_err(|e| ClipError::Structural(e.to_string()))
    }

    /// Pretty-printed JSON wire shape, as emitted by the CLI.
    pub fn to_json_pretty(&self) -> Result<String, ClipError> {
        serde_json::to_string_pretty(self).map_err(|e| ClipError::Structural(e.to_string()))
    }

    /// Deserialize from the JSON wire shape.
    ///
    /// Shape errors (unknown type tags, missing fields, mistyped
    /// formatting flags) surface here; semantic invariants are the
    /// validator's job.
    pub fn from_json(source: &str) -> Result<Self, ClipError> {
        serde_json::from_str(source).map_err(|e| ClipError::Structural(e.to_string()))
    }
}

/// Capture provenance, supplied by the upstream capture collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_format: Option<String>,
}

/// A structural unit of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Paragraph(Paragraph),
    Heading(Heading),
    List(List),
    Quote(Quote),
    Code(CodeBlock),
    Divider(Divider),
}

impl ContentBlock {
    pub fn id(&self) -> &str {
        match self {
            ContentBlock::Paragraph(b) => &b.id,
            ContentBlock::Heading(b) => &b.id,
            ContentBlock::List(b) => &b.id,
            ContentBlock::Quote(b) => &b.id,
            ContentBlock::Code(b) => &b.id,
            ContentBlock::Divider(b) => &b.id,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Paragraph(_) => BlockKind::Paragraph,
            ContentBlock::Heading(_) => BlockKind::Heading,
            ContentBlock::List(_) => BlockKind::List,
            ContentBlock::Quote(_) => BlockKind::Quote,
            ContentBlock::Code(_) => BlockKind::Code,
            ContentBlock::Divider(_) => BlockKind::Divider,
        }
    }
}

/// A paragraph of inline content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub id: String,
    pub content: Vec<InlineContent>,
}

/// A heading with level 1-6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    pub id: String,
    pub level: u8,
    pub content: Vec<InlineContent>,
}

/// An ordered or bulleted list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub list_type: ListType,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListType {
    Bulleted,
    Numbered,
}

/// A list item: inline content plus at most one nested list.
///
/// The nested list is an owned, single optional link, so the whole
/// structure is a pure tree and ordinary value ownership suffices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub content: Vec<InlineContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<List>>,
}

/// A quotation with an optional citation string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub content: Vec<InlineContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// A block of preformatted text with an optional language tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A thematic break. Never considered empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Divider {
    pub id: String,
}

/// A run of inline content inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineContent {
    Text(TextSpan),
    Link(LinkSpan),
    LineBreak,
}

impl InlineContent {
    /// Plain unformatted text, the most common span.
    pub fn text(text: impl Into<String>) -> Self {
        InlineContent::Text(TextSpan {
            text: text.into(),
            formatting: Formatting::default(),
        })
    }

    /// The visible text of this element, empty for line breaks.
    pub fn visible_text(&self) -> &str {
        match self {
            InlineContent::Text(span) => &span.text,
            InlineContent::Link(span) => &span.text,
            InlineContent::LineBreak => "",
        }
    }
}

/// A formatted text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub text: String,
    #[serde(default, skip_serializing_if = "Formatting::is_plain")]
    pub formatting: Formatting,
}

/// A link with display text and a formatting snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpan {
    pub url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Formatting::is_plain")]
    pub formatting: Formatting,
}

/// The formatting set attached to a span.
///
/// Always a full set of booleans; a missing flag on the wire
/// deserializes to `false`, so there is no absent-vs-false ambiguity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formatting {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Formatting {
    pub fn is_plain(&self) -> bool {
        *self == Formatting::default()
    }

    /// Copy of this set with one more flag enabled.
    pub fn with(mut self, kind: FormattingKind) -> Self {
        match kind {
            FormattingKind::Bold => self.bold = true,
            FormattingKind::Italic => self.italic = true,
            FormattingKind::Underline => self.underline = true,
            FormattingKind::Strikethrough => self.strikethrough = true,
            FormattingKind::Code => self.code = true,
        }
        self
    }

    pub fn contains(&self, kind: FormattingKind) -> bool {
        match kind {
            FormattingKind::Bold => self.bold,
            FormattingKind::Italic => self.italic,
            FormattingKind::Underline => self.underline,
            FormattingKind::Strikethrough => self.strikethrough,
            FormattingKind::Code => self.code,
        }
    }

    /// Active flags, in the canonical nesting order used by the renderers
    /// (code innermost, strikethrough outermost).
    pub fn active_kinds(&self) -> impl Iterator<Item = FormattingKind> + '_ {
        FormattingKind::CANONICAL_ORDER
            .iter()
            .copied()
            .filter(|kind| self.contains(*kind))
    }
}

/// Names of the block variants, used by capability records and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Quote,
    Code,
    Divider,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading => "heading",
            BlockKind::List => "list",
            BlockKind::Quote => "quote",
            BlockKind::Code => "code",
            BlockKind::Divider => "divider",
        };
        f.write_str(name)
    }
}

/// Names of the formatting flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormattingKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl FormattingKind {
    /// Innermost-first wrapping order for rendered output.
    pub const CANONICAL_ORDER: [FormattingKind; 5] = [
        FormattingKind::Code,
        FormattingKind::Bold,
        FormattingKind::Italic,
        FormattingKind::Underline,
        FormattingKind::Strikethrough,
    ];
}

impl fmt::Display for FormattingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormattingKind::Bold => "bold",
            FormattingKind::Italic => "italic",
            FormattingKind::Underline => "underline",
            FormattingKind::Strikethrough => "strikethrough",
            FormattingKind::Code => "code",
        };
        f.write_str(name)
    }
}
