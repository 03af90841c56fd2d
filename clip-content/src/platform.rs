//! Platform capability records and compatibility checking.
//!
//! A [`PlatformCapabilities`] record describes what one paste target can
//! represent: which block kinds, which formatting flags, how deep lists may
//! nest, whether links survive. [`validate_for_platform`] walks a document
//! against a record and reports what would degrade. The check never
//! mutates; degradation itself happens in the renderers.

use crate::model::{BlockKind, ClippyContent, ContentBlock, FormattingKind, InlineContent, List};
use crate::error::ClipError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// The output format a platform prefers to receive. `Delta` covers
/// editors that paste a JSON op-list (Quill and friends); we hand those
/// the wire JSON and let the collaborator translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredFormat {
    Html,
    Markdown,
    Delta,
    PlainText,
}

/// What one paste target can represent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCapabilities {
    pub supported_blocks: BTreeSet<BlockKind>,
    pub supported_formatting: BTreeSet<FormattingKind>,
    pub max_nesting_level: usize,
    pub has_link_support: bool,
    pub preferred_format: PreferredFormat,
}

/// One thing that would degrade when pasting into a platform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompatibilityIssue {
    #[error("block '{id}' is a {kind}, which the platform cannot represent")]
    UnsupportedBlock { id: String, kind: BlockKind },
    #[error("block '{id}' uses {kind} formatting, which the platform drops")]
    UnsupportedFormatting { id: String, kind: FormattingKind },
    #[error("list '{id}' nests {depth} levels deep, platform allows {limit}")]
    NestingTooDeep {
        id: String,
        depth: usize,
        limit: usize,
    },
    #[error("block '{id}' contains a link, which the platform renders as text")]
    LinksUnsupported { id: String },
}

/// Outcome of checking one document against one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub issues: Vec<CompatibilityIssue>,
}

/// Check a document against a capability record. Advisory only: every
/// issue describes a lossy-but-renderable degradation.
pub fn validate_for_platform(
    content: &ClippyContent,
    capabilities: &PlatformCapabilities,
) -> CompatibilityReport {
    let mut issues = Vec::new();
    for block in &content.blocks {
        check_block(block, capabilities, &mut issues);
    }
    CompatibilityReport {
        compatible: issues.is_empty(),
        issues,
    }
}

fn check_block(
    block: &ContentBlock,
    capabilities: &PlatformCapabilities,
    issues: &mut Vec<CompatibilityIssue>,
) {
    let kind = block.kind();
    if !capabilities.supported_blocks.contains(&kind) {
        issues.push(CompatibilityIssue::UnsupportedBlock {
            id: block.id().to_string(),
            kind,
        });
    }

    match block {
        ContentBlock::Paragraph(b) => check_inline(&b.id, &b.content, capabilities, issues),
        ContentBlock::Heading(b) => check_inline(&b.id, &b.content, capabilities, issues),
        ContentBlock::Quote(b) => check_inline(&b.id, &b.content, capabilities, issues),
        ContentBlock::List(list) => check_list(list, 1, capabilities, issues),
        ContentBlock::Code(_) | ContentBlock::Divider(_) => {}
    }
}

fn check_list(
    list: &List,
    depth: usize,
    capabilities: &PlatformCapabilities,
    issues: &mut Vec<CompatibilityIssue>,
) {
    if depth > capabilities.max_nesting_level {
        issues.push(CompatibilityIssue::NestingTooDeep {
            id: list.id.clone(),
            depth,
            limit: capabilities.max_nesting_level,
        });
        // One report per over-deep subtree is enough.
        return;
    }
    for item in &list.items {
        check_inline(&item.id, &item.content, capabilities, issues);
        if let Some(nested) = &item.nested {
            check_list(nested, depth + 1, capabilities, issues);
        }
    }
}

fn check_inline(
    id: &str,
    content: &[InlineContent],
    capabilities: &PlatformCapabilities,
    issues: &mut Vec<CompatibilityIssue>,
) {
    let mut reported_kinds = BTreeSet::new();
    let mut reported_link = false;
    for span in content {
        let formatting = match span {
            InlineContent::Text(text) => text.formatting,
            InlineContent::Link(link) => {
                if !capabilities.has_link_support && !reported_link {
                    issues.push(CompatibilityIssue::LinksUnsupported { id: id.to_string() });
                    reported_link = true;
                }
                link.formatting
            }
            InlineContent::LineBreak => continue,
        };
        for kind in formatting.active_kinds() {
            if !capabilities.supported_formatting.contains(&kind) && reported_kinds.insert(kind) {
                issues.push(CompatibilityIssue::UnsupportedFormatting {
                    id: id.to_string(),
                    kind,
                });
            }
        }
    }
}

/// Registry of named platform capability records.
pub struct PlatformRegistry {
    platforms: HashMap<String, PlatformCapabilities>,
}

impl PlatformRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        PlatformRegistry {
            platforms: HashMap::new(),
        }
    }

    /// Register a capability record under a name
    ///
    /// If a record with the same name already exists, it will be replaced.
    pub fn register(&mut self, name: &str, capabilities: PlatformCapabilities) {
        self.platforms.insert(name.to_string(), capabilities);
    }

    /// Get a capability record by name
    pub fn get(&self, name: &str) -> Result<&PlatformCapabilities, ClipError> {
        self.platforms
            .get(name)
            .ok_or_else(|| ClipError::UnknownPlatform(name.to_string()))
    }

    /// Check if a platform exists
    pub fn has(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    /// List all known platform names (sorted)
    pub fn list_platforms(&self) -> Vec<String> {
        let mut names: Vec<_> = self.platforms.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check a document against the named platform
    pub fn validate_for_platform(
        &self,
        content: &ClippyContent,
        name: &str,
    ) -> Result<CompatibilityReport, ClipError> {
        Ok(validate_for_platform(content, self.get(name)?))
    }

    /// Create a registry with the built-in platform records
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let all_blocks: BTreeSet<BlockKind> = [
            BlockKind::Paragraph,
            BlockKind::Heading,
            BlockKind::List,
            BlockKind::Quote,
            BlockKind::Code,
            BlockKind::Divider,
        ]
        .into_iter()
        .collect();

        let all_formatting: BTreeSet<FormattingKind> =
            FormattingKind::CANONICAL_ORDER.into_iter().collect();

        // Discord: no headings (rendered as bold), no underline glyph in
        // pasted markdown beyond its own dialect, shallow lists.
        registry.register(
            "discord",
            PlatformCapabilities {
                supported_blocks: [
                    BlockKind::Paragraph,
                    BlockKind::List,
                    BlockKind::Quote,
                    BlockKind::Code,
                ]
                .into_iter()
                .collect(),
                supported_formatting: all_formatting.clone(),
                max_nesting_level: 2,
                has_link_support: true,
                preferred_format: PreferredFormat::Markdown,
            },
        );

        // Slack: single-level formatting only, no underline, flat lists.
        registry.register(
            "slack",
            PlatformCapabilities {
                supported_blocks: [
                    BlockKind::Paragraph,
                    BlockKind::List,
                    BlockKind::Quote,
                    BlockKind::Code,
                ]
                .into_iter()
                .collect(),
                supported_formatting: [
                    FormattingKind::Bold,
                    FormattingKind::Italic,
                    FormattingKind::Strikethrough,
                    FormattingKind::Code,
                ]
                .into_iter()
                .collect(),
                max_nesting_level: 1,
                has_link_support: true,
                preferred_format: PreferredFormat::Markdown,
            },
        );

        // Gmail compose: rich HTML, everything representable.
        registry.register(
            "gmail",
            PlatformCapabilities {
                supported_blocks: all_blocks.clone(),
                supported_formatting: all_formatting.clone(),
                max_nesting_level: limits_nesting(),
                has_link_support: true,
                preferred_format: PreferredFormat::Html,
            },
        );

        // Notion: full block model, deep nesting.
        registry.register(
            "notion",
            PlatformCapabilities {
                supported_blocks: all_blocks,
                supported_formatting: all_formatting,
                max_nesting_level: limits_nesting(),
                has_link_support: true,
                preferred_format: PreferredFormat::Markdown,
            },
        );

        // Plain text target: structure and formatting all flatten away.
        registry.register(
            "plaintext",
            PlatformCapabilities {
                supported_blocks: [BlockKind::Paragraph].into_iter().collect(),
                supported_formatting: BTreeSet::new(),
                max_nesting_level: 1,
                has_link_support: false,
                preferred_format: PreferredFormat::PlainText,
            },
        );

        registry
    }
}

fn limits_nesting() -> usize {
    crate::model::limits::DEFAULT_NESTING_LIMIT
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
