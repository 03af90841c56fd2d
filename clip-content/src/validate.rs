//! Structural validation and best-effort repair.
//!
//! `validate` walks a full document and reports every broken invariant,
//! split into hard errors (the document should not be trusted) and soft
//! warnings (degraded but renderable). It never mutates. `sanitize`
//! produces a repaired copy and never fails; it deliberately performs no
//! deep structural repair — excessive nesting and the like are left for a
//! re-parse.
//!
//! Wire-shape errors (unknown type tags, mistyped flags, missing fields)
//! cannot exist in a typed [`ClippyContent`]; they are surfaced by
//! [`ClippyContent::from_json`] at the deserialization boundary.

use crate::links::is_safe_target;
use crate::model::limits::{
    DEFAULT_NESTING_LIMIT, MAX_BLOCKS, MAX_CITATION_LEN, MAX_TEXT_LEN, MAX_URL_LEN,
};
use crate::model::{ClippyContent, ContentBlock, InlineContent, List, ListItem};
use std::collections::HashSet;
use thiserror::Error;

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A broken invariant that makes the document untrustworthy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("version is '{found}', expected '1.0'")]
    WrongVersion { found: String },
    #[error("duplicate block id '{id}'")]
    DuplicateId { id: String },
    #[error("block at index {index} has no id")]
    MissingId { index: usize },
    #[error("heading '{id}' has level {level}, expected 1-6")]
    InvalidHeadingLevel { id: String, level: u8 },
}

/// A degraded-but-renderable condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationWarning {
    #[error("{count} blocks exceeds the limit of {limit}")]
    TooManyBlocks { count: usize, limit: usize },
    #[error("span in block '{id}' exceeds {limit} bytes")]
    TextTooLong { id: String, limit: usize },
    #[error("suspicious link target in block '{id}': {url}")]
    SuspiciousUrl { id: String, url: String },
    #[error("citation in quote '{id}' exceeds {limit} bytes")]
    CitationTooLong { id: String, limit: usize },
    #[error("list '{id}' nests deeper than {limit} levels")]
    NestingTooDeep { id: String, limit: usize },
    #[error("block '{id}' has adjacent spans with identical formatting")]
    UnmergedSpans { id: String },
    #[error("list '{id}' has no items")]
    EmptyList { id: String },
}

/// Check every invariant on a document, trusted or not.
pub fn validate(content: &ClippyContent) -> ValidationReport {
    let mut checker = Checker {
        errors: Vec::new(),
        warnings: Vec::new(),
        seen_ids: HashSet::new(),
    };

    if content.version != ClippyContent::VERSION {
        checker.errors.push(ValidationError::WrongVersion {
            found: content.version.clone(),
        });
    }

    if content.blocks.len() > MAX_BLOCKS {
        checker.warnings.push(ValidationWarning::TooManyBlocks {
            count: content.blocks.len(),
            limit: MAX_BLOCKS,
        });
    }

    for (index, block) in content.blocks.iter().enumerate() {
        checker.check_block(block, index);
    }

    ValidationReport {
        is_valid: checker.errors.is_empty(),
        errors: checker.errors,
        warnings: checker.warnings,
    }
}

struct Checker {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
    seen_ids: HashSet<String>,
}

impl Checker {
    fn check_id(&mut self, id: &str, index: usize) {
        if id.is_empty() {
            self.errors.push(ValidationError::MissingId { index });
        } else if !self.seen_ids.insert(id.to_string()) {
            self.errors.push(ValidationError::DuplicateId {
                id: id.to_string(),
            });
        }
    }

    fn check_block(&mut self, block: &ContentBlock, index: usize) {
        self.check_id(block.id(), index);
        match block {
            ContentBlock::Paragraph(b) => self.check_inline(&b.id, &b.content),
            ContentBlock::Heading(b) => {
                if !(1..=6).contains(&b.level) {
                    self.errors.push(ValidationError::InvalidHeadingLevel {
                        id: b.id.clone(),
                        level: b.level,
                    });
                }
                self.check_inline(&b.id, &b.content);
            }
            ContentBlock::Quote(b) => {
                if let Some(citation) = &b.citation {
                    if citation.len() > MAX_CITATION_LEN {
                        self.warnings.push(ValidationWarning::CitationTooLong {
                            id: b.id.clone(),
                            limit: MAX_CITATION_LEN,
                        });
                    }
                }
                self.check_inline(&b.id, &b.content);
            }
            ContentBlock::Code(b) => {
                if b.text.len() > MAX_TEXT_LEN {
                    self.warnings.push(ValidationWarning::TextTooLong {
                        id: b.id.clone(),
                        limit: MAX_TEXT_LEN,
                    });
                }
            }
            ContentBlock::List(list) => self.check_list(list, index, 1),
            ContentBlock::Divider(_) => {}
        }
    }

    fn check_list(&mut self, list: &List, index: usize, depth: usize) {
        if depth > DEFAULT_NESTING_LIMIT {
            self.warnings.push(ValidationWarning::NestingTooDeep {
                id: list.id.clone(),
                limit: DEFAULT_NESTING_LIMIT,
            });
        }
        if list.items.is_empty() {
            self.warnings.push(ValidationWarning::EmptyList {
                id: list.id.clone(),
            });
        }
        for item in &list.items {
            self.check_id(&item.id, index);
            self.check_inline(&item.id, &item.content);
            if let Some(nested) = &item.nested {
                // Nested list ids participate in document-wide uniqueness.
                self.check_id(&nested.id, index);
                self.check_list(nested, index, depth + 1);
            }
        }
    }

    fn check_inline(&mut self, id: &str, content: &[InlineContent]) {
        let mut previous_text_formatting = None;
        for span in content {
            match span {
                InlineContent::Text(text) => {
                    if text.text.len() > MAX_TEXT_LEN {
                        self.warnings.push(ValidationWarning::TextTooLong {
                            id: id.to_string(),
                            limit: MAX_TEXT_LEN,
                        });
                    }
                    if previous_text_formatting == Some(text.formatting) {
                        self.warnings.push(ValidationWarning::UnmergedSpans {
                            id: id.to_string(),
                        });
                    }
                    previous_text_formatting = Some(text.formatting);
                }
                InlineContent::Link(link) => {
                    if link.url.len() > MAX_URL_LEN || !is_safe_target(&link.url) {
                        self.warnings.push(ValidationWarning::SuspiciousUrl {
                            id: id.to_string(),
                            url: link.url.clone(),
                        });
                    }
                    if link.text.len() > MAX_TEXT_LEN {
                        self.warnings.push(ValidationWarning::TextTooLong {
                            id: id.to_string(),
                            limit: MAX_TEXT_LEN,
                        });
                    }
                    previous_text_formatting = None;
                }
                InlineContent::LineBreak => previous_text_formatting = None,
            }
        }
    }
}

/// Produce a repaired copy: version forced, block list truncated to the
/// maximum count, missing or duplicate ids replaced. Never fails.
pub fn sanitize(content: &ClippyContent) -> ClippyContent {
    let mut repaired = content.clone();
    repaired.version = ClippyContent::VERSION.to_string();
    repaired.blocks.truncate(MAX_BLOCKS);

    let mut fixer = IdFixer {
        seen: HashSet::new(),
        counter: 0,
    };
    for block in &mut repaired.blocks {
        fixer.fix_block(block);
    }
    repaired
}

struct IdFixer {
    seen: HashSet<String>,
    counter: u64,
}

impl IdFixer {
    fn fix(&mut self, id: &mut String) {
        if id.is_empty() || !self.seen.insert(id.clone()) {
            loop {
                self.counter += 1;
                let candidate = format!("clip-fix-{}", self.counter);
                if self.seen.insert(candidate.clone()) {
                    *id = candidate;
                    break;
                }
            }
        }
    }

    fn fix_block(&mut self, block: &mut ContentBlock) {
        match block {
            ContentBlock::Paragraph(b) => self.fix(&mut b.id),
            ContentBlock::Heading(b) => self.fix(&mut b.id),
            ContentBlock::Quote(b) => self.fix(&mut b.id),
            ContentBlock::Code(b) => self.fix(&mut b.id),
            ContentBlock::Divider(b) => self.fix(&mut b.id),
            ContentBlock::List(list) => self.fix_list(list),
        }
    }

    fn fix_list(&mut self, list: &mut List) {
        self.fix(&mut list.id);
        for item in &mut list.items {
            self.fix_item(item);
        }
    }

    fn fix_item(&mut self, item: &mut ListItem) {
        self.fix(&mut item.id);
        if let Some(nested) = &mut item.nested {
            self.fix_list(nested);
        }
    }
}
