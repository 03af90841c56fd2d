//! Parsers building [`ClippyContent`](crate::model::ClippyContent) from
//! captured markup or plain text.
//!
//! Input markup is assumed already cleaned of executable content by an
//! upstream sanitization stage; this layer enforces structure and size
//! only. Parsing never fails: unrecognized constructs degrade to the
//! nearest safe fallback and the degradation is recorded as a
//! [`ParseWarning`].
//!
//! All mutable parse state (id counter, depth, warning sink) lives in an
//! explicit [`ParseSession`] threaded through the recursion, never in
//! ambient globals, so every entry point stays a pure function of its
//! arguments.

mod block;
pub mod inline;

pub use block::{parse_document, parse_document_full, parse_text};

use crate::model::limits::DEFAULT_NESTING_LIMIT;
use crate::model::ClippyContent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options controlling a single parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Page the markup was captured from, recorded in metadata.
    pub source_url: Option<String>,
    pub source_domain: Option<String>,
    /// Cap on list nesting depth; deeper subtrees are flattened.
    pub nesting_limit: usize,
    pub id_policy: IdPolicy,
    pub empty_block_policy: EmptyBlockPolicy,
    /// Keep whitespace runs verbatim instead of collapsing them.
    pub preserve_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_url: None,
            source_domain: None,
            nesting_limit: DEFAULT_NESTING_LIMIT,
            id_policy: IdPolicy::Deterministic,
            empty_block_policy: EmptyBlockPolicy::Drop,
            preserve_whitespace: false,
        }
    }
}

/// How block and item ids are assigned during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdPolicy {
    /// Session timestamp plus a counter; unique within the document.
    Deterministic,
    /// Leave ids empty for the caller to assign (or `sanitize` to repair).
    Disabled,
}

/// What to do with blocks that end up with no inline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyBlockPolicy {
    /// Remove empty blocks and list items after parsing.
    Drop,
    /// Retain them to preserve author intent (e.g. a blank line).
    Keep,
}

/// A parse plus the degradations recorded along the way.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub content: ClippyContent,
    pub warnings: Vec<ParseWarning>,
}

/// A non-fatal degradation applied during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// Block-level element we have no mapping for; degraded to paragraph.
    UnknownBlockElement { name: String },
    /// List nesting hit the configured cap; the remainder was flattened.
    NestingLimitExceeded { limit: usize },
    /// A list item carried more than one block-level child list; only the
    /// first was kept.
    ExtraNestedList,
    /// More blocks than the document limit; the tail was dropped.
    BlockLimitExceeded { limit: usize },
    /// A span exceeded the text length limit and was truncated.
    TextTruncated { limit: usize },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnknownBlockElement { name } => {
                write!(f, "unknown block element <{name}>, degraded to paragraph")
            }
            ParseWarning::NestingLimitExceeded { limit } => {
                write!(f, "list nesting exceeded limit {limit}, subtree flattened")
            }
            ParseWarning::ExtraNestedList => {
                write!(f, "list item had multiple nested lists, extras dropped")
            }
            ParseWarning::BlockLimitExceeded { limit } => {
                write!(f, "more than {limit} blocks, tail dropped")
            }
            ParseWarning::TextTruncated { limit } => {
                write!(f, "span longer than {limit} bytes truncated")
            }
        }
    }
}

/// Mutable state for one parse call: id generation and the warning sink.
///
/// Local to the call and never escapes it, which keeps parses safe to run
/// concurrently without coordination.
pub(crate) struct ParseSession {
    id_policy: IdPolicy,
    id_seed: i64,
    counter: u64,
    warnings: Vec<ParseWarning>,
}

impl ParseSession {
    pub(crate) fn new(options: &ParseOptions) -> Self {
        Self {
            id_policy: options.id_policy,
            id_seed: Utc::now().timestamp_millis(),
            counter: 0,
            warnings: Vec::new(),
        }
    }

    /// Next block/item id under the session's policy.
    pub(crate) fn next_id(&mut self) -> String {
        match self.id_policy {
            IdPolicy::Disabled => String::new(),
            IdPolicy::Deterministic => {
                self.counter += 1;
                format!("clip-{:x}-{}", self.id_seed, self.counter)
            }
        }
    }

    pub(crate) fn warn(&mut self, warning: ParseWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub(crate) fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }
}
