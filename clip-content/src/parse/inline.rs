//! Inline parsing: formatted text runs, links, and line breaks.
//!
//! The walker keeps the current formatting set on an explicit stack,
//! pushed on entry to a formatting-carrying element and popped on exit.
//! Text accumulates in a buffer that is flushed whenever the formatting
//! snapshot changes or a link/line-break is emitted.

use super::{ParseOptions, ParseSession, ParseWarning};
use crate::links::is_safe_target;
use crate::model::limits::MAX_TEXT_LEN;
use crate::model::{Formatting, FormattingKind, InlineContent, LinkSpan, TextSpan};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_fragment, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse an inline HTML fragment into an ordered inline sequence.
///
/// Convenience entry point over the node-based walker; warnings from the
/// throwaway session are logged but not returned.
pub fn parse_inline_fragment(fragment: &str, options: &ParseOptions) -> Vec<InlineContent> {
    if fragment.trim().is_empty() {
        return Vec::new();
    }

    let context = QualName::new(None, ns!(html), LocalName::from("div"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new(), false)
        .one(fragment);

    let mut session = ParseSession::new(options);
    // The fragment parser wraps content in an <html> element.
    let document = dom.document.children.borrow();
    match document.first() {
        Some(root) => parse_inline_children(root, options, &mut session),
        None => Vec::new(),
    }
}

/// Parse the children of an element into a merged, trimmed inline sequence.
pub(crate) fn parse_inline_children(
    node: &Handle,
    options: &ParseOptions,
    session: &mut ParseSession,
) -> Vec<InlineContent> {
    let children: Vec<Handle> = node.children.borrow().clone();
    parse_inline_nodes(&children, options, session)
}

/// Parse an explicit slice of sibling nodes as one inline sequence.
pub(crate) fn parse_inline_nodes(
    nodes: &[Handle],
    options: &ParseOptions,
    session: &mut ParseSession,
) -> Vec<InlineContent> {
    let mut walker = InlineWalker {
        options,
        session,
        out: Vec::new(),
        buffer: String::new(),
        stack: vec![Formatting::default()],
    };
    for node in nodes {
        walker.walk(node);
    }
    walker.finish()
}

struct InlineWalker<'a> {
    options: &'a ParseOptions,
    session: &'a mut ParseSession,
    out: Vec<InlineContent>,
    buffer: String,
    stack: Vec<Formatting>,
}

impl InlineWalker<'_> {
    fn current(&self) -> Formatting {
        *self.stack.last().unwrap_or(&Formatting::default())
    }

    fn walk(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => self.append_text(&contents.borrow()),
            NodeData::Element { name, attrs, .. } => {
                let local: &str = &name.local;
                match local {
                    "br" => {
                        self.flush();
                        self.out.push(InlineContent::LineBreak);
                    }
                    "a" => self.walk_link(node, attrs),
                    "script" | "style" | "template" | "noscript" => {}
                    _ => {
                        let mut formatting = self.current();
                        if let Some(kind) = tag_formatting(local) {
                            formatting = formatting.with(kind);
                        }
                        for kind in style_formatting(attr_value(attrs, "style").as_deref()) {
                            formatting = formatting.with(kind);
                        }

                        if formatting == self.current() {
                            self.walk_children(node);
                        } else {
                            self.flush();
                            self.stack.push(formatting);
                            self.walk_children(node);
                            self.flush();
                            self.stack.pop();
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn walk_children(&mut self, node: &Handle) {
        for child in node.children.borrow().iter() {
            self.walk(child);
        }
    }

    /// A link with a usable target becomes a `Link` span carrying the
    /// current formatting snapshot plus any formatting carried by elements
    /// inside the anchor (`<a><b>…</b></a>` is a bold link); anything else
    /// degrades to processing the children as plain formatted text.
    fn walk_link(
        &mut self,
        node: &Handle,
        attrs: &std::cell::RefCell<Vec<html5ever::Attribute>>,
    ) {
        let target = attr_value(attrs, "href");
        let target = match target {
            Some(href) if is_safe_target(&href) => href.trim().to_string(),
            _ => {
                self.walk_children(node);
                return;
            }
        };

        self.flush();
        let mut text = collect_text(node);
        if !self.options.preserve_whitespace {
            text = collapse_whitespace(&text).trim().to_string();
        }
        if text.is_empty() {
            // Bare anchor with no visible text: show the target itself.
            text = target.clone();
        }
        self.cap_length(&mut text);

        self.out.push(InlineContent::Link(LinkSpan {
            url: target,
            text,
            formatting: subtree_formatting(node, self.current()),
        }));
    }

    fn append_text(&mut self, text: &str) {
        if self.options.preserve_whitespace {
            self.buffer.push_str(text);
            return;
        }
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.buffer.ends_with(' ') && !(self.buffer.is_empty() && self.after_space()) {
                    self.buffer.push(' ');
                }
            } else {
                self.buffer.push(ch);
            }
        }
    }

    /// Whether already-emitted output ends in whitespace, so a space at a
    /// span boundary would duplicate it. Start of sequence counts as after
    /// a space, dropping leading whitespace outright.
    fn after_space(&self) -> bool {
        match self.out.last() {
            Some(InlineContent::Text(span)) => span.text.ends_with(' '),
            Some(InlineContent::Link(_)) => false,
            Some(InlineContent::LineBreak) | None => true,
        }
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut text = std::mem::take(&mut self.buffer);
        self.cap_length(&mut text);
        self.out.push(InlineContent::Text(TextSpan {
            text,
            formatting: self.current(),
        }));
    }

    fn cap_length(&mut self, text: &mut String) {
        if text.len() > MAX_TEXT_LEN {
            truncate_at_boundary(text, MAX_TEXT_LEN);
            self.session
                .warn(ParseWarning::TextTruncated { limit: MAX_TEXT_LEN });
        }
    }

    fn finish(mut self) -> Vec<InlineContent> {
        self.flush();
        let mut spans = merge_spans(self.out);
        trim_boundaries(&mut spans);
        spans
    }
}

/// Merge consecutive text spans with identical formatting and drop
/// zero-length spans.
///
/// Mandatory for renderer correctness: the renderers assume no two
/// adjacent text spans share a formatting set. Idempotent by
/// construction; re-running it on merged output is a no-op.
pub fn merge_spans(spans: Vec<InlineContent>) -> Vec<InlineContent> {
    let mut merged: Vec<InlineContent> = Vec::with_capacity(spans.len());
    for span in spans {
        match span {
            InlineContent::Text(current) => {
                if current.text.is_empty() {
                    continue;
                }
                match merged.last_mut() {
                    Some(InlineContent::Text(previous))
                        if previous.formatting == current.formatting =>
                    {
                        previous.text.push_str(&current.text);
                    }
                    _ => merged.push(InlineContent::Text(current)),
                }
            }
            other => merged.push(other),
        }
    }
    merged
}

/// Trim whitespace at the outer edges of an inline sequence.
fn trim_boundaries(spans: &mut Vec<InlineContent>) {
    if let Some(InlineContent::Text(span)) = spans.first_mut() {
        let trimmed = span.text.trim_start();
        if trimmed.len() != span.text.len() {
            span.text = trimmed.to_string();
        }
    }
    if let Some(InlineContent::Text(span)) = spans.last_mut() {
        let trimmed = span.text.trim_end();
        if trimmed.len() != span.text.len() {
            span.text = trimmed.to_string();
        }
    }
    spans.retain(|span| !matches!(span, InlineContent::Text(t) if t.text.is_empty()));
}

/// Union of `base` with the formatting carried by every descendant
/// element (tags and style attributes). A link's visible text is flattened
/// into one span, so its formatting set is flattened the same way.
fn subtree_formatting(node: &Handle, base: Formatting) -> Formatting {
    let mut formatting = base;
    for child in node.children.borrow().iter() {
        if let NodeData::Element { name, attrs, .. } = &child.data {
            if let Some(kind) = tag_formatting(&name.local) {
                formatting = formatting.with(kind);
            }
            for kind in style_formatting(attr_value(attrs, "style").as_deref()) {
                formatting = formatting.with(kind);
            }
        }
        formatting = subtree_formatting(child, formatting);
    }
    formatting
}

/// Concatenated text of every descendant text node.
pub(crate) fn collect_text(node: &Handle) -> String {
    let mut out = String::new();
    collect_text_into(node, &mut out);
    out
}

fn collect_text_into(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text_into(child, out);
            }
        }
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn attr_value(
    attrs: &std::cell::RefCell<Vec<html5ever::Attribute>>,
    name: &str,
) -> Option<String> {
    attrs
        .borrow()
        .iter()
        .find(|attr| attr.name.local.as_ref() == name)
        .map(|attr| attr.value.to_string())
}

fn tag_formatting(local: &str) -> Option<FormattingKind> {
    match local {
        "b" | "strong" => Some(FormattingKind::Bold),
        "i" | "em" => Some(FormattingKind::Italic),
        "u" | "ins" => Some(FormattingKind::Underline),
        "s" | "strike" | "del" => Some(FormattingKind::Strikethrough),
        "code" | "kbd" | "samp" | "tt" => Some(FormattingKind::Code),
        _ => None,
    }
}

/// Formatting carried by an inline `style` attribute on a generic
/// container (weight, style, and decoration properties only).
fn style_formatting(style: Option<&str>) -> Vec<FormattingKind> {
    let mut kinds = Vec::new();
    let style = match style {
        Some(s) => s,
        None => return kinds,
    };

    for declaration in style.split(';') {
        let mut parts = declaration.splitn(2, ':');
        let property = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let value = parts.next().unwrap_or("").trim().to_ascii_lowercase();

        match property.as_str() {
            "font-weight" => {
                let numeric_bold = value.parse::<u32>().is_ok_and(|weight| weight >= 600);
                if value == "bold" || value == "bolder" || numeric_bold {
                    kinds.push(FormattingKind::Bold);
                }
            }
            "font-style" => {
                if value == "italic" || value == "oblique" {
                    kinds.push(FormattingKind::Italic);
                }
            }
            "text-decoration" | "text-decoration-line" => {
                if value.contains("underline") {
                    kinds.push(FormattingKind::Underline);
                }
                if value.contains("line-through") {
                    kinds.push(FormattingKind::Strikethrough);
                }
            }
            _ => {}
        }
    }
    kinds
}

/// Truncate at a char boundary at or below `max` bytes.
pub(crate) fn truncate_at_boundary(text: &mut String, max: usize) {
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
