//! Markdown rendering: block tree → flavor-aware Markdown string.
//!
//! This serializer is hand-written rather than driven through a Markdown
//! library because two of the supported dialects are not CommonMark:
//! Slack uses single-asterisk bold, underscore italics, and pipe-less
//! links, and Discord has no heading syntax at all. Per-block dispatch
//! mirrors the HTML renderer; flavor differences are confined to the
//! marker/escape tables and one Discord post-processing pass.

use crate::links::is_safe_target;
use crate::model::limits::DEFAULT_NESTING_LIMIT;
use crate::model::{
    ClippyContent, CodeBlock, ContentBlock, Formatting, FormattingKind, Heading, InlineContent,
    List, ListItem, ListType, Quote,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Markdown dialect with its own heading, link, and escaping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Github,
    Discord,
    Slack,
    Standard,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flavor::Github => "github",
            Flavor::Discord => "discord",
            Flavor::Slack => "slack",
            Flavor::Standard => "standard",
        };
        f.write_str(name)
    }
}

impl FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" | "gfm" => Ok(Flavor::Github),
            "discord" => Ok(Flavor::Discord),
            "slack" => Ok(Flavor::Slack),
            "standard" | "commonmark" => Ok(Flavor::Standard),
            other => Err(format!("unknown markdown flavor '{other}'")),
        }
    }
}

/// How a LineBreak is written inside a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineBreakStyle {
    /// Trailing two spaces, the portable CommonMark hard break.
    TwoSpaces,
    /// Trailing backslash.
    Backslash,
    /// Bare newline; chat dialects treat it as a hard break anyway.
    Plain,
}

/// Options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    pub flavor: Flavor,
    pub use_code_fences: bool,
    /// List depth cap; deeper subtrees degrade to a flat bullet dump.
    pub max_nesting_level: usize,
    pub line_break_style: LineBreakStyle,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            flavor: Flavor::Standard,
            use_code_fences: true,
            max_nesting_level: DEFAULT_NESTING_LIMIT,
            line_break_style: LineBreakStyle::TwoSpaces,
        }
    }
}

impl MarkdownOptions {
    /// Flavor defaults: Slack avoids code fences, chat dialects use bare
    /// newlines as breaks.
    pub fn for_flavor(flavor: Flavor) -> Self {
        let mut options = Self {
            flavor,
            ..Self::default()
        };
        match flavor {
            Flavor::Slack => {
                options.use_code_fences = false;
                options.line_break_style = LineBreakStyle::Plain;
            }
            Flavor::Discord => {
                options.line_break_style = LineBreakStyle::Plain;
            }
            Flavor::Github | Flavor::Standard => {}
        }
        options
    }
}

/// Render a document to Markdown. Zero blocks render as an empty string.
pub fn render_markdown(content: &ClippyContent, options: &MarkdownOptions) -> String {
    let mut blocks = Vec::with_capacity(content.blocks.len());
    for block in &content.blocks {
        let rendered = render_block(block, options);
        if !rendered.is_empty() {
            blocks.push(rendered);
        }
    }

    let mut output = blocks.join("\n\n");
    if options.flavor == Flavor::Discord {
        output = convert_headings_to_bold(&output);
    }
    output
}

fn render_block(block: &ContentBlock, options: &MarkdownOptions) -> String {
    match block {
        ContentBlock::Paragraph(p) => render_inline_sequence(&p.content, options),
        ContentBlock::Heading(h) => render_heading(h, options),
        ContentBlock::List(list) => render_list(list, 1, options).join("\n"),
        ContentBlock::Quote(quote) => render_quote(quote, options),
        ContentBlock::Code(code) => render_code(code, options),
        ContentBlock::Divider(_) => match options.flavor {
            Flavor::Github | Flavor::Standard => "---".to_string(),
            Flavor::Discord | Flavor::Slack => "———".to_string(),
        },
    }
}

fn render_heading(heading: &Heading, options: &MarkdownOptions) -> String {
    let text = render_inline_sequence(&heading.content, options);
    match options.flavor {
        // Discord headings are emitted as `#` lines here and converted to
        // bold by the post-processing pass.
        Flavor::Github | Flavor::Standard | Flavor::Discord => {
            let level = usize::from(heading.level.clamp(1, 6));
            format!("{} {}", "#".repeat(level), text)
        }
        Flavor::Slack => format!("*{text}*"),
    }
}

fn render_quote(quote: &Quote, options: &MarkdownOptions) -> String {
    let body = render_inline_sequence(&quote.content, options);
    let mut lines: Vec<String> = body
        .lines()
        .map(|line| format!("> {}", line.trim_end()))
        .collect();
    if lines.is_empty() {
        lines.push(">".to_string());
    }
    if let Some(citation) = &quote.citation {
        lines.push(format!("> — {citation}"));
    }
    lines.join("\n")
}

fn render_code(code: &CodeBlock, options: &MarkdownOptions) -> String {
    if options.use_code_fences {
        let language = code.language.as_deref().unwrap_or("");
        // Widen the fence if the body itself contains one.
        let fence = if code.text.contains("```") { "````" } else { "```" };
        format!("{fence}{language}\n{}\n{fence}", code.text)
    } else {
        code.text
            .lines()
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Bullet glyphs cycle by depth for visual distinction.
const BULLETS: [char; 3] = ['-', '*', '+'];

/// Render a list at the given depth (top-level lists are depth 1).
fn render_list(list: &List, depth: usize, options: &MarkdownOptions) -> Vec<String> {
    let mut lines = Vec::new();
    let indent = "  ".repeat(depth - 1);

    for (index, item) in list.items.iter().enumerate() {
        let marker = match list.list_type {
            ListType::Bulleted => format!("{} ", BULLETS[(depth - 1) % BULLETS.len()]),
            ListType::Numbered => format!("{}. ", index + 1),
        };
        lines.push(render_item_line(item, &indent, &marker, options));

        if let Some(nested) = &item.nested {
            let child_depth = depth + 1;
            let limit = options.max_nesting_level.max(1);
            if child_depth > limit || (child_depth == limit && has_nested_lists(nested)) {
                // At the cap the remaining subtree degrades to a flat,
                // single-level bullet dump. Lossy but nothing is dropped.
                let flat_indent = "  ".repeat(child_depth.min(limit) - 1);
                for flat_item in flatten_items(nested) {
                    lines.push(render_item_line(flat_item, &flat_indent, "- ", options));
                }
            } else {
                lines.extend(render_list(nested, child_depth, options));
            }
        }
    }
    lines
}

fn has_nested_lists(list: &List) -> bool {
    list.items.iter().any(|item| item.nested.is_some())
}

fn render_item_line(
    item: &ListItem,
    indent: &str,
    marker: &str,
    options: &MarkdownOptions,
) -> String {
    let text = render_inline_sequence(&item.content, options);
    let continuation = format!("\n{indent}{}", " ".repeat(marker.len()));
    let text = text.replace('\n', &continuation);
    format!("{indent}{marker}{text}")
}

fn flatten_items(list: &List) -> Vec<&ListItem> {
    let mut flat = Vec::new();
    for item in &list.items {
        flat.push(item);
        if let Some(nested) = &item.nested {
            flat.extend(flatten_items(nested));
        }
    }
    flat
}

fn render_inline_sequence(content: &[InlineContent], options: &MarkdownOptions) -> String {
    let mut out = String::new();
    for span in content {
        match span {
            InlineContent::Text(text) => {
                out.push_str(&render_text_span(&text.text, text.formatting, options));
            }
            InlineContent::Link(link) => {
                out.push_str(&render_link(link, options));
            }
            InlineContent::LineBreak => out.push_str(match options.line_break_style {
                LineBreakStyle::TwoSpaces => "  \n",
                LineBreakStyle::Backslash => "\\\n",
                LineBreakStyle::Plain => "\n",
            }),
        }
    }
    out
}

fn render_text_span(text: &str, formatting: Formatting, options: &MarkdownOptions) -> String {
    // Code spans keep their text verbatim inside backticks; everything
    // else is escaped first.
    let mut rendered = if formatting.code {
        code_span(text)
    } else {
        escape_text(text, options.flavor)
    };
    rendered = wrap_markers(rendered, formatting, options.flavor);
    rendered
}

fn render_link(link: &crate::model::LinkSpan, options: &MarkdownOptions) -> String {
    let text = escape_text(&link.text, options.flavor);
    // Same fail-open policy as the parser and the HTML renderer: a target
    // that fails the check renders as plain text, no link syntax.
    if !is_safe_target(&link.url) {
        return wrap_markers(text, link.formatting, options.flavor);
    }

    let url = link.url.trim();
    let syntax = match options.flavor {
        Flavor::Slack => format!("<{url}|{text}>"),
        _ => format!("[{text}]({url})"),
    };
    wrap_markers(syntax, link.formatting, options.flavor)
}

/// Wrap non-code markers around already-escaped text, canonical order
/// (bold innermost after code, strikethrough outermost).
fn wrap_markers(text: String, formatting: Formatting, flavor: Flavor) -> String {
    let mut out = text;
    for kind in formatting.active_kinds() {
        let marker = match (kind, flavor) {
            (FormattingKind::Code, _) => continue, // applied at the text level
            (FormattingKind::Bold, Flavor::Slack) => "*",
            (FormattingKind::Bold, _) => "**",
            (FormattingKind::Italic, Flavor::Slack) => "_",
            (FormattingKind::Italic, _) => "*",
            // Underline only exists on Discord; other dialects drop the
            // flag to plain text.
            (FormattingKind::Underline, Flavor::Discord) => "__",
            (FormattingKind::Underline, _) => continue,
            (FormattingKind::Strikethrough, Flavor::Slack) => "~",
            (FormattingKind::Strikethrough, _) => "~~",
        };
        out = format!("{marker}{out}{marker}");
    }
    out
}

fn code_span(text: &str) -> String {
    if text.contains('`') {
        format!("``{text}``")
    } else {
        format!("`{text}`")
    }
}

/// Escape Markdown metacharacters, flavor-extended.
fn escape_text(text: &str, flavor: Flavor) -> String {
    // Slack has no backslash escapes; it wants HTML entities for its
    // control characters instead.
    if flavor == Flavor::Slack {
        return text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
    }

    // `#` and `>` would promote a line to a heading or quote when they
    // land at a line start; backslash escapes are valid anywhere, so they
    // are escaped unconditionally.
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let escape = matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '>')
            || (flavor == Flavor::Discord && matches!(ch, '~' | '|'));
        if escape {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Discord has no heading syntax that renders in chat; a post-processing
/// pass rewrites `#`-prefixed lines as bold text. Lines inside code fences
/// are left alone.
fn convert_headings_to_bold(markdown: &str) -> String {
    let mut in_fence = false;
    markdown
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                return line.to_string();
            }
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            if (1..=6).contains(&hashes) {
                if let Some(rest) = trimmed.get(hashes..) {
                    if let Some(text) = rest.strip_prefix(' ') {
                        return format!("**{}**", text.trim());
                    }
                }
            }
            line.to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
