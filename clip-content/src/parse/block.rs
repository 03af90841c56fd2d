//! Block-level parsing: captured HTML → block tree.
//!
//! Element mapping:
//!
//! | HTML                     | Block                                    |
//! |--------------------------|------------------------------------------|
//! | `<p>`                    | Paragraph                                |
//! | `<h1>`-`<h6>`            | Heading (level from tag)                 |
//! | `<ul>` / `<ol>`          | List (bulleted / numbered)               |
//! | `<li>`                   | ListItem, first child list → `nested`    |
//! | `<blockquote>`           | Quote, `cite` attribute → citation       |
//! | `<pre>` (+`<code>`)      | Code, language from class patterns       |
//! | `<hr>`                   | Divider                                  |
//! | container, no block kids | Paragraph                                |
//! | container, block kids    | children processed at the same level     |
//! | anything else            | warning + Paragraph                      |
//!
//! Parsing is fail-open: every input produces a document, degradations
//! are recorded on the session.

use super::inline::{
    attr_value, collapse_whitespace, collect_text, parse_inline_children, parse_inline_nodes,
    truncate_at_boundary,
};
use super::{
    EmptyBlockPolicy, ParseOptions, ParseSession, ParseWarning, ParsedDocument,
};
use crate::model::limits::{MAX_BLOCKS, MAX_TEXT_LEN};
use crate::model::{
    ClippyContent, CodeBlock, ContentBlock, ContentMetadata, Divider, Heading, InlineContent,
    List, ListItem, ListType, Paragraph, Quote,
};
use chrono::Utc;
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document as parse_html, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Block-level elements, used to decide whether a container has block
/// children or is paragraph-like.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "dd", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Containers that carry no semantics of their own: recursed into when
/// they hold block children, treated as a paragraph otherwise.
const TRANSPARENT_CONTAINERS: &[&str] = &[
    "div", "section", "article", "main", "aside", "header", "footer", "nav", "figure",
    "figcaption", "details", "form", "fieldset", "address",
];

/// Non-content elements skipped outright at block level. Script safety is
/// the upstream sanitizer's job; these are skipped because they carry no
/// visible content, not as a security measure.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "base", "iframe",
    "object", "embed", "canvas", "svg",
];

/// Languages accepted from class-name patterns on code blocks.
const KNOWN_LANGUAGES: &[&str] = &[
    "javascript", "js", "typescript", "ts", "python", "py", "ruby", "rb", "rust", "go", "java",
    "c", "cpp", "csharp", "php", "swift", "kotlin", "scala", "html", "css", "json", "yaml", "toml",
    "xml", "sql", "bash", "sh", "shell", "powershell", "markdown", "diff", "plaintext", "text",
];

/// Parse captured HTML into a content document, discarding the warning
/// list (warnings are still logged through `tracing`).
pub fn parse_document(markup: &str, options: &ParseOptions) -> ClippyContent {
    parse_document_full(markup, options).content
}

/// Parse captured HTML, returning the document together with every
/// degradation recorded along the way.
pub fn parse_document_full(markup: &str, options: &ParseOptions) -> ParsedDocument {
    let mut session = ParseSession::new(options);

    if markup.trim().is_empty() {
        return ParsedDocument {
            content: ClippyContent::empty(),
            warnings: session.into_warnings(),
        };
    }

    let dom = parse_html(RcDom::default(), ParseOpts::default()).one(markup);

    let mut blocks = Vec::new();
    if let Some(body) = find_element(&dom.document, "body") {
        let children: Vec<Handle> = body.children.borrow().clone();
        for child in &children {
            parse_block_node(child, 1, options, &mut session, &mut blocks);
        }
    }

    if options.empty_block_policy == EmptyBlockPolicy::Drop {
        blocks = drop_empty_blocks(blocks);
    }
    if blocks.len() > MAX_BLOCKS {
        session.warn(ParseWarning::BlockLimitExceeded { limit: MAX_BLOCKS });
        blocks.truncate(MAX_BLOCKS);
    }

    let mut content = ClippyContent::new(blocks);
    if options.source_url.is_some() || options.source_domain.is_some() {
        content = content.with_metadata(ContentMetadata {
            source_url: options.source_url.clone(),
            source_domain: options.source_domain.clone(),
            captured_at: Some(Utc::now()),
            original_format: Some("html".to_string()),
        });
    }

    ParsedDocument {
        content,
        warnings: session.into_warnings(),
    }
}

/// Plain-text fallback parser: blank-line-separated chunks become
/// unformatted paragraphs, interior newlines become line breaks. Empty
/// input yields zero blocks, never an error. The same size limits as the
/// HTML path apply: overlong lines are truncated and the block list is
/// capped at [`MAX_BLOCKS`].
pub fn parse_text(text: &str, options: &ParseOptions) -> ClippyContent {
    let mut session = ParseSession::new(options);
    let mut blocks = Vec::new();

    let mut content: Vec<InlineContent> = Vec::new();
    let mut flush = |content: &mut Vec<InlineContent>, session: &mut ParseSession| {
        if !content.is_empty() {
            blocks.push(ContentBlock::Paragraph(Paragraph {
                id: session.next_id(),
                content: std::mem::take(content),
            }));
        }
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut content, &mut session);
        } else {
            if !content.is_empty() {
                content.push(InlineContent::LineBreak);
            }
            let mut line = line.to_string();
            if line.len() > MAX_TEXT_LEN {
                truncate_at_boundary(&mut line, MAX_TEXT_LEN);
                session.warn(ParseWarning::TextTruncated { limit: MAX_TEXT_LEN });
            }
            content.push(InlineContent::text(line));
        }
    }
    flush(&mut content, &mut session);

    if blocks.len() > MAX_BLOCKS {
        session.warn(ParseWarning::BlockLimitExceeded { limit: MAX_BLOCKS });
        blocks.truncate(MAX_BLOCKS);
    }

    ClippyContent::new(blocks)
}

/// Dispatch one node at block level, appending zero or more blocks.
fn parse_block_node(
    node: &Handle,
    depth: usize,
    options: &ParseOptions,
    session: &mut ParseSession,
    out: &mut Vec<ContentBlock>,
) {
    match &node.data {
        NodeData::Text { contents } => {
            // Stray text directly at block level becomes a paragraph.
            let text = collapse_whitespace(&contents.borrow());
            let text = text.trim();
            if !text.is_empty() {
                out.push(ContentBlock::Paragraph(Paragraph {
                    id: session.next_id(),
                    content: vec![InlineContent::text(text)],
                }));
            }
        }
        NodeData::Element { name, attrs, .. } => {
            let local: &str = &name.local;
            match local {
                "p" => out.push(paragraph_from_children(node, options, session)),
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level = local.as_bytes()[1] - b'0';
                    out.push(ContentBlock::Heading(Heading {
                        id: session.next_id(),
                        level,
                        content: parse_inline_children(node, options, session),
                    }));
                }
                "ul" | "ol" => {
                    out.push(ContentBlock::List(parse_list(node, depth, options, session)));
                }
                "blockquote" => out.push(parse_quote(node, attrs, options, session)),
                "pre" => out.push(parse_code(node, attrs, session)),
                "hr" => out.push(ContentBlock::Divider(Divider {
                    id: session.next_id(),
                })),
                "br" => {} // handled inline, skipped at block level
                _ if SKIPPED_ELEMENTS.contains(&local) => {}
                _ if TRANSPARENT_CONTAINERS.contains(&local) => {
                    if has_block_children(node) {
                        // The container itself yields nothing; its children
                        // are processed independently at this level.
                        let children: Vec<Handle> = node.children.borrow().clone();
                        for child in &children {
                            parse_block_node(child, depth, options, session, out);
                        }
                    } else {
                        out.push(paragraph_from_children(node, options, session));
                    }
                }
                _ if is_inline_element(local) => {
                    // Inline content at block level is wrapped in an
                    // implicit paragraph, keeping the element's own
                    // formatting.
                    let content =
                        parse_inline_nodes(std::slice::from_ref(node), options, session);
                    out.push(ContentBlock::Paragraph(Paragraph {
                        id: session.next_id(),
                        content,
                    }));
                }
                other => {
                    session.warn(ParseWarning::UnknownBlockElement {
                        name: other.to_string(),
                    });
                    out.push(paragraph_from_children(node, options, session));
                }
            }
        }
        _ => {}
    }
}

fn paragraph_from_children(
    node: &Handle,
    options: &ParseOptions,
    session: &mut ParseSession,
) -> ContentBlock {
    ContentBlock::Paragraph(Paragraph {
        id: session.next_id(),
        content: parse_inline_children(node, options, session),
    })
}

/// Parse a `ul`/`ol` element at the given list depth (top-level lists are
/// depth 1).
fn parse_list(
    node: &Handle,
    depth: usize,
    options: &ParseOptions,
    session: &mut ParseSession,
) -> List {
    let list_type = match &node.data {
        NodeData::Element { name, .. } if name.local.as_ref() == "ol" => ListType::Numbered,
        _ => ListType::Bulleted,
    };

    let mut items = Vec::new();
    let id = session.next_id();
    let children: Vec<Handle> = node.children.borrow().clone();
    for child in &children {
        if element_name(child).as_deref() == Some("li") {
            items.push(parse_list_item(child, depth, options, session));
        }
        // Anything else directly inside ul/ol is not valid list structure;
        // html5ever has already reparented most of it.
    }

    List {
        id,
        list_type,
        items,
    }
}

fn parse_list_item(
    li: &Handle,
    depth: usize,
    options: &ParseOptions,
    session: &mut ParseSession,
) -> ListItem {
    let id = session.next_id();
    let mut nested: Option<Box<List>> = None;
    let mut inline_nodes: Vec<Handle> = Vec::new();

    let children: Vec<Handle> = li.children.borrow().clone();
    for child in &children {
        match element_name(child).as_deref() {
            Some("ul") | Some("ol") => {
                if nested.is_some() {
                    // Only the first nested list per item is kept; sibling
                    // lists are dropped (documented simplification).
                    session.warn(ParseWarning::ExtraNestedList);
                    continue;
                }
                let child_depth = depth + 1;
                if child_depth > options.nesting_limit
                    || (child_depth == options.nesting_limit && contains_list(child))
                {
                    session.warn(ParseWarning::NestingLimitExceeded {
                        limit: options.nesting_limit,
                    });
                    nested = Some(Box::new(flatten_list(child, options, session)));
                } else {
                    nested = Some(Box::new(parse_list(child, child_depth, options, session)));
                }
            }
            _ => inline_nodes.push(child.clone()),
        }
    }

    ListItem {
        id,
        content: parse_inline_nodes(&inline_nodes, options, session),
        nested,
    }
}

/// Collapse a list subtree into a single-level bulleted dump: every
/// descendant item keeps its own text, all structure below this point is
/// lost. Lossy but nothing is dropped.
fn flatten_list(node: &Handle, options: &ParseOptions, session: &mut ParseSession) -> List {
    let id = session.next_id();
    let mut items = Vec::new();
    collect_flat_items(node, options, session, &mut items);
    List {
        id,
        list_type: ListType::Bulleted,
        items,
    }
}

fn collect_flat_items(
    node: &Handle,
    options: &ParseOptions,
    session: &mut ParseSession,
    items: &mut Vec<ListItem>,
) {
    let children: Vec<Handle> = node.children.borrow().clone();
    for child in &children {
        match element_name(child).as_deref() {
            Some("li") => {
                let grandchildren: Vec<Handle> = child.children.borrow().clone();
                let (lists, inline_nodes): (Vec<Handle>, Vec<Handle>) =
                    grandchildren.into_iter().partition(|n| {
                        matches!(element_name(n).as_deref(), Some("ul") | Some("ol"))
                    });

                let content = parse_inline_nodes(&inline_nodes, options, session);
                if !content.is_empty() {
                    items.push(ListItem {
                        id: session.next_id(),
                        content,
                        nested: None,
                    });
                }
                for list in &lists {
                    collect_flat_items(list, options, session, items);
                }
            }
            Some("ul") | Some("ol") => collect_flat_items(child, options, session, items),
            _ => {}
        }
    }
}

fn parse_quote(
    node: &Handle,
    attrs: &std::cell::RefCell<Vec<html5ever::Attribute>>,
    options: &ParseOptions,
    session: &mut ParseSession,
) -> ContentBlock {
    let id = session.next_id();
    let citation = attr_value(attrs, "cite").filter(|value| !value.trim().is_empty());

    // Paragraph boundaries inside the quote become line breaks so the
    // quote keeps a single inline sequence.
    let mut content: Vec<InlineContent> = Vec::new();
    let mut pending: Vec<Handle> = Vec::new();
    let children: Vec<Handle> = node.children.borrow().clone();

    let mut groups: Vec<Vec<InlineContent>> = Vec::new();
    for child in &children {
        let is_block = element_name(child)
            .map(|name| BLOCK_ELEMENTS.contains(&name.as_str()))
            .unwrap_or(false);
        if is_block {
            if !pending.is_empty() {
                groups.push(parse_inline_nodes(&pending, options, session));
                pending.clear();
            }
            groups.push(parse_inline_children(child, options, session));
        } else {
            pending.push(child.clone());
        }
    }
    if !pending.is_empty() {
        groups.push(parse_inline_nodes(&pending, options, session));
    }

    for group in groups {
        if group.is_empty() {
            continue;
        }
        if !content.is_empty() {
            content.push(InlineContent::LineBreak);
        }
        content.extend(group);
    }

    ContentBlock::Quote(Quote {
        id,
        content,
        citation,
    })
}

fn parse_code(
    node: &Handle,
    attrs: &std::cell::RefCell<Vec<html5ever::Attribute>>,
    session: &mut ParseSession,
) -> ContentBlock {
    let id = session.next_id();

    // Prefer the inner <code> element for both text and language.
    let code_child = node
        .children
        .borrow()
        .iter()
        .find(|child| element_name(child).as_deref() == Some("code"))
        .cloned();

    let (source, language) = match &code_child {
        Some(code) => {
            let code_language = match &code.data {
                NodeData::Element { attrs, .. } => infer_language(attr_value(attrs, "class")),
                _ => None,
            };
            let language = code_language.or_else(|| infer_language(attr_value(attrs, "class")));
            (code.clone(), language)
        }
        None => (node.clone(), infer_language(attr_value(attrs, "class"))),
    };

    let mut text = collect_text(&source);
    if text.ends_with('\n') {
        text.pop();
    }
    if text.len() > MAX_TEXT_LEN {
        truncate_at_boundary(&mut text, MAX_TEXT_LEN);
        session.warn(ParseWarning::TextTruncated { limit: MAX_TEXT_LEN });
    }

    ContentBlock::Code(CodeBlock { id, text, language })
}

/// Infer a language tag from class names like `language-rust`,
/// `lang-py`, `highlight-sql`, or `rust-code`. First class that yields an
/// allow-listed language wins.
fn infer_language(class_attr: Option<String>) -> Option<String> {
    let classes = class_attr?;
    for class in classes.split_whitespace() {
        let class = class.to_ascii_lowercase();
        let candidate = class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .or_else(|| class.strip_prefix("highlight-"))
            .or_else(|| class.strip_suffix("-code"));
        if let Some(candidate) = candidate {
            if KNOWN_LANGUAGES.contains(&candidate) {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Remove blocks and list items with no resolved inline content.
fn drop_empty_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut kept = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            ContentBlock::Paragraph(b) => {
                if !b.content.is_empty() {
                    kept.push(ContentBlock::Paragraph(b));
                }
            }
            ContentBlock::Heading(b) => {
                if !b.content.is_empty() {
                    kept.push(ContentBlock::Heading(b));
                }
            }
            ContentBlock::Quote(b) => {
                if !b.content.is_empty() || b.citation.is_some() {
                    kept.push(ContentBlock::Quote(b));
                }
            }
            ContentBlock::Code(b) => {
                if !b.text.trim().is_empty() {
                    kept.push(ContentBlock::Code(b));
                }
            }
            ContentBlock::List(list) => {
                if let Some(pruned) = prune_list(list) {
                    kept.push(ContentBlock::List(pruned));
                }
            }
            // A divider is never considered empty.
            ContentBlock::Divider(b) => kept.push(ContentBlock::Divider(b)),
        }
    }
    kept
}

fn prune_list(list: List) -> Option<List> {
    let items: Vec<ListItem> = list
        .items
        .into_iter()
        .filter_map(|item| {
            let nested = item.nested.and_then(|n| prune_list(*n)).map(Box::new);
            if item.content.is_empty() && nested.is_none() {
                None
            } else {
                Some(ListItem {
                    id: item.id,
                    content: item.content,
                    nested,
                })
            }
        })
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(List {
            id: list.id,
            list_type: list.list_type,
            items,
        })
    }
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn has_block_children(node: &Handle) -> bool {
    node.children.borrow().iter().any(|child| {
        element_name(child)
            .map(|name| BLOCK_ELEMENTS.contains(&name.as_str()))
            .unwrap_or(false)
    })
}

fn contains_list(node: &Handle) -> bool {
    node.children.borrow().iter().any(|child| {
        matches!(element_name(child).as_deref(), Some("ul") | Some("ol")) || contains_list(child)
    })
}

fn is_inline_element(local: &str) -> bool {
    matches!(
        local,
        "span"
            | "a"
            | "b"
            | "strong"
            | "em"
            | "i"
            | "u"
            | "s"
            | "strike"
            | "del"
            | "ins"
            | "code"
            | "kbd"
            | "samp"
            | "tt"
            | "font"
            | "sub"
            | "sup"
            | "small"
            | "mark"
            | "abbr"
            | "cite"
            | "q"
            | "time"
            | "label"
            | "img"
    )
}

fn find_element(node: &Handle, target: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(target) {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, target) {
            return Some(found);
        }
    }
    None
}
