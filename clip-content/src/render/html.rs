//! HTML rendering: block tree → HTML fragment string.
//!
//! Pipeline: model → rcdom tree → html5ever serializer. The output is a
//! fragment, no document shell. Each block builder is the structural
//! inverse of the block parser's mapping.
//!
//! Inline formatting is applied in a fixed canonical nesting order
//! regardless of how the source interleaved it (code innermost, then
//! bold, italic, underline, strikethrough), so output is deterministic
//! for any equivalent formatting set.

use crate::error::ClipError;
use crate::links::is_safe_target;
use crate::model::{
    ClippyContent, CodeBlock, ContentBlock, Formatting, FormattingKind, Heading, InlineContent,
    List, ListType, Paragraph, Quote,
};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Options for HTML rendering.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Semantic tags (`strong`/`em`/`s`) versus legacy presentational
    /// equivalents (`b`/`i`/`strike`).
    pub semantic_tags: bool,
    /// Trim surrounding whitespace from the final fragment.
    pub clean_output: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            semantic_tags: true,
            clean_output: true,
        }
    }
}

/// Render a document to an HTML fragment. Zero blocks render as an empty
/// string.
pub fn render_html(content: &ClippyContent, options: &HtmlOptions) -> Result<String, ClipError> {
    let mut fragments = Vec::with_capacity(content.blocks.len());
    for block in &content.blocks {
        let node = build_block(block, options);
        fragments.push(serialize_node(&node)?);
    }

    let html = fragments.join("\n");
    if options.clean_output {
        Ok(html.trim().to_string())
    } else {
        Ok(html)
    }
}

fn build_block(block: &ContentBlock, options: &HtmlOptions) -> Handle {
    match block {
        ContentBlock::Paragraph(Paragraph { content, .. }) => {
            let p = create_element("p", vec![]);
            append_inline_sequence(&p, content, options);
            p
        }
        ContentBlock::Heading(Heading { level, content, .. }) => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            let heading = create_element(&tag, vec![]);
            append_inline_sequence(&heading, content, options);
            heading
        }
        ContentBlock::List(list) => build_list(list, options),
        ContentBlock::Quote(quote) => build_quote(quote, options),
        ContentBlock::Code(code) => build_code(code),
        ContentBlock::Divider(_) => create_element("hr", vec![]),
    }
}

fn build_list(list: &List, options: &HtmlOptions) -> Handle {
    let tag = match list.list_type {
        ListType::Bulleted => "ul",
        ListType::Numbered => "ol",
    };
    let element = create_element(tag, vec![]);
    for item in &list.items {
        let li = create_element("li", vec![]);
        append_inline_sequence(&li, &item.content, options);
        if let Some(nested) = &item.nested {
            let child = build_list(nested, options);
            li.children.borrow_mut().push(child);
        }
        element.children.borrow_mut().push(li);
    }
    element
}

fn build_quote(quote: &Quote, options: &HtmlOptions) -> Handle {
    let mut attrs: Vec<(&str, &str)> = vec![];
    let mut trailing_cite: Option<&str> = None;
    if let Some(citation) = &quote.citation {
        // URL citations travel in the cite attribute; anything else is
        // rendered visibly, mirroring what the parser can read back.
        if is_safe_target(citation) {
            attrs.push(("cite", citation));
        } else {
            trailing_cite = Some(citation);
        }
    }

    let blockquote = create_element("blockquote", attrs);
    append_inline_sequence(&blockquote, &quote.content, options);
    if let Some(citation) = trailing_cite {
        let cite = create_element("cite", vec![]);
        cite.children.borrow_mut().push(create_text(citation));
        blockquote.children.borrow_mut().push(cite);
    }
    blockquote
}

fn build_code(code: &CodeBlock) -> Handle {
    let pre = create_element("pre", vec![]);
    let class;
    let code_element = match &code.language {
        Some(language) => {
            class = format!("language-{language}");
            create_element("code", vec![("class", &class)])
        }
        None => create_element("code", vec![]),
    };
    code_element
        .children
        .borrow_mut()
        .push(create_text(&code.text));
    pre.children.borrow_mut().push(code_element);
    pre
}

fn append_inline_sequence(parent: &Handle, content: &[InlineContent], options: &HtmlOptions) {
    for span in content {
        match span {
            InlineContent::Text(text) => {
                let node = wrap_formatting(create_text(&text.text), text.formatting, options);
                parent.children.borrow_mut().push(node);
            }
            InlineContent::Link(link) => {
                let inner = wrap_formatting(create_text(&link.text), link.formatting, options);
                // Same scheme/length check as parse time; a target that
                // fails renders as formatted text with no destination.
                let node = if is_safe_target(&link.url) {
                    let anchor = create_element("a", vec![("href", link.url.trim())]);
                    anchor.children.borrow_mut().push(inner);
                    anchor
                } else {
                    inner
                };
                parent.children.borrow_mut().push(node);
            }
            InlineContent::LineBreak => {
                parent.children.borrow_mut().push(create_element("br", vec![]));
            }
        }
    }
}

/// Wrap a text node in the active formatting tags, canonical order.
fn wrap_formatting(node: Handle, formatting: Formatting, options: &HtmlOptions) -> Handle {
    let mut wrapped = node;
    for kind in formatting.active_kinds() {
        let element = create_element(formatting_tag(kind, options.semantic_tags), vec![]);
        element.children.borrow_mut().push(wrapped);
        wrapped = element;
    }
    wrapped
}

fn formatting_tag(kind: FormattingKind, semantic: bool) -> &'static str {
    match (kind, semantic) {
        (FormattingKind::Bold, true) => "strong",
        (FormattingKind::Bold, false) => "b",
        (FormattingKind::Italic, true) => "em",
        (FormattingKind::Italic, false) => "i",
        (FormattingKind::Underline, _) => "u",
        (FormattingKind::Strikethrough, true) => "s",
        (FormattingKind::Strikethrough, false) => "strike",
        (FormattingKind::Code, _) => "code",
    }
}

/// Create an HTML element with attributes.
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node.
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize one node and its subtree to a string.
fn serialize_node(node: &Handle) -> Result<String, ClipError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)
        .map_err(|e| ClipError::Render(format!("HTML serialization failed: {e}")))?;
    String::from_utf8(output).map_err(|e| ClipError::Render(format!("UTF-8 conversion failed: {e}")))
}
