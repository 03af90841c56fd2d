//! HTML export tests: document → HTML fragment, and the parse → render →
//! re-parse round trip.

use clip_content::model::{ClippyContent, ContentBlock, List};
use clip_content::parse::{parse_document, ParseOptions};
use clip_content::render::{render_html, HtmlOptions};
use insta::assert_snapshot;

fn pipeline(html: &str) -> String {
    let content = parse_document(html, &ParseOptions::default());
    render_html(&content, &HtmlOptions::default()).expect("render to succeed")
}

/// Ids are session-scoped; blank them out for structural comparison.
fn strip_ids(content: &mut ClippyContent) {
    fn strip_list(list: &mut List) {
        list.id.clear();
        for item in &mut list.items {
            item.id.clear();
            if let Some(nested) = &mut item.nested {
                strip_list(nested);
            }
        }
    }
    for block in &mut content.blocks {
        match block {
            ContentBlock::Paragraph(b) => b.id.clear(),
            ContentBlock::Heading(b) => b.id.clear(),
            ContentBlock::Quote(b) => b.id.clear(),
            ContentBlock::Code(b) => b.id.clear(),
            ContentBlock::Divider(b) => b.id.clear(),
            ContentBlock::List(list) => strip_list(list),
        }
    }
}

#[test]
fn test_round_trip_preserves_structure() {
    let source = "<h2>Title</h2>\
        <p>Some <b>bold</b> and <i>italic</i> text.</p>\
        <ul><li>one</li><li>two<ul><li>deep</li></ul></li></ul>\
        <blockquote cite=\"https://example.com\">Said.</blockquote>\
        <pre><code class=\"language-rust\">fn x() {}</code></pre>\
        <hr>";

    let mut first = parse_document(source, &ParseOptions::default());
    let rendered = render_html(&first, &HtmlOptions::default()).unwrap();
    let mut second = parse_document(&rendered, &ParseOptions::default());

    strip_ids(&mut first);
    strip_ids(&mut second);
    assert_eq!(first, second);
}

#[test]
fn test_kitchen_sink_fragment() {
    let html = pipeline(
        "<h2>Notes</h2>\
        <p>Plain with <b>bold</b>.</p>\
        <ol><li>first</li><li>second</li></ol>",
    );
    assert_snapshot!(html, @r###"
    <h2>Notes</h2>
    <p>Plain with <strong>bold</strong>.</p>
    <ol><li>first</li><li>second</li></ol>
    "###);
}

#[test]
fn test_nested_list_markup() {
    let html = pipeline("<ul><li>outer<ul><li>inner</li></ul></li></ul>");
    assert_eq!(html, "<ul><li>outer<ul><li>inner</li></ul></li></ul>");
}

#[test]
fn test_quote_with_url_citation_uses_cite_attribute() {
    let html = pipeline(r#"<blockquote cite="https://example.com/src">Words.</blockquote>"#);
    assert_eq!(
        html,
        r#"<blockquote cite="https://example.com/src">Words.</blockquote>"#
    );
}

#[test]
fn test_code_block_language_class() {
    let html = pipeline(r#"<pre><code class="language-python">x = 1</code></pre>"#);
    assert_eq!(html, r#"<pre><code class="language-python">x = 1</code></pre>"#);
}

#[test]
fn test_text_is_escaped() {
    let html = pipeline("<p>a &lt; b &amp; c</p>");
    assert_eq!(html, "<p>a &lt; b &amp; c</p>");
}

#[test]
fn test_empty_document_renders_empty() {
    assert_eq!(pipeline(""), "");
}
