//! Block-level parsing tests: captured HTML → document structure.

use clip_content::model::{limits, BlockKind, ContentBlock, InlineContent};
use clip_content::parse::{
    parse_document, parse_document_full, parse_text, EmptyBlockPolicy, ParseOptions, ParseWarning,
};

fn kinds(html: &str) -> Vec<BlockKind> {
    parse_document(html, &ParseOptions::default())
        .blocks
        .iter()
        .map(|block| block.kind())
        .collect()
}

#[test]
fn test_kitchen_sink_block_mapping() {
    let html = r#"
        <h1>Title</h1>
        <p>Intro paragraph.</p>
        <ul><li>one</li><li>two</li></ul>
        <blockquote>Someone said this.</blockquote>
        <pre><code class="language-rust">fn main() {}</code></pre>
        <hr>
        <p>Outro.</p>
    "#;

    assert_eq!(
        kinds(html),
        vec![
            BlockKind::Heading,
            BlockKind::Paragraph,
            BlockKind::List,
            BlockKind::Quote,
            BlockKind::Code,
            BlockKind::Divider,
            BlockKind::Paragraph,
        ]
    );
}

#[test]
fn test_empty_input_yields_empty_document() {
    let content = parse_document("", &ParseOptions::default());
    assert_eq!(content.version, "1.0");
    assert!(content.blocks.is_empty());

    let content = parse_document("   \n\t  ", &ParseOptions::default());
    assert!(content.blocks.is_empty());
}

#[test]
fn test_heading_levels_come_from_tags() {
    let content = parse_document("<h3>Deep</h3><h6>Deeper</h6>", &ParseOptions::default());
    match (&content.blocks[0], &content.blocks[1]) {
        (ContentBlock::Heading(a), ContentBlock::Heading(b)) => {
            assert_eq!(a.level, 3);
            assert_eq!(b.level, 6);
        }
        other => panic!("expected two headings, got {other:?}"),
    }
}

#[test]
fn test_unknown_block_element_degrades_to_paragraph() {
    let parsed = parse_document_full(
        "<widget>custom element text</widget>",
        &ParseOptions::default(),
    );
    assert_eq!(parsed.content.blocks[0].kind(), BlockKind::Paragraph);
    assert!(parsed
        .warnings
        .iter()
        .any(|w| matches!(w, ParseWarning::UnknownBlockElement { name } if name == "widget")));
}

#[test]
fn test_scripts_and_styles_are_skipped() {
    let html = "<p>visible</p><script>alert(1)</script><style>p{color:red}</style>";
    let content = parse_document(html, &ParseOptions::default());
    assert_eq!(content.blocks.len(), 1);
    assert_eq!(content.blocks[0].kind(), BlockKind::Paragraph);
}

#[test]
fn test_div_with_block_children_is_transparent() {
    let html = "<div><p>one</p><p>two</p></div>";
    assert_eq!(kinds(html), vec![BlockKind::Paragraph, BlockKind::Paragraph]);
}

#[test]
fn test_div_without_block_children_is_a_paragraph() {
    let html = "<div>just <b>text</b> here</div>";
    assert_eq!(kinds(html), vec![BlockKind::Paragraph]);
}

#[test]
fn test_stray_inline_element_gets_implicit_paragraph() {
    let content = parse_document("<b>loose bold text</b>", &ParseOptions::default());
    match &content.blocks[0] {
        ContentBlock::Paragraph(p) => match &p.content[0] {
            InlineContent::Text(span) => {
                assert_eq!(span.text, "loose bold text");
                assert!(span.formatting.bold);
            }
            other => panic!("expected text span, got {other:?}"),
        },
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_quote_cite_attribute_becomes_citation() {
    let html = r#"<blockquote cite="https://example.com/a">Quoted.</blockquote>"#;
    let content = parse_document(html, &ParseOptions::default());
    match &content.blocks[0] {
        ContentBlock::Quote(quote) => {
            assert_eq!(quote.citation.as_deref(), Some("https://example.com/a"));
        }
        other => panic!("expected quote, got {other:?}"),
    }
}

#[test]
fn test_code_language_inference_from_class() {
    let cases = [
        (r#"<pre><code class="language-python">x = 1</code></pre>"#, Some("python")),
        (r#"<pre><code class="lang-rust">let x;</code></pre>"#, Some("rust")),
        (r#"<pre><code class="highlight-sql">SELECT 1</code></pre>"#, Some("sql")),
        (r#"<pre><code class="js-code">var x</code></pre>"#, Some("js")),
        (r#"<pre><code class="language-madeup">?</code></pre>"#, None),
        (r#"<pre>no code child</pre>"#, None),
    ];
    for (html, expected) in cases {
        let content = parse_document(html, &ParseOptions::default());
        match &content.blocks[0] {
            ContentBlock::Code(code) => assert_eq!(code.language.as_deref(), expected, "{html}"),
            other => panic!("expected code block for {html}, got {other:?}"),
        }
    }
}

#[test]
fn test_empty_blocks_dropped_by_default_kept_on_request() {
    let html = "<p>real</p><p></p><p>   </p>";

    let dropped = parse_document(html, &ParseOptions::default());
    assert_eq!(dropped.blocks.len(), 1);

    let kept = parse_document(
        html,
        &ParseOptions {
            empty_block_policy: EmptyBlockPolicy::Keep,
            ..ParseOptions::default()
        },
    );
    assert_eq!(kept.blocks.len(), 3);
}

#[test]
fn test_block_limit_truncates_with_warning() {
    let mut html = String::new();
    for i in 0..1100 {
        html.push_str(&format!("<p>paragraph {i}</p>"));
    }

    let parsed = parse_document_full(&html, &ParseOptions::default());
    assert_eq!(parsed.content.blocks.len(), 1000);
    assert!(parsed
        .warnings
        .iter()
        .any(|w| matches!(w, ParseWarning::BlockLimitExceeded { limit: 1000 })));
}

#[test]
fn test_metadata_recorded_when_source_known() {
    let options = ParseOptions {
        source_url: Some("https://example.com/post".to_string()),
        source_domain: Some("example.com".to_string()),
        ..ParseOptions::default()
    };
    let content = parse_document("<p>x</p>", &options);
    let metadata = content.metadata.expect("metadata to be recorded");
    assert_eq!(metadata.source_domain.as_deref(), Some("example.com"));
    assert_eq!(metadata.original_format.as_deref(), Some("html"));
    assert!(metadata.captured_at.is_some());

    let anonymous = parse_document("<p>x</p>", &ParseOptions::default());
    assert!(anonymous.metadata.is_none());
}

#[test]
fn test_plain_text_paragraph_chunks() {
    let text = "First paragraph line one.\nLine two.\n\nSecond paragraph.\n\n\n";
    let content = parse_text(text, &ParseOptions::default());
    assert_eq!(content.blocks.len(), 2);

    match &content.blocks[0] {
        ContentBlock::Paragraph(p) => {
            assert_eq!(p.content.len(), 3);
            assert!(matches!(p.content[1], InlineContent::LineBreak));
            assert_eq!(p.content[0].visible_text(), "First paragraph line one.");
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_plain_text_empty_input() {
    assert!(parse_text("", &ParseOptions::default()).blocks.is_empty());
    assert!(parse_text("\n\n\n", &ParseOptions::default())
        .blocks
        .is_empty());
}

#[test]
fn test_plain_text_respects_block_limit() {
    let text = "chunk\n\n".repeat(1500);
    let content = parse_text(&text, &ParseOptions::default());
    assert_eq!(content.blocks.len(), limits::MAX_BLOCKS);
}

#[test]
fn test_plain_text_truncates_long_lines() {
    let text = "x".repeat(limits::MAX_TEXT_LEN + 1000);
    let content = parse_text(&text, &ParseOptions::default());
    match &content.blocks[0] {
        ContentBlock::Paragraph(p) => {
            assert_eq!(p.content[0].visible_text().len(), limits::MAX_TEXT_LEN);
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}
