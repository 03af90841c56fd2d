//! Inline parsing tests: formatting resolution, links, whitespace, merging.

use clip_content::model::{Formatting, InlineContent, TextSpan};
use clip_content::parse::inline::{merge_spans, parse_inline_fragment};
use clip_content::parse::ParseOptions;
use proptest::prelude::*;

fn spans(fragment: &str) -> Vec<InlineContent> {
    parse_inline_fragment(fragment, &ParseOptions::default())
}

#[test]
fn test_nested_formatting_accumulates() {
    let result = spans("<b><i>both</i></b>");
    match &result[0] {
        InlineContent::Text(span) => {
            assert!(span.formatting.bold);
            assert!(span.formatting.italic);
            assert!(!span.formatting.underline);
        }
        other => panic!("expected text span, got {other:?}"),
    }
}

#[test]
fn test_legacy_and_semantic_tags_are_equivalent() {
    for fragment in ["<b>x</b>", "<strong>x</strong>"] {
        match &spans(fragment)[0] {
            InlineContent::Text(span) => assert!(span.formatting.bold, "{fragment}"),
            other => panic!("expected text span, got {other:?}"),
        }
    }
    for fragment in ["<s>x</s>", "<strike>x</strike>", "<del>x</del>"] {
        match &spans(fragment)[0] {
            InlineContent::Text(span) => assert!(span.formatting.strikethrough, "{fragment}"),
            other => panic!("expected text span, got {other:?}"),
        }
    }
}

#[test]
fn test_style_attribute_formatting() {
    let result = spans(r#"<span style="font-weight: bold; font-style: italic">styled</span>"#);
    match &result[0] {
        InlineContent::Text(span) => {
            assert!(span.formatting.bold);
            assert!(span.formatting.italic);
        }
        other => panic!("expected text span, got {other:?}"),
    }

    let result = spans(r#"<span style="font-weight: 700">heavy</span>"#);
    match &result[0] {
        InlineContent::Text(span) => assert!(span.formatting.bold),
        other => panic!("expected text span, got {other:?}"),
    }
}

#[test]
fn test_links_keep_formatting_and_text() {
    let result = spans(r#"<a href="https://example.com"><b>click</b></a>"#);
    match &result[0] {
        InlineContent::Link(link) => {
            assert_eq!(link.url, "https://example.com");
            assert_eq!(link.text, "click");
            assert!(link.formatting.bold);
        }
        other => panic!("expected link, got {other:?}"),
    }
}

#[test]
fn test_link_folds_nested_wrapper_formatting() {
    // Formatting carried anywhere inside the anchor lands on the link span.
    let result = spans(r#"<a href="https://example.com"><b><i>click</i></b></a>"#);
    match &result[0] {
        InlineContent::Link(link) => {
            assert!(link.formatting.bold);
            assert!(link.formatting.italic);
            assert!(!link.formatting.strikethrough);
        }
        other => panic!("expected link, got {other:?}"),
    }

    // Outer formatting still applies when the anchor itself is wrapped.
    let result = spans(r#"<b><a href="https://example.com">click</a></b>"#);
    match &result[0] {
        InlineContent::Link(link) => assert!(link.formatting.bold),
        other => panic!("expected link, got {other:?}"),
    }
}

#[test]
fn test_unsafe_link_degrades_to_text() {
    let result = spans(r#"<a href="javascript:alert(1)">evil</a>"#);
    match &result[0] {
        InlineContent::Text(span) => assert_eq!(span.text, "evil"),
        other => panic!("expected plain text, got {other:?}"),
    }
}

#[test]
fn test_relative_links_are_allowed() {
    let result = spans(r#"<a href="/docs/page#section">docs</a>"#);
    assert!(matches!(&result[0], InlineContent::Link(_)));
}

#[test]
fn test_whitespace_collapses_across_tags() {
    let result = spans("some   text\n  with <b> spaced </b> tags");
    let text: String = result.iter().map(|s| s.visible_text()).collect();
    assert_eq!(text, "some text with spaced tags");
}

#[test]
fn test_br_becomes_line_break() {
    let result = spans("one<br>two");
    assert_eq!(result.len(), 3);
    assert!(matches!(result[1], InlineContent::LineBreak));
}

#[test]
fn test_adjacent_equal_spans_merge() {
    // Two bold runs split by the source markup end up as one span.
    let result = spans("<b>first </b><b>second</b>");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].visible_text(), "first second");
}

fn text_span(text: &str, bold: bool, italic: bool) -> InlineContent {
    InlineContent::Text(TextSpan {
        text: text.to_string(),
        formatting: Formatting {
            bold,
            italic,
            ..Formatting::default()
        },
    })
}

#[test]
fn test_merge_drops_empty_spans() {
    let merged = merge_spans(vec![
        text_span("", false, false),
        text_span("a", true, false),
        text_span("b", true, false),
        text_span("c", false, true),
    ]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].visible_text(), "ab");
}

#[test]
fn test_merge_stops_at_line_breaks() {
    let merged = merge_spans(vec![
        text_span("a", true, false),
        InlineContent::LineBreak,
        text_span("b", true, false),
    ]);
    assert_eq!(merged.len(), 3);
}

prop_compose! {
    fn arb_span()(text in "[a-z ]{0,4}", bold in any::<bool>(), italic in any::<bool>()) -> InlineContent {
        text_span(&text, bold, italic)
    }
}

proptest! {
    #[test]
    fn merge_is_idempotent(spans in prop::collection::vec(arb_span(), 0..16)) {
        let once = merge_spans(spans);
        let twice = merge_spans(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_preserves_visible_text(spans in prop::collection::vec(arb_span(), 0..16)) {
        let expected: String = spans.iter().map(|s| s.visible_text()).collect();
        let merged: String = merge_spans(spans).iter().map(|s| s.visible_text()).collect();
        prop_assert_eq!(merged, expected);
    }
}
