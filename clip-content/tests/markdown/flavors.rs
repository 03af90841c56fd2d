//! Flavor-specific Markdown output: the same document, four dialects.

use clip_content::parse::{parse_document, ParseOptions};
use clip_content::render::{render_markdown, Flavor, MarkdownOptions};
use insta::assert_snapshot;

fn render(html: &str, flavor: Flavor) -> String {
    let content = parse_document(html, &ParseOptions::default());
    render_markdown(&content, &MarkdownOptions::for_flavor(flavor))
}

#[test]
fn test_heading_per_flavor() {
    let html = "<h1>Hi</h1>";
    assert_eq!(render(html, Flavor::Github), "# Hi");
    assert_eq!(render(html, Flavor::Standard), "# Hi");
    assert_eq!(render(html, Flavor::Discord), "**Hi**");
    assert_eq!(render(html, Flavor::Slack), "*Hi*");
}

#[test]
fn test_bold_and_italic_per_flavor() {
    let html = "<p><b>bold</b> and <i>italic</i></p>";
    assert_eq!(render(html, Flavor::Github), "**bold** and *italic*");
    assert_eq!(render(html, Flavor::Slack), "*bold* and _italic_");
}

#[test]
fn test_underline_only_on_discord() {
    let html = "<p><u>under</u></p>";
    assert_eq!(render(html, Flavor::Discord), "__under__");
    // Other dialects have no underline syntax; the flag drops to plain.
    assert_eq!(render(html, Flavor::Github), "under");
    assert_eq!(render(html, Flavor::Slack), "under");
}

#[test]
fn test_strikethrough_per_flavor() {
    let html = "<p><s>gone</s></p>";
    assert_eq!(render(html, Flavor::Github), "~~gone~~");
    assert_eq!(render(html, Flavor::Slack), "~gone~");
}

#[test]
fn test_links_per_flavor() {
    let html = r#"<p><a href="https://example.com">text</a></p>"#;
    assert_eq!(render(html, Flavor::Github), "[text](https://example.com)");
    assert_eq!(render(html, Flavor::Slack), "<https://example.com|text>");
}

#[test]
fn test_unsafe_link_is_plain_text_everywhere() {
    let html = r#"<p><a href="javascript:alert(1)">click</a></p>"#;
    for flavor in [Flavor::Github, Flavor::Discord, Flavor::Slack, Flavor::Standard] {
        let md = render(html, flavor);
        assert_eq!(md, "click", "{flavor}");
    }
}

#[test]
fn test_slack_entities() {
    let md = render("<p>a &lt; b &amp; c</p>", Flavor::Slack);
    assert_eq!(md, "a &lt; b &amp; c");
}

#[test]
fn test_slack_skips_code_fences() {
    let md = render("<pre><code>let x = 1;\nlet y = 2;</code></pre>", Flavor::Slack);
    assert_eq!(md, "    let x = 1;\n    let y = 2;");
}

#[test]
fn test_divider_per_flavor() {
    assert_eq!(render("<hr>", Flavor::Github), "---");
    assert_eq!(render("<hr>", Flavor::Discord), "———");
}

#[test]
fn test_bullet_glyphs_cycle_by_depth() {
    let html = "<ul><li>a<ul><li>b<ul><li>c</li></ul></li></ul></li></ul>";
    let md = render(html, Flavor::Github);
    assert_snapshot!(md, @r###"
    - a
      * b
        + c
    "###);
}

#[test]
fn test_numbered_list_counters() {
    let md = render("<ol><li>one</li><li>two</li><li>three</li></ol>", Flavor::Github);
    assert_eq!(md, "1. one\n2. two\n3. three");
}

#[test]
fn test_quote_with_citation() {
    let html = r#"<blockquote cite="https://example.com">Wise words.</blockquote>"#;
    let md = render(html, Flavor::Github);
    assert_eq!(md, "> Wise words.\n> — https://example.com");
}

#[test]
fn test_deep_list_degrades_to_flat_dump() {
    let mut html = String::new();
    for level in 1..=5 {
        html.push_str(&format!("<ul><li>level {level}"));
    }
    for _ in 0..5 {
        html.push_str("</li></ul>");
    }

    let content = parse_document(&html, &ParseOptions::default());
    let options = MarkdownOptions {
        max_nesting_level: 2,
        ..MarkdownOptions::for_flavor(Flavor::Github)
    };
    let md = render_markdown(&content, &options);

    // No line may be indented past the cap, and every level's text stays.
    for line in md.lines() {
        let indent = line.len() - line.trim_start().len();
        assert!(indent <= 2, "over-indented line: {line:?}");
    }
    for level in 1..=5 {
        assert!(md.contains(&format!("level {level}")), "missing level {level}");
    }
}

#[test]
fn test_empty_document_renders_empty() {
    assert_eq!(render("", Flavor::Github), "");
}
