//! Validation and repair over documents that arrive from outside the
//! parser (wire JSON, other tools).

use clip_content::model::{ClippyContent, ContentBlock, InlineContent, Paragraph};
use clip_content::validate::{sanitize, validate, ValidationWarning};

fn paragraph(id: &str, text: &str) -> ContentBlock {
    ContentBlock::Paragraph(Paragraph {
        id: id.to_string(),
        content: vec![InlineContent::text(text)],
    })
}

#[test]
fn test_duplicate_ids_fail_validation() {
    let content = ClippyContent::new(vec![paragraph("same", "one"), paragraph("same", "two")]);
    let report = validate(&content);
    assert!(!report.is_valid);
}

#[test]
fn test_oversized_document_repairs_to_limit() {
    let blocks: Vec<ContentBlock> = (0..1500).map(|_| paragraph("dup", "text")).collect();
    let mut content = ClippyContent::new(blocks);
    content.version = "0.9".to_string();

    let report = validate(&content);
    assert!(!report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::TooManyBlocks { count: 1500, .. })));

    let repaired = sanitize(&content);
    assert_eq!(repaired.blocks.len(), 1000);
    assert_eq!(repaired.version, "1.0");

    let mut ids = std::collections::HashSet::new();
    for block in &repaired.blocks {
        assert!(ids.insert(block.id().to_string()), "id reused: {}", block.id());
    }
    assert!(validate(&repaired).is_valid);
}

#[test]
fn test_sanitize_is_idempotent() {
    let content = ClippyContent::new(vec![paragraph("", "one"), paragraph("a", "two")]);
    let once = sanitize(&content);
    let twice = sanitize(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_suspicious_urls_warn_but_stay_valid() {
    let json = r#"{"version":"1.0","blocks":[
        {"type":"paragraph","id":"p","content":[
            {"type":"link","url":"javascript:alert(1)","text":"click"}
        ]}
    ]}"#;
    let content = ClippyContent::from_json(json).unwrap();
    let report = validate(&content);
    assert!(report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::SuspiciousUrl { .. })));
}
