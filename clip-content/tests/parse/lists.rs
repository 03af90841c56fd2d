//! List structure tests: nesting, depth caps, degradation.

use clip_content::model::{ContentBlock, List, ListType};
use clip_content::parse::{parse_document, parse_document_full, ParseOptions, ParseWarning};

/// Build a bulleted list nested `depth` levels deep, one item per level.
fn nested_html(depth: usize) -> String {
    let mut html = String::new();
    for level in 1..=depth {
        html.push_str(&format!("<ul><li>level {level}"));
    }
    for _ in 0..depth {
        html.push_str("</li></ul>");
    }
    html
}

fn first_list(html: &str, options: &ParseOptions) -> List {
    let content = parse_document(html, options);
    match content.blocks.into_iter().next() {
        Some(ContentBlock::List(list)) => list,
        other => panic!("expected a list, got {other:?}"),
    }
}

fn max_depth(list: &List) -> usize {
    1 + list
        .items
        .iter()
        .filter_map(|item| item.nested.as_deref().map(max_depth))
        .max()
        .unwrap_or(0)
}

fn count_items(list: &List) -> usize {
    list.items
        .iter()
        .map(|item| 1 + item.nested.as_deref().map(count_items).unwrap_or(0))
        .sum()
}

#[test]
fn test_flat_lists() {
    let bulleted = first_list("<ul><li>a</li><li>b</li></ul>", &ParseOptions::default());
    assert_eq!(bulleted.list_type, ListType::Bulleted);
    assert_eq!(bulleted.items.len(), 2);
    assert_eq!(bulleted.items[0].content[0].visible_text(), "a");

    let numbered = first_list("<ol><li>x</li></ol>", &ParseOptions::default());
    assert_eq!(numbered.list_type, ListType::Numbered);
}

#[test]
fn test_nested_list_attaches_to_item() {
    let html = "<ul><li>outer<ul><li>inner</li></ul></li></ul>";
    let list = first_list(html, &ParseOptions::default());
    assert_eq!(list.items.len(), 1);
    let nested = list.items[0].nested.as_deref().expect("nested list");
    assert_eq!(nested.items[0].content[0].visible_text(), "inner");
}

#[test]
fn test_nesting_within_limit_is_preserved() {
    let list = first_list(&nested_html(9), &ParseOptions::default());
    assert_eq!(max_depth(&list), 9);
    assert_eq!(count_items(&list), 9);
}

#[test]
fn test_deep_nesting_flattens_past_the_cap() {
    // Twelve levels against the default cap of ten: parses without error,
    // warns, and the deepest levels collapse into a flat dump.
    let parsed = parse_document_full(&nested_html(12), &ParseOptions::default());
    assert!(parsed
        .warnings
        .iter()
        .any(|w| matches!(w, ParseWarning::NestingLimitExceeded { limit: 10 })));

    let list = match &parsed.content.blocks[0] {
        ContentBlock::List(list) => list,
        other => panic!("expected a list, got {other:?}"),
    };
    assert!(max_depth(list) <= 10, "depth was {}", max_depth(list));
    // Every level's text survives the flattening.
    assert_eq!(count_items(list), 12);
}

#[test]
fn test_flattened_dump_is_bulleted() {
    let options = ParseOptions {
        nesting_limit: 2,
        ..ParseOptions::default()
    };
    let parsed = parse_document_full(&nested_html(4), &options);
    let list = match &parsed.content.blocks[0] {
        ContentBlock::List(list) => list,
        other => panic!("expected a list, got {other:?}"),
    };

    assert_eq!(max_depth(list), 2);
    let dump = list.items[0].nested.as_deref().expect("flattened dump");
    assert_eq!(dump.list_type, ListType::Bulleted);
    assert_eq!(dump.items.len(), 3);
    assert!(dump.items.iter().all(|item| item.nested.is_none()));
    assert_eq!(dump.items[2].content[0].visible_text(), "level 4");
}

#[test]
fn test_only_first_nested_list_is_kept() {
    let html = "<ul><li>item\
        <ul><li>first</li></ul>\
        <ul><li>second</li></ul>\
        </li></ul>";
    let parsed = parse_document_full(html, &ParseOptions::default());
    let list = match &parsed.content.blocks[0] {
        ContentBlock::List(list) => list,
        other => panic!("expected a list, got {other:?}"),
    };

    let nested = list.items[0].nested.as_deref().expect("nested list");
    assert_eq!(nested.items.len(), 1);
    assert_eq!(nested.items[0].content[0].visible_text(), "first");
    assert!(parsed
        .warnings
        .iter()
        .any(|w| matches!(w, ParseWarning::ExtraNestedList)));
}

#[test]
fn test_empty_items_are_pruned() {
    let html = "<ul><li>kept</li><li></li><li>  </li></ul>";
    let list = first_list(html, &ParseOptions::default());
    assert_eq!(list.items.len(), 1);
}

#[test]
fn test_item_ids_are_unique() {
    let list = first_list(&nested_html(5), &ParseOptions::default());
    let mut ids = std::collections::HashSet::new();
    fn collect(list: &List, ids: &mut std::collections::HashSet<String>) {
        assert!(ids.insert(list.id.clone()));
        for item in &list.items {
            assert!(ids.insert(item.id.clone()));
            if let Some(nested) = &item.nested {
                collect(nested, ids);
            }
        }
    }
    collect(&list, &mut ids);
}
