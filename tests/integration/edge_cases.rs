//! Edge case integration tests
//!
//! Tests for unusual inputs, boundary conditions, and error handling.

#![allow(clippy::expect_used)] // expect() is appropriate in tests for clear panic messages

use page_inspector::{inspect, inspect_html, Error, Options, Page};

#[test]
fn test_empty_document() {
    let page = Page::from_html("", None).expect("empty html parses");
    let report = inspect(&page, &Options::default());

    assert_eq!(report.total_items(), 0);
    assert_eq!(report.word_count, 0);
    assert!(report.url.is_none());
}

#[test]
fn test_relative_page_url_rejected() {
    let result = Page::from_html("<p>x</p>", Some("/relative/path"));
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_malformed_markup_still_scanned() {
    let html = r#"<body><div><a href="/a">unclosed<div><img src="/x.png"></div><table><tr><th>H<tr><td>1"#;
    let report = inspect_html(html.as_bytes(), Some("https://site.com/"), &Options::default())
        .expect("malformed html is still a page");

    assert_eq!(report.links.len(), 1);
    assert_eq!(report.images.len(), 1);
    assert_eq!(report.tables.len(), 1);
}

#[test]
fn test_invalid_selector_in_stylesheet_is_harmless() {
    let html = r#"<head><style>
        :::nonsense { background-image: url(/weird.png); }
        .ok { background-image: url(/ok.png); }
    </style></head><body><div class="ok"></div></body>"#;
    let report = inspect_html(html.as_bytes(), Some("https://site.com/"), &Options::default())
        .expect("page parses");

    assert!(report.images.get("https://site.com/ok.png").is_some());
}

#[test]
fn test_links_without_page_url() {
    let html = r#"<body><a href="relative.html">r</a><a href="https://example.com/">e</a></body>"#;
    let report = inspect_html(html.as_bytes(), None, &Options::default()).expect("page parses");

    assert_eq!(report.links.len(), 2);
}

#[test]
fn test_legacy_charset_decoded() {
    let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><p>Caf\xE9 cr\xE8me</p></body></html>";
    let report = inspect_html(html, None, &Options::default()).expect("page parses");

    assert_eq!(report.word_count, 2);
}

#[test]
fn test_zero_batch_size_still_completes() {
    let options = Options {
        batch_size: 0,
        ..Options::default()
    };
    let html = r#"<body><a href="/1">1</a><a href="/2">2</a><img src="/i.png"></body>"#;
    let report = inspect_html(html.as_bytes(), Some("https://site.com/"), &options).expect("page parses");

    assert_eq!(report.links.len(), 2);
    assert_eq!(report.images.len(), 1);
}
