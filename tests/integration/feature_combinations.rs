//! Option combination tests
//!
//! Each test flips one or more `Options` fields and checks the effect on
//! the combined report.

#![allow(clippy::expect_used)]

use page_inspector::finders::ImageCategory;
use page_inspector::{inspect_html, Options};

const PAGE: &str = r#"<body>
    <img src="/pixel.gif" width="1" height="1">
    <img src="/hidden.png" style="display:none">
    <table>
        <tr><th>City</th><th>Pop</th></tr>
        <tr><td rowspan="2">Oslo</td><td>1</td></tr>
        <tr><td>2</td></tr>
    </table>
    <table>
        <tr><th>city</th><th>pop</th></tr>
        <tr><td>Bergen</td><td>3</td></tr>
    </table>
    <iframe srcdoc="<img src='/framed.png'><iframe srcdoc=&quot;<img src='/deep.png'>&quot;></iframe>"></iframe>
</body>"#;

fn report(options: &Options) -> page_inspector::PageReport {
    inspect_html(PAGE.as_bytes(), Some("https://site.com/"), options).expect("page parses")
}

#[test]
fn test_defaults() {
    let r = report(&Options::default());

    assert!(r.images.get("https://site.com/pixel.gif").is_none());
    assert!(r.images.get("https://site.com/hidden.png").is_none());
    assert!(r.images.get("https://site.com/framed.png").is_some());
    assert_eq!(r.tables.len(), 1);
    assert_eq!(r.tables[0].rows, vec![vec!["Oslo", "1"], vec!["2", ""], vec!["Bergen", "3"]]);
}

#[test]
fn test_tracking_pixels_and_hidden_kept_when_filters_off() {
    let r = report(&Options {
        skip_tracking_pixels: false,
        check_visibility: false,
        ..Options::default()
    });

    assert_eq!(
        r.images.get("https://site.com/pixel.gif").map(|i| i.kind),
        Some(ImageCategory::Standard)
    );
    assert!(r.images.get("https://site.com/hidden.png").is_some());
}

#[test]
fn test_rowspan_propagation_without_merge() {
    let r = report(&Options {
        propagate_rowspan: true,
        merge_tables: false,
        ..Options::default()
    });

    assert_eq!(r.tables.len(), 2);
    assert_eq!(r.tables[0].rows, vec![vec!["Oslo", "1"], vec!["Oslo", "2"]]);
    assert_eq!(r.tables[0].merged_from, 1);
}

#[test]
fn test_frame_depth_limits_nested_scans() {
    let shallow = report(&Options {
        max_frame_depth: 0,
        ..Options::default()
    });
    assert!(shallow.images.get("https://site.com/framed.png").is_none());

    let one = report(&Options {
        max_frame_depth: 1,
        ..Options::default()
    });
    assert!(one.images.get("https://site.com/framed.png").is_some());
    assert!(one.images.get("https://site.com/deep.png").is_none());

    let two = report(&Options {
        max_frame_depth: 2,
        ..Options::default()
    });
    assert!(two.images.get("https://site.com/deep.png").is_some());
}
