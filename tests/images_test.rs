use page_inspector::finders::{Finder, ImageCategory, ImageFinder};
use page_inspector::{Options, Page};

fn scan(html: &str, options: &Options) -> page_inspector::finders::CategorizedImages {
    let page = Page::from_html(html, Some("https://site.com/gallery/")).unwrap_or_else(|e| panic!("{e}"));
    ImageFinder::new(options).find(&page)
}

#[test]
fn img_and_css_background_of_same_url_kept_once() {
    let html = r#"<body>
        <img src="/img/hero.jpg" alt="Hero">
        <div style="background-image: url('https://site.com/img/hero.jpg')"></div>
        <style>.banner { background: url(/img/hero.jpg) no-repeat; }</style>
        <div class="banner"></div>
    </body>"#;
    let images = scan(html, &Options::default());

    assert_eq!(images.len(), 1);
    assert_eq!(images.records()[0].kind, ImageCategory::Standard);
    assert_eq!(images.records()[0].source_url, "https://site.com/img/hero.jpg");
}

#[test]
fn hidden_images_excluded_in_every_category() {
    let html = r#"<body>
        <img src="/visible.png">
        <img src="/none.png" style="display:none">
        <img src="/zero.png" width="0" height="40">
        <div hidden><img src="/in-hidden.png"></div>
        <div style="display: none; background-image: url(/bg-hidden.png)"></div>
        <div style="visibility:hidden"><svg width="10" height="10"><rect/></svg></div>
    </body>"#;
    let images = scan(html, &Options::default());

    assert_eq!(images.len(), 1);
    assert_eq!(images.records()[0].source_url, "https://site.com/visible.png");
}

#[test]
fn stylesheet_hidden_images_excluded() {
    let html = r#"<head><style>
        .off { display: none }
        .ghost { visibility: hidden; }
        .tile { background-image: url(/tile.png); }
    </style></head><body>
        <img class="off" src="/x.png">
        <section class="ghost"><img src="/in-ghost.png"></section>
        <div class="tile off"></div>
        <img class="off" style="display:inline" src="/shown.png">
    </body>"#;
    let images = scan(html, &Options::default());

    assert_eq!(images.urls(ImageCategory::Standard), vec!["https://site.com/shown.png"]);
    assert!(images.get("https://site.com/tile.png").is_none());

    let unchecked = Options {
        check_visibility: false,
        ..Options::default()
    };
    assert_eq!(scan(html, &unchecked).len(), 4);
}

#[test]
fn visibility_check_can_be_disabled() {
    let html = r#"<body><img src="/none.png" style="display:none"></body>"#;
    let options = Options {
        check_visibility: false,
        ..Options::default()
    };
    assert_eq!(scan(html, &options).len(), 1);
}

#[test]
fn identity_keys_unique_across_sources() {
    let html = r#"<body>
        <img src="/a.png"><img src="/a.png#again"><img srcset="/b.png 1x, /b@2x.png 2x">
        <picture><source srcset="/c.webp"><img src="/c.png"></picture>
        <input type="image" src="/a.png">
        <div style="background:url(/d.png)"></div>
    </body>"#;
    let images = scan(html, &Options::default());

    let mut keys: Vec<&str> = images.records().iter().map(|r| r.source_url.as_str()).collect();
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

#[test]
fn tiny_data_urls_skipped_unless_svg() {
    let html = r#"<body>
        <img src="data:image/png;base64,iVBORw0KGgo=">
        <img src="data:image/svg+xml;utf8,<svg/>">
    </body>"#;
    let images = scan(html, &Options::default());

    assert_eq!(images.len(), 1);
    assert_eq!(images.records()[0].kind, ImageCategory::Svg);
}
