use page_inspector::finders::{categorize_links, Finder, LinkCategory, LinkFinder, LinkRules, RawLink};
use page_inspector::{Options, Page};

#[test]
fn categorize_links_follows_rule_order() {
    let hrefs = [
        "http://evil-adservice.com/x",
        "http://site.com/a.pdf",
        "http://twitter.com/a",
        "http://x.com/v.mp4",
        "http://site.com/page",
    ];
    let raw: Vec<RawLink> = hrefs.iter().map(|h| RawLink::new(*h)).collect();
    let links = categorize_links(&raw, Some("site.com"), &LinkRules::default());

    assert_eq!(links.urls(LinkCategory::Unwanted), vec![hrefs[0]]);
    assert_eq!(links.urls(LinkCategory::Document), vec![hrefs[1]]);
    assert_eq!(links.urls(LinkCategory::Social), vec![hrefs[2]]);
    assert_eq!(links.urls(LinkCategory::Media), vec![hrefs[3]]);
    assert_eq!(links.urls(LinkCategory::Internal), vec![hrefs[4]]);
    assert_eq!(links.len(), 5);

    let json = serde_json::to_value(&links).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(json["pdfs"][0]["source_url"], hrefs[1]);
    assert_eq!(json["socials"][0]["source_url"], hrefs[2]);
}

#[test]
fn categorize_links_is_deterministic() {
    let raw: Vec<RawLink> = ["https://site.com/a", "https://b.org/", "mailto:me@site.com"]
        .iter()
        .map(|h| RawLink::new(*h))
        .collect();
    let first = categorize_links(&raw, Some("site.com"), &LinkRules::default());
    let second = categorize_links(&raw, Some("site.com"), &LinkRules::default());
    assert_eq!(first, second);
}

#[test]
fn link_finder_reads_page_and_dedups() {
    let html = r#"<html><body>
        <header><a href="/">Home</a></header>
        <ul class="main-menu"><li><a href="/blog">Blog</a></li></ul>
        <p><a href="/post#intro">Post</a> and again <a href="/post#outro">the post</a></p>
        <a href="https://example.org/">Elsewhere</a>
        <a href="mailto:hi@site.com">Mail</a>
        <a href="">empty</a>
    </body></html>"#;
    let page = Page::from_html(html, Some("https://site.com/")).unwrap_or_else(|e| panic!("{e}"));
    let links = LinkFinder::new(&Options::default()).find(&page);

    assert_eq!(
        links.urls(LinkCategory::Navigation),
        vec!["https://site.com/", "https://site.com/blog"]
    );
    assert_eq!(links.urls(LinkCategory::Internal), vec!["https://site.com/post#intro"]);
    assert_eq!(links.urls(LinkCategory::External), vec!["https://example.org/"]);
    assert_eq!(links.urls(LinkCategory::Email), vec!["mailto:hi@site.com"]);

    let post = links.get("https://site.com/post#intro").unwrap_or_else(|| panic!("post link missing"));
    assert_eq!(post.meta("text"), Some("Post"));
}

#[test]
fn custom_social_domains_from_options() {
    let options = Options {
        social_domains: vec!["x.com".to_string()],
        ..Options::default()
    };
    let raw = [RawLink::new("https://x.com/someone")];
    let links = categorize_links(&raw, Some("site.com"), &LinkRules::from_options(&options));
    assert_eq!(links.urls(LinkCategory::Social), vec!["https://x.com/someone"]);
}
