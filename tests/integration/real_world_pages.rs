//! Real-world page tests
//!
//! Snapshots shaped like common site templates: a news article with ads
//! and embeds, and a product listing built from div grids.

#![allow(clippy::expect_used)]

use page_inspector::finders::{ImageCategory, LinkCategory, VideoCategory};
use page_inspector::tables::TableKind;
use page_inspector::{inspect, Options, Page};

const NEWS_ARTICLE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>City council approves new budget</title>
    <style>
        .masthead { background-image: url('/static/masthead.jpg'); }
        .quote::before { content: ""; background: url(/static/quote.svg); }
    </style>
</head>
<body>
    <header class="masthead">
        <nav class="site-nav">
            <a href="/">Home</a>
            <a href="/politics">Politics</a>
            <a href="/sport">Sport</a>
        </nav>
    </header>
    <main>
        <article>
            <h1>City council approves new budget</h1>
            <p class="byline">By <a href="/authors/jane">Jane Doe</a></p>
            <figure>
                <img src="/photos/council.jpg" alt="Council chamber" width="1200" height="800">
                <figcaption>The council chamber on Tuesday.</figcaption>
            </figure>
            <p>The council voted seven to two in favour. Read the
               <a href="/docs/budget-2026.pdf">full budget</a>.</p>
            <blockquote class="quote">We kept every library open.</blockquote>
            <img class="lazyload" data-src="/photos/library.jpg" src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
            <iframe width="560" height="315" src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe>
            <table>
                <caption>Spending by department</caption>
                <thead><tr><th>Department</th><th>2025</th><th>2026</th></tr></thead>
                <tbody>
                    <tr><td>Libraries</td><td>4.1m</td><td>4.3m</td></tr>
                    <tr><td>Parks</td><td>2.0m</td><td>2.2m</td></tr>
                </tbody>
            </table>
        </article>
        <aside class="ad-slot">
            <a href="https://ads.doubleclick.net/click?id=42"><img src="https://ads.doubleclick.net/banner.png" width="300" height="250"></a>
            <img src="https://tracker.example.net/p.gif" width="1" height="1">
        </aside>
    </main>
    <footer>
        <a href="https://twitter.com/citynews">Twitter</a>
        <a href="https://www.facebook.com/citynews">Facebook</a>
        <a href="mailto:tips@citynews.example">Send us a tip</a>
    </footer>
</body>
</html>"#;

#[test]
fn test_news_article() {
    let page = Page::from_html(NEWS_ARTICLE, Some("https://citynews.example/politics/budget"))
        .expect("article parses");
    let report = inspect(&page, &Options::default());

    let links = &report.links;
    assert_eq!(links.in_category(LinkCategory::Navigation).count(), 3);
    assert_eq!(links.urls(LinkCategory::Document), vec!["https://citynews.example/docs/budget-2026.pdf"]);
    assert_eq!(links.urls(LinkCategory::Email), vec!["mailto:tips@citynews.example"]);
    assert_eq!(links.in_category(LinkCategory::Social).count(), 2);
    assert_eq!(links.in_category(LinkCategory::Unwanted).count(), 1);
    assert!(links.urls(LinkCategory::Internal).contains(&"https://citynews.example/authors/jane"));

    let images = &report.images;
    assert_eq!(
        images.get("https://citynews.example/photos/council.jpg").map(|i| i.kind),
        Some(ImageCategory::Standard)
    );
    assert_eq!(
        images.get("https://citynews.example/photos/library.jpg").map(|i| i.kind),
        Some(ImageCategory::Lazy)
    );
    assert_eq!(
        images.get("https://citynews.example/static/masthead.jpg").map(|i| i.kind),
        Some(ImageCategory::Background)
    );
    assert_eq!(
        images.get("https://citynews.example/static/quote.svg").map(|i| i.kind),
        Some(ImageCategory::CssGenerated)
    );
    assert!(images.get("https://tracker.example.net/p.gif").is_none());

    assert_eq!(report.videos.in_category(VideoCategory::Youtube).count(), 1);

    assert_eq!(report.tables.len(), 1);
    let table = &report.tables[0];
    assert_eq!(table.kind, TableKind::Html);
    assert_eq!(table.caption, "Spending by department");
    assert_eq!(table.headers, vec!["Department", "2025", "2026"]);
    assert_eq!(table.rows.len(), 2);

    assert!(report.word_count > 20);
}

const PRODUCT_LISTING: &str = r#"<html><body>
    <div class="filters" role="navigation">
        <a href="/shop?sort=price">Price</a>
        <a href="/shop?sort=rating">Rating</a>
    </div>
    <div role="table" aria-label="Compare plans">
        <div role="row">
            <span role="columnheader">Plan</span><span role="columnheader">Price</span><span role="columnheader">Seats</span>
        </div>
        <div role="row"><span role="cell">Basic</span><span role="cell">$5</span><span role="cell">1</span></div>
        <div role="row"><span role="cell">Team</span><span role="cell">$20</span><span role="cell">10</span></div>
    </div>
    <dl class="specs">
        <dt>Weight</dt><dd>1.2 kg</dd>
        <dt>Colour</dt><dd>Black</dd>
    </dl>
    <div class="gallery">
        <picture>
            <source srcset="/img/product.webp" type="image/webp">
            <img src="/img/product.jpg" alt="Product">
        </picture>
        <svg width="24" height="24" viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg>
        <video controls poster="/img/demo-poster.jpg"><source src="/media/demo.mp4" type="video/mp4"></video>
    </div>
</body></html>"#;

#[test]
fn test_product_listing() {
    let page = Page::from_html(PRODUCT_LISTING, Some("https://shop.example/products/1")).expect("listing parses");
    let report = inspect(&page, &Options::default());

    assert_eq!(report.links.in_category(LinkCategory::Navigation).count(), 2);

    let kinds: Vec<TableKind> = report.tables.iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TableKind::Aria));
    let plans = report
        .tables
        .iter()
        .find(|t| t.kind == TableKind::Aria)
        .expect("aria grid detected");
    assert_eq!(plans.headers, vec!["Plan", "Price", "Seats"]);
    assert_eq!(plans.rows, vec![vec!["Basic", "$5", "1"], vec!["Team", "$20", "10"]]);

    assert!(report.images.get("https://shop.example/img/product.jpg").is_some());
    assert_eq!(report.images.in_category(ImageCategory::Svg).count(), 1);
    assert_eq!(report.videos.urls(VideoCategory::Html5), vec!["https://shop.example/media/demo.mp4"]);
}
