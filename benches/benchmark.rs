//! Performance benchmarks for page-inspector.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Each finder over a small synthetic page
//! - The full report over generated pages of growing size, to watch the
//!   batched scans scale

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use page_inspector::finders::{Finder, ImageFinder, LinkFinder, VideoFinder, WordCounter};
use page_inspector::tables::TableFinder;
use page_inspector::{inspect, Options, Page};

const SAMPLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sample Page</title>
    <style>
        .hero { background-image: url("/img/hero.jpg"); }
        .badge::before { content: ""; background: url(/img/badge.svg); }
    </style>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/about">About</a>
    </nav>
    <article>
        <h1>Sample Article Title</h1>
        <div class="hero"></div>
        <p>Read the <a href="/report.pdf">annual report</a> or
        <a href="https://twitter.com/sample">follow us</a>.</p>
        <img src="/img/photo.jpg" alt="Photo" width="640" height="480">
        <img data-src="/img/lazy.jpg" src="data:image/gif;base64,R0lGOD">
        <video poster="/img/poster.jpg"><source src="/media/clip.mp4"></video>
        <iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe>
        <table>
            <thead><tr><th>Region</th><th>Sales</th></tr></thead>
            <tr><td>North</td><td>1,200</td></tr>
            <tr><td>South</td><td>900</td></tr>
        </table>
        <div role="table">
            <div role="row"><div role="columnheader">Name</div><div role="columnheader">Role</div></div>
            <div role="row"><div role="cell">Ann</div><div role="cell">Editor</div></div>
        </div>
    </article>
    <footer>
        <a href="mailto:hello@site.com">Contact</a>
    </footer>
</body>
</html>
"#;

fn sample_page() -> Page {
    Page::from_html(SAMPLE_HTML, Some("https://site.com/articles/sample")).unwrap_or_else(|e| panic!("{e}"))
}

/// Page with `n` repeated article blocks.
fn generated_html(n: usize) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..n {
        html.push_str(&format!(
            r#"<section><p>Paragraph {i} with a few words of text.</p>
            <a href="/page/{i}">Page {i}</a><img src="/img/{i}.png" alt="{i}">
            <div style="background-image:url(/bg/{i}.jpg)"></div></section>"#
        ));
    }
    html.push_str("</body></html>");
    html
}

fn bench_finders(c: &mut Criterion) {
    let page = sample_page();
    let options = Options::default();

    c.bench_function("links", |b| {
        let finder = LinkFinder::new(&options);
        b.iter(|| finder.find(black_box(&page)));
    });
    c.bench_function("images", |b| {
        let finder = ImageFinder::new(&options);
        b.iter(|| finder.find(black_box(&page)));
    });
    c.bench_function("videos", |b| {
        let finder = VideoFinder::new(&options);
        b.iter(|| finder.find(black_box(&page)));
    });
    c.bench_function("tables", |b| {
        let finder = TableFinder::new(&options);
        b.iter(|| finder.find(black_box(&page)));
    });
    c.bench_function("word_count", |b| {
        let counter = WordCounter::new();
        b.iter(|| counter.count(black_box(&page)));
    });
}

/// Full report over pages of growing size.
fn bench_page_size(c: &mut Criterion) {
    let options = Options::default();
    let mut group = c.benchmark_group("inspect");

    for blocks in [10, 100, 1000] {
        let html = generated_html(blocks);
        let page = Page::from_html(&html, Some("https://site.com/")).unwrap_or_else(|e| panic!("{e}"));
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("blocks", blocks), &page, |b, page| {
            b.iter(|| inspect(black_box(page), black_box(&options)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_finders, bench_page_size);
criterion_main!(benches);
