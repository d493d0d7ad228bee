#![cfg(feature = "probe")]

use std::time::Duration;

use page_inspector::download::download_resource;
use page_inspector::finders::{categorize_links, Finder, ImageFinder, LinkFinder, LinkRules, RawLink};
use page_inspector::probe::{LinkStatus, Prober};
use page_inspector::{Options, Page};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober(timeout_ms: u64) -> Prober {
    let options = Options {
        probe_timeout_ms: timeout_ms,
        ..Options::default()
    };
    Prober::new(&options).unwrap_or_else(|e| panic!("{e}"))
}

async fn server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/ok"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/photo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1234]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNGDATA".to_vec()))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn check_link_reports_each_outcome() {
    let server = server().await;
    let prober = prober(500);
    let url = |p: &str| format!("{}{p}", server.uri());

    assert_eq!(prober.check_link(&url("/ok")).await, LinkStatus::Live(200));
    assert_eq!(prober.check_link(&url("/moved")).await, LinkStatus::Redirected(url("/ok")));
    assert_eq!(prober.check_link(&url("/missing")).await, LinkStatus::Broken(404));
    assert_eq!(prober.check_link(&url("/slow")).await, LinkStatus::Unknown);
}

#[tokio::test]
async fn content_length_from_head() {
    let server = server().await;
    let prober = prober(1000);

    assert_eq!(prober.content_length(&format!("{}/photo.png", server.uri())).await, Some(1234));
    assert_eq!(prober.content_length(&format!("{}/missing", server.uri())).await, None);
}

#[tokio::test]
async fn annotate_links_sets_status_metadata() {
    let server = server().await;
    let prober = prober(500);
    let raw = vec![
        RawLink::new(format!("{}/ok", server.uri())),
        RawLink::new(format!("{}/missing", server.uri())),
        RawLink::new("mailto:someone@site.com"),
    ];
    let mut links = categorize_links(&raw, Some("127.0.0.1"), &LinkRules::default());
    prober.annotate_links(&mut links).await;

    let status = |href: &str| links.get(href).and_then(|r| r.meta("status")).map(str::to_string);
    assert_eq!(status(&raw[0].href).as_deref(), Some("live (200)"));
    assert_eq!(status(&raw[1].href).as_deref(), Some("broken (404)"));
    assert_eq!(status("mailto:someone@site.com"), None);
}

#[tokio::test]
async fn find_with_status_and_image_sizes() {
    let server = server().await;
    let prober = prober(1000);
    let html = r#"<body><a href="/ok">ok</a><img src="/photo.png"></body>"#;
    let page = Page::from_html(html, Some(format!("{}/", server.uri()).as_str())).unwrap_or_else(|e| panic!("{e}"));

    let links = LinkFinder::new(&Options::default()).find_with_status(&page, &prober).await;
    assert_eq!(links.records()[0].meta("status"), Some("live (200)"));

    let mut images = ImageFinder::new(&Options::default()).find(&page);
    prober.annotate_image_sizes(&mut images).await;
    assert_eq!(images.records()[0].meta("bytes"), Some("1234"));
}

#[tokio::test]
async fn download_resource_writes_body() {
    let server = server().await;
    let prober = prober(1000);
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));

    let saved = download_resource(&prober, &format!("{}/photo.png", server.uri()), dir.path())
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(saved.file_name().and_then(|n| n.to_str()), Some("photo.png"));
    assert_eq!(std::fs::read(&saved).unwrap_or_default(), b"PNGDATA");

    let missing = download_resource(&prober, &format!("{}/gone.png", server.uri()), dir.path()).await;
    assert!(missing.is_err());
}
