use page_inspector::encoding::{detect_encoding, transcode_to_utf8};
use page_inspector::finders::{Finder, LinkFinder};
use page_inspector::{Options, Page};

fn link_text(html: &[u8]) -> String {
    let page = Page::from_bytes(html, Some("https://site.com/")).unwrap_or_else(|e| panic!("{e}"));
    let links = LinkFinder::new(&Options::default()).find(&page);
    let record = links.get("https://site.com/a").unwrap_or_else(|| panic!("link missing"));
    record.meta("text").unwrap_or_default().to_string()
}

#[test]
fn utf8_content_handled_correctly() {
    let html = "<html><head><meta charset=\"utf-8\"></head><body><a href=\"/a\">é ñ ü 中文</a></body></html>";
    assert_eq!(link_text(html.as_bytes()), "é ñ ü 中文");
}

#[test]
fn iso88591_converted_to_utf8() {
    let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><a href=\"/a\">Caf\xE9</a></body></html>";
    assert_eq!(link_text(html), "Café");
}

#[test]
fn shift_jis_from_http_equiv() {
    let mut html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=Shift_JIS\"><a href=\"/a\">".to_vec();
    html.extend_from_slice(&[0x93, 0xFA, 0x96, 0x7B]);
    html.extend_from_slice(b"</a>");

    assert_eq!(detect_encoding(&html).name(), "Shift_JIS");
    assert_eq!(link_text(&html), "日本");
}

#[test]
fn undeclared_charset_defaults_to_utf8() {
    let html = "<p>naïve</p>";
    assert_eq!(detect_encoding(html.as_bytes()).name(), "UTF-8");
    assert!(transcode_to_utf8(html.as_bytes()).contains("naïve"));
}

#[test]
fn malformed_bytes_replaced_not_rejected() {
    let html = b"<meta charset=\"utf-8\"><p>ok \xFF\xFE done</p>";
    let text = transcode_to_utf8(html);
    assert!(text.contains("ok"));
    assert!(text.contains('\u{FFFD}'));
}
