//! Character encoding detection for raw page bytes.
//!
//! Pages saved from a browser keep their declared charset; it is read from
//! `<meta charset>` or the `http-equiv` Content-Type declaration in the
//! first kilobyte and the bytes are transcoded to UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// How far into the document charset declarations are searched.
const SNIFF_LEN: usize = 1024;

#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex")
});

/// Detect the encoding declared by the document; UTF-8 when undeclared.
///
/// A UTF-8 or UTF-16 byte-order mark takes precedence over declarations.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((bom_encoding, _)) = Encoding::for_bom(html) {
        return bom_encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);

    // `charset=` inside an http-equiv content attribute is matched by the same pattern
    META_CHARSET
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Transcode page bytes to UTF-8, replacing invalid sequences with U+FFFD.
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    let encoding = detect_encoding(html);
    let (text, _, had_errors) = encoding.decode(html);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "replaced malformed byte sequences");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head></html>"#;
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn test_detect_http_equiv() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#;
        assert_eq!(detect_encoding(html).name(), "Shift_JIS");
    }

    #[test]
    fn test_default_utf8() {
        assert_eq!(detect_encoding(b"<html><body>x</body></html>"), UTF_8);
    }

    #[test]
    fn test_transcode_latin1() {
        let html = b"<meta charset=\"windows-1252\"><p>Caf\xE9</p>";
        assert!(transcode_to_utf8(html).contains("Caf\u{e9}"));
    }
}
