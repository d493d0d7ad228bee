//! Compiled regex patterns and fixed lists used by the finders.
//!
//! All patterns are compiled once at first use using `LazyLock`.
//! Lists are plain constants so `Options` can seed its defaults from them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Link Classification Lists
// =============================================================================

/// Substrings marking a link as an ad or tracker.
pub const UNWANTED_LINK_PATTERNS: &[&str] = &[
    "doubleclick.net",
    "googleadservices",
    "googlesyndication",
    "adservice",
    "adserver",
    "adclick",
    "/ads/",
    "popads",
    "taboola",
    "outbrain",
    "javascript:",
];

/// Social network hostnames. Subdomains match too.
///
/// `x.com` is left out: it is too short to tell apart from unrelated hosts
/// by substring checks in user-provided lists.
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "fb.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "pinterest.com",
    "reddit.com",
    "tumblr.com",
    "snapchat.com",
    "whatsapp.com",
    "telegram.org",
    "t.me",
    "discord.com",
    "discord.gg",
    "threads.net",
    "mastodon.social",
];

/// Extensions classified as downloadable documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "txt",
    "csv", "epub", "zip", "rar", "7z", "tar", "gz",
];

/// Extensions classified as media (audio, video and image files).
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mov", "avi", "mkv", "m4v", "ogv", "mp3", "wav", "ogg", "flac", "m4a",
    "aac", "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "avif",
];

/// Extensions of video files, used for CSS and `<embed>` video detection.
pub const VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "webm", "ogg", "ogv", "mov", "m4v", "avi", "mkv", "m3u8", "mpd"];

// =============================================================================
// Image Sources
// =============================================================================

/// Attributes carrying a deferred image URL.
pub const LAZY_IMAGE_ATTRIBUTES: &[&str] = &[
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-lazy",
    "data-url",
    "data-srcset",
    "data-lazy-srcset",
];

/// CSS properties that may carry an image `url(...)`.
pub const IMAGE_CSS_PROPERTIES: &[&str] = &[
    "background",
    "background-image",
    "border-image",
    "border-image-source",
    "list-style",
    "list-style-image",
    "mask",
    "mask-image",
    "-webkit-mask-image",
    "content",
    "cursor",
];

/// Matches `url(...)` with optional single or double quotes.
pub static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#).expect("CSS_URL regex")
});

/// Matches a `::before`/`::after` pseudo-element in a selector.
pub static CSS_PSEUDO_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)::?(before|after)\b").expect("CSS_PSEUDO_ELEMENT regex")
});

/// Matches CSS comments.
pub static CSS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("CSS_COMMENT regex"));

// =============================================================================
// Video Platforms
// =============================================================================

/// Extracts a YouTube video ID from embed, watch and short URLs.
pub static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:youtube(?:-nocookie)?\.com/(?:embed|v|shorts)/|youtu\.be/|youtube\.com/watch\?(?:[^#]*&)?v=)([A-Za-z0-9_-]{6,})",
    )
    .expect("YOUTUBE_ID regex")
});

/// Extracts a Vimeo video ID.
pub static VIMEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:player\.vimeo\.com/video/|vimeo\.com/)(\d+)").expect("VIMEO_ID regex")
});

/// Extracts an Instagram post/reel ID.
pub static INSTAGRAM_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)instagram\.com/(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)")
        .expect("INSTAGRAM_ID regex")
});

/// Generic iframe URLs that likely host a player.
pub static GENERIC_PLAYER_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(video|player|embed)").expect("GENERIC_PLAYER_URL regex"));

// =============================================================================
// Navigation Detection
// =============================================================================

/// Matches class/id names indicating navigation containers.
///
/// "nav" only matches as a whole token or a token prefix/suffix so layout
/// names such as `in-page-nav-container` are not treated as navigation.
pub static NAVIGATION_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^nav$|^nav[-_]|[-_]nav$|navbar|navigation|top[-_]?nav|main[-_]?menu|site[-_]?nav|\bmenu\b|site[-_]?footer|site[-_]?header|breadcrumbs?)",
    )
    .expect("NAVIGATION_CLASS regex")
});

// =============================================================================
// Table Detection
// =============================================================================

/// Class-name substrings marking div-based tables.
pub const TABLE_CLASS_HINTS: &[&str] = &[
    "datagrid",
    "data-grid",
    "datatable",
    "data-table",
    "spreadsheet",
    "tabular",
    "table",
    "grid",
];

/// Class tokens naming a part of a table rather than the table itself.
pub static TABLE_PART_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(table|grid)[-_]?(row|rows|cell|cells|col|cols|column|columns|item|header|head|body|footer|container|wrapper|responsive)\b",
    )
    .expect("TABLE_PART_CLASS regex")
});

/// Class tokens hinting at a header row.
pub static HEADER_ROW_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[-_\s])(header|heading|head|thead|columns?-?titles?)([-_\s]|$)")
        .expect("HEADER_ROW_CLASS regex")
});

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_url_handles_quotes() {
        let caps = CSS_URL.captures(r#"background: url("a.png")"#);
        assert!(caps.is_some_and(|c| c.get(1).is_some_and(|m| m.as_str() == "a.png")));

        let caps = CSS_URL.captures("background: url('b.png')");
        assert!(caps.is_some_and(|c| c.get(2).is_some_and(|m| m.as_str() == "b.png")));

        let caps = CSS_URL.captures("background: url( c.png )");
        assert!(caps.is_some_and(|c| c.get(3).is_some_and(|m| m.as_str() == "c.png")));
    }

    #[test]
    fn youtube_id_variants() {
        for url in [
            "https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
        ] {
            let id = YOUTUBE_ID.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str());
            assert_eq!(id, Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn vimeo_and_instagram_ids() {
        let vimeo = VIMEO_ID.captures("https://player.vimeo.com/video/76979871?h=8272103f6e");
        assert_eq!(vimeo.and_then(|c| c.get(1)).map(|m| m.as_str()), Some("76979871"));

        let insta = INSTAGRAM_ID.captures("https://www.instagram.com/reel/C1a2B3c4/embed");
        assert_eq!(insta.and_then(|c| c.get(1)).map(|m| m.as_str()), Some("C1a2B3c4"));
    }

    #[test]
    fn navigation_class_matches_nav_elements() {
        assert!(NAVIGATION_CLASS.is_match("main-nav"));
        assert!(NAVIGATION_CLASS.is_match("sidebar-menu"));
        assert!(NAVIGATION_CLASS.is_match("site-footer"));
        assert!(!NAVIGATION_CLASS.is_match("article-content"));
        assert!(!NAVIGATION_CLASS.is_match("contextmenu"));
    }

    #[test]
    fn table_part_class_excludes_rows_and_cells() {
        assert!(TABLE_PART_CLASS.is_match("table-row"));
        assert!(TABLE_PART_CLASS.is_match("grid_cell"));
        assert!(TABLE_PART_CLASS.is_match("table-responsive"));
        assert!(!TABLE_PART_CLASS.is_match("data-table"));
        assert!(!TABLE_PART_CLASS.is_match("price-grid"));
    }
}
