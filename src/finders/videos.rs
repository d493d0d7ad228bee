//! Video finder and preview selection.
//!
//! Videos are classified by provenance: native `<video>` elements, iframes of
//! known platforms (with the platform ID pulled from the URL), generic player
//! iframes, `<embed>`/`<object>` pointing at video files, Instagram embed
//! blockquotes, and CSS backgrounds referencing a video file.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{for_each_batch, Finder, FinderKind};
use crate::dom::{self, Selection};
use crate::options::Options;
use crate::page::Page;
use crate::patterns::{GENERIC_PLAYER_URL, INSTAGRAM_ID, VIDEO_EXTENSIONS, VIMEO_ID, YOUTUBE_ID};
use crate::record::{Categorized, Category, DedupSet, ResourceRecord};
use crate::style;
use crate::text::escape_html;
use crate::url_utils;

/// Thumbnail used when neither a poster nor a platform thumbnail exists.
pub const PLACEHOLDER_THUMBNAIL: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='160' height='90'><rect width='160' height='90' fill='%23222'/><path d='M68 30v30l26-15z' fill='%23fff'/></svg>";

/// Hosts whose embeds cannot be previewed inline.
const OPEN_IN_TAB_HOSTS: &[&str] = &["instagram.com", "facebook.com", "twitter.com", "x.com", "tiktok.com"];

/// Video categories, by provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCategory {
    /// Native `<video>` and direct video files.
    Html5,
    /// YouTube iframes.
    Youtube,
    /// Vimeo iframes.
    Vimeo,
    /// Instagram posts and reels.
    Instagram,
    /// Other player iframes.
    Embed,
    /// Video files referenced from CSS.
    Background,
}

impl Category for VideoCategory {
    const ALL: &'static [Self] = &[
        VideoCategory::Html5,
        VideoCategory::Youtube,
        VideoCategory::Vimeo,
        VideoCategory::Instagram,
        VideoCategory::Embed,
        VideoCategory::Background,
    ];

    fn label(self) -> &'static str {
        match self {
            VideoCategory::Html5 => "html5",
            VideoCategory::Youtube => "youtube",
            VideoCategory::Vimeo => "vimeo",
            VideoCategory::Instagram => "instagram",
            VideoCategory::Embed => "embed",
            VideoCategory::Background => "background",
        }
    }
}

/// Categorized video scan result.
pub type CategorizedVideos = Categorized<VideoCategory>;

/// One discovered video.
pub type VideoRecord = ResourceRecord<VideoCategory>;

/// Recognise a known platform from a URL and extract its video ID.
#[must_use]
pub fn platform_of(url: &str) -> Option<(VideoCategory, String)> {
    if let Some(id) = first_capture(&YOUTUBE_ID, url) {
        return Some((VideoCategory::Youtube, id));
    }
    if let Some(id) = first_capture(&VIMEO_ID, url) {
        return Some((VideoCategory::Vimeo, id));
    }
    first_capture(&INSTAGRAM_ID, url).map(|id| (VideoCategory::Instagram, id))
}

fn first_capture(re: &Regex, url: &str) -> Option<String> {
    re.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn is_video_file(url: &str) -> bool {
    url_utils::extension(url).is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

/// Store `thumbnail` and `thumbnail_source`, taking the first available of
/// poster, platform thumbnail and placeholder.
fn attach_thumbnail(record: &mut VideoRecord, poster: Option<String>) {
    let (thumbnail, source) = if let Some(poster) = poster {
        (poster, "poster")
    } else if let (VideoCategory::Youtube, Some(id)) = (record.kind, record.meta("platform_id")) {
        (format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"), "platform")
    } else {
        (PLACEHOLDER_THUMBNAIL.to_string(), "placeholder")
    };
    record.set_meta("thumbnail", thumbnail);
    record.set_meta("thumbnail_source", source);
}

/// Finds the videos of a page.
#[derive(Debug, Clone, Default)]
pub struct VideoFinder {
    options: Options,
}

impl VideoFinder {
    /// Finder configured from `options`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            options: options.clone(),
        }
    }

    fn visible(&self, page: &Page, sel: &Selection) -> bool {
        !self.options.check_visibility || page.is_visible(sel)
    }

    fn scan_video_elements(&self, page: &Page, seen: &mut DedupSet, out: &mut CategorizedVideos) {
        for video in dom::select_each(&page.document().select("html"), "video") {
            if !self.visible(page, &video) {
                continue;
            }
            let sources: Vec<String> = dom::select_each(&video, "source")
                .iter()
                .filter_map(|s| dom::attr(s, "src"))
                .filter_map(|s| page.resolve(&s))
                .collect();
            let own_src = dom::attr(&video, "src").and_then(|s| page.resolve(&s));

            let Some(url) = own_src.or_else(|| sources.first().cloned()) else {
                trace!("video element without a source");
                continue;
            };
            if !seen.register(&url) {
                continue;
            }

            let mut record = ResourceRecord::new(url.clone(), VideoCategory::Html5)
                .with_dimensions(dom::numeric_attr(&video, "width"), dom::numeric_attr(&video, "height"))
                .with_meta("element", "video")
                .with_meta("title", dom::attr_or_empty(&video, "title"));
            for flag in ["controls", "autoplay", "loop", "muted"] {
                if dom::has_attribute(&video, flag) {
                    record.set_meta(flag, "true");
                }
            }
            record.variants = sources.into_iter().filter(|s| *s != url).collect();
            let poster = dom::attr(&video, "poster").and_then(|p| page.resolve(&p));
            attach_thumbnail(&mut record, poster);
            out.push(record);
        }
    }

    fn scan_iframes(&self, page: &Page, seen: &mut DedupSet, out: &mut CategorizedVideos) {
        let frames = dom::select_each(&page.document().select("html"), "iframe");
        for_each_batch(&frames, self.options.effective_batch_size(), "videos:iframe", |frame| {
            if !self.visible(page, frame) {
                return;
            }
            let Some(url) = dom::attr(frame, "src")
                .or_else(|| dom::attr(frame, "data-src"))
                .and_then(|s| page.resolve(&s))
            else {
                return;
            };

            let (kind, platform_id) = match platform_of(&url) {
                Some((kind, id)) => (kind, Some(id)),
                None if GENERIC_PLAYER_URL.is_match(&url) => (VideoCategory::Embed, None),
                None => return,
            };
            if !seen.register(&url) {
                return;
            }

            let mut record = ResourceRecord::new(url, kind)
                .with_dimensions(dom::numeric_attr(frame, "width"), dom::numeric_attr(frame, "height"))
                .with_meta("element", "iframe")
                .with_meta("title", dom::attr_or_empty(frame, "title"));
            if let Some(id) = platform_id {
                record.set_meta("platform_id", id);
            }
            attach_thumbnail(&mut record, None);
            out.push(record);
        });
    }

    fn scan_embedded_files(&self, page: &Page, seen: &mut DedupSet, out: &mut CategorizedVideos) {
        let html = page.document().select("html");
        for (tag, attr) in [("embed", "src"), ("object", "data")] {
            for el in dom::select_each(&html, tag) {
                if !self.visible(page, &el) {
                    continue;
                }
                let Some(url) = dom::attr(&el, attr).and_then(|s| page.resolve(&s)) else {
                    continue;
                };
                let is_video_type = dom::attr(&el, "type").is_some_and(|t| t.starts_with("video/"));
                if !(is_video_file(&url) || is_video_type) || !seen.register(&url) {
                    continue;
                }
                let mut record = ResourceRecord::new(url, VideoCategory::Html5)
                    .with_dimensions(dom::numeric_attr(&el, "width"), dom::numeric_attr(&el, "height"))
                    .with_meta("element", tag);
                attach_thumbnail(&mut record, None);
                out.push(record);
            }
        }
    }

    fn scan_instagram_blockquotes(&self, page: &Page, seen: &mut DedupSet, out: &mut CategorizedVideos) {
        for quote in dom::select_each(&page.document().select("html"), "blockquote.instagram-media") {
            let Some(url) = dom::attr(&quote, "data-instgrm-permalink").and_then(|s| page.resolve(&s)) else {
                continue;
            };
            let Some((VideoCategory::Instagram, id)) = platform_of(&url) else {
                continue;
            };
            if !seen.register(&url) {
                continue;
            }
            let mut record = ResourceRecord::new(url, VideoCategory::Instagram)
                .with_meta("element", "blockquote")
                .with_meta("platform_id", id);
            attach_thumbnail(&mut record, None);
            out.push(record);
        }
    }

    fn scan_css_backgrounds(&self, page: &Page, seen: &mut DedupSet, out: &mut CategorizedVideos) {
        let html = page.document().select("html");
        let mut found: Vec<(String, &'static str)> = Vec::new();

        let styled = dom::select_each(&html, "[style]");
        for_each_batch(&styled, self.options.effective_batch_size(), "videos:inline-style", |el| {
            if self.visible(page, el) {
                let decls = style::parse_declarations(&dom::attr_or_empty(el, "style"));
                found.extend(style::image_urls(&decls).into_iter().map(|u| (u, "inline-style")));
            }
        });
        for sheet in dom::select_each(&html, "style") {
            for rule in style::parse_stylesheet(&sheet.text()) {
                found.extend(style::image_urls(&rule.declarations).into_iter().map(|u| (u, "stylesheet")));
            }
        }

        for (raw, origin) in found {
            let Some(url) = page.resolve(&raw) else {
                continue;
            };
            if !is_video_file(&url) || !seen.register(&url) {
                continue;
            }
            let mut record = ResourceRecord::new(url, VideoCategory::Background).with_meta("source", origin);
            attach_thumbnail(&mut record, None);
            out.push(record);
        }
    }
}

impl Finder for VideoFinder {
    type Output = CategorizedVideos;
    const KIND: FinderKind = FinderKind::Videos;

    fn find(&self, page: &Page) -> CategorizedVideos {
        let mut seen = DedupSet::new();
        let mut out = CategorizedVideos::new();

        self.scan_video_elements(page, &mut seen, &mut out);
        self.scan_iframes(page, &mut seen, &mut out);
        self.scan_embedded_files(page, &mut seen, &mut out);
        self.scan_instagram_blockquotes(page, &mut seen, &mut out);
        self.scan_css_backgrounds(page, &mut seen, &mut out);

        debug!(found = out.len(), counts = ?out.counts(), "video scan complete");
        out
    }
}

/// How a video can be played back inside the inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Preview {
    /// Mount a `<video>` element.
    Native {
        /// Primary source.
        src: String,
        /// Additional `<source>` URLs.
        sources: Vec<String>,
        /// Poster image, if any.
        poster: Option<String>,
    },
    /// Mount a parameterized player iframe.
    Embed {
        /// Player URL.
        src: String,
    },
    /// Inline playback is not possible; offer a link.
    OpenInNewTab {
        /// Page to open.
        url: String,
    },
}

/// Choose the preview mode for a discovered video.
#[must_use]
pub fn preview(record: &VideoRecord) -> Preview {
    let id = record.meta("platform_id");
    match (record.kind, id) {
        (VideoCategory::Html5 | VideoCategory::Background, _) => Preview::Native {
            src: record.source_url.clone(),
            sources: record.variants.clone(),
            poster: record
                .meta("thumbnail_source")
                .filter(|s| *s == "poster")
                .and(record.meta("thumbnail"))
                .map(str::to_string),
        },
        (VideoCategory::Youtube, Some(id)) => Preview::Embed {
            src: format!("https://www.youtube-nocookie.com/embed/{id}?autoplay=1&rel=0"),
        },
        (VideoCategory::Vimeo, Some(id)) => Preview::Embed {
            src: format!("https://player.vimeo.com/video/{id}?autoplay=1"),
        },
        (VideoCategory::Embed, _) if !is_open_in_tab_host(&record.source_url) => Preview::Embed {
            src: record.source_url.clone(),
        },
        _ => Preview::OpenInNewTab {
            url: record.source_url.clone(),
        },
    }
}

fn is_open_in_tab_host(url: &str) -> bool {
    url_utils::hostname(url).is_some_and(|h| OPEN_IN_TAB_HOSTS.iter().any(|d| url_utils::host_matches(&h, d)))
}

impl Preview {
    /// Player markup for the preview pane.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Preview::Native { src, sources, poster } => {
                let poster_attr = poster
                    .as_ref()
                    .map(|p| format!(r#" poster="{}""#, escape_html(p)))
                    .unwrap_or_default();
                let extra: String = sources
                    .iter()
                    .map(|s| format!(r#"<source src="{}">"#, escape_html(s)))
                    .collect();
                format!(
                    r#"<video class="pi-preview" controls preload="metadata" src="{}"{poster_attr}>{extra}</video>"#,
                    escape_html(src)
                )
            }
            Preview::Embed { src } => format!(
                r#"<iframe class="pi-preview" src="{}" allow="autoplay; fullscreen; picture-in-picture" allowfullscreen></iframe>"#,
                escape_html(src)
            ),
            Preview::OpenInNewTab { url } => format!(
                r#"<a class="pi-preview pi-open-tab" href="{}" target="_blank" rel="noopener noreferrer">Open in new tab</a>"#,
                escape_html(url)
            ),
        }
    }
}
