//! Image finder.
//!
//! Scans five sources with one shared `DedupSet`, so an image found twice
//! is kept once and the first source decides its category:
//!
//! 1. `<img>` (with `<picture>` sources and lazy-load attributes) and
//!    `<input type=image>`
//! 2. CSS images: inline `style` attributes, then `<style>` rules
//!    (pseudo-element rules become `css_generated`)
//! 3. inline `<svg>` and SVG referenced by `<use>`, `<image>`, `<object>`,
//!    `<embed>`
//! 4. `<canvas>` placeholders (pixel data is not part of a snapshot)
//! 5. nested documents: `iframe[srcdoc]` and declarative shadow roots

use base64::Engine;
use dom_query::Selection;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{for_each_batch, Finder, FinderKind};
use crate::dom;
use crate::options::Options;
use crate::page::Page;
use crate::patterns::{LAZY_IMAGE_ATTRIBUTES, VIDEO_EXTENSIONS};
use crate::record::{Categorized, Category, DedupSet, ResourceRecord};
use crate::style;
use crate::text;
use crate::url_utils;

/// Image categories, by how the image was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    /// `<img>` with a regular `src`/`srcset`.
    Standard,
    /// CSS `background-image` and other image-bearing properties.
    Background,
    /// Inline or referenced SVG.
    Svg,
    /// `<canvas>` elements.
    Canvas,
    /// `<img>` whose real source sits in a lazy-load attribute.
    Lazy,
    /// Images from `::before`/`::after` rules.
    CssGenerated,
    /// Anything else (`<input type=image>`, non-SVG `<object>`).
    Other,
}

impl Category for ImageCategory {
    const ALL: &'static [Self] = &[
        ImageCategory::Standard,
        ImageCategory::Background,
        ImageCategory::Svg,
        ImageCategory::Canvas,
        ImageCategory::Lazy,
        ImageCategory::CssGenerated,
        ImageCategory::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            ImageCategory::Standard => "standard",
            ImageCategory::Background => "background",
            ImageCategory::Svg => "svg",
            ImageCategory::Canvas => "canvas",
            ImageCategory::Lazy => "lazy",
            ImageCategory::CssGenerated => "css_generated",
            ImageCategory::Other => "other",
        }
    }
}

/// Categorized image scan result.
pub type CategorizedImages = Categorized<ImageCategory>;

/// Finds the images of a page.
#[derive(Debug, Clone, Default)]
pub struct ImageFinder {
    options: Options,
}

impl ImageFinder {
    /// Finder configured from `options`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            options: options.clone(),
        }
    }
}

impl Finder for ImageFinder {
    type Output = CategorizedImages;
    const KIND: FinderKind = FinderKind::Images;

    fn find(&self, page: &Page) -> CategorizedImages {
        let mut scan = ImageScan {
            options: &self.options,
            seen: DedupSet::new(),
            out: CategorizedImages::new(),
            canvas_index: 0,
        };
        scan.scan_page(page);
        debug!(found = scan.out.len(), counts = ?scan.out.counts(), "image scan complete");
        scan.out
    }
}

/// Whether `url` is an SVG by extension or data-URL media type.
fn is_svg_url(url: &str) -> bool {
    url.to_ascii_lowercase().starts_with("data:image/svg") || url_utils::extension(url).is_some_and(|e| e == "svg")
}

fn is_video_url(url: &str) -> bool {
    url_utils::extension(url).is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

struct ImageScan<'o> {
    options: &'o Options,
    seen: DedupSet,
    out: CategorizedImages,
    canvas_index: usize,
}

impl ImageScan<'_> {
    fn scan_page(&mut self, page: &Page) {
        self.scan_img_elements(page);
        self.scan_image_inputs(page);
        self.scan_inline_styles(page);
        self.scan_stylesheets(page);
        self.scan_inline_svg(page);
        self.scan_referenced_svg(page);
        self.scan_canvas(page);
        self.scan_nested(page);
    }

    fn visible(&self, page: &Page, sel: &Selection) -> bool {
        !self.options.check_visibility || page.is_visible(sel)
    }

    /// Apply the data-URL filter and the shared dedup set.
    fn admit(&mut self, url: &str) -> bool {
        if url.starts_with("data:") && url.len() < self.options.min_data_url_len && !is_svg_url(url) {
            trace!(url, "skipping tiny data URL");
            return false;
        }
        self.seen.register(url)
    }

    fn is_tracking_pixel(&self, sel: &Selection) -> bool {
        if !self.options.skip_tracking_pixels {
            return false;
        }
        let from_attrs = dom::numeric_attr(sel, "width") == Some(1) && dom::numeric_attr(sel, "height") == Some(1);
        let from_style = dom::attr(sel, "style").is_some_and(|s| {
            let decls = style::parse_declarations(&s);
            let is_one = |p: &str| style::declaration(&decls, p).is_some_and(|v| v.trim() == "1px");
            is_one("width") && is_one("height")
        });
        from_attrs || from_style
    }

    fn scan_img_elements(&mut self, page: &Page) {
        let images = dom::select_each(&page.document().select("html"), "img");
        let batch = self.options.effective_batch_size();
        for_each_batch(&images, batch, "images:img", |img| self.scan_img(page, img));
    }

    fn scan_img(&mut self, page: &Page, img: &Selection) {
        if !self.visible(page, img) || self.is_tracking_pixel(img) {
            return;
        }

        let src = dom::attr(img, "src");
        let srcset_best = dom::attr(img, "srcset").and_then(|s| url_utils::best_srcset_candidate(&s));
        let lazy = LAZY_IMAGE_ATTRIBUTES.iter().find_map(|attr| {
            let value = dom::attr(img, attr)?;
            if attr.ends_with("srcset") {
                url_utils::best_srcset_candidate(&value)
            } else {
                Some(value)
            }
        });

        let src_is_placeholder = src
            .as_deref()
            .is_none_or(|s| s.starts_with("data:") && s.len() < self.options.min_data_url_len);

        let (raw, mut kind) = match (lazy, src, srcset_best) {
            (Some(lazy), _, _) if src_is_placeholder => (lazy, ImageCategory::Lazy),
            (_, Some(src), _) if !src_is_placeholder => (src, ImageCategory::Standard),
            (_, _, Some(best)) => (best, ImageCategory::Standard),
            (_, Some(src), None) => (src, ImageCategory::Standard),
            _ => return,
        };

        let Some(url) = page.resolve(&raw) else {
            return;
        };
        if kind == ImageCategory::Standard && is_svg_url(&url) {
            kind = ImageCategory::Svg;
        }
        if !self.admit(&url) {
            return;
        }

        let mut variants: Vec<String> = Vec::new();
        let mut candidates: Vec<String> = Vec::new();
        if let Some(srcset) = dom::attr(img, "srcset") {
            candidates.extend(url_utils::parse_srcset(&srcset).into_iter().map(|c| c.url));
        }
        let parent = img.parent();
        if dom::is_tag(&parent, "picture") {
            for source in dom::select_each(&parent, "source") {
                if let Some(srcset) = dom::attr(&source, "srcset") {
                    candidates.extend(url_utils::parse_srcset(&srcset).into_iter().map(|c| c.url));
                }
            }
        }
        for candidate in candidates {
            if let Some(resolved) = page.resolve(&candidate) {
                // Variants belong to this record; later sources must not re-add them
                if self.seen.register(&resolved) {
                    variants.push(resolved);
                }
            }
        }

        let mut record = ResourceRecord::new(url, kind)
            .with_dimensions(dom::numeric_attr(img, "width"), dom::numeric_attr(img, "height"))
            .with_meta("element", "img")
            .with_meta("alt", dom::attr_or_empty(img, "alt"))
            .with_meta("title", dom::attr_or_empty(img, "title"))
            .with_meta("loading", dom::attr_or_empty(img, "loading"));
        record.variants = variants;
        self.out.push(record);
    }

    fn scan_image_inputs(&mut self, page: &Page) {
        for input in dom::select_each(&page.document().select("html"), "input") {
            let is_image = dom::attr(&input, "type").is_some_and(|t| t.eq_ignore_ascii_case("image"));
            if !is_image || !self.visible(page, &input) {
                continue;
            }
            let Some(url) = dom::attr(&input, "src").and_then(|s| page.resolve(&s)) else {
                continue;
            };
            if self.admit(&url) {
                self.out.push(
                    ResourceRecord::new(url, ImageCategory::Other)
                        .with_meta("element", "input")
                        .with_meta("alt", dom::attr_or_empty(&input, "alt")),
                );
            }
        }
    }

    fn scan_inline_styles(&mut self, page: &Page) {
        let styled = dom::select_each(&page.document().select("html"), "[style]");
        let batch = self.options.effective_batch_size();
        for_each_batch(&styled, batch, "images:inline-style", |el| {
            if !self.visible(page, el) {
                return;
            }
            let decls = style::parse_declarations(&dom::attr_or_empty(el, "style"));
            for raw in style::image_urls(&decls) {
                let Some(url) = page.resolve(&raw) else {
                    continue;
                };
                if is_video_url(&url) || !self.admit(&url) {
                    continue;
                }
                let tag = dom::tag_name(el).unwrap_or_default();
                self.out.push(
                    ResourceRecord::new(url, ImageCategory::Background)
                        .with_meta("element", tag)
                        .with_meta("source", "inline-style"),
                );
            }
        });
    }

    /// Whether any element a rule applies to is visible. Selectors the
    /// matcher cannot evaluate count as visible.
    fn rule_applies_visibly(&self, page: &Page, rule: &style::CssRule) -> bool {
        if !self.options.check_visibility {
            return true;
        }
        let selector = rule.element_selector();
        if selector.is_empty() {
            return true;
        }
        match page.document().try_select(&selector) {
            Some(matched) => matched
                .nodes()
                .iter()
                .any(|n| page.is_visible(&Selection::from(*n))),
            None => true,
        }
    }

    fn scan_stylesheets(&mut self, page: &Page) {
        for sheet in dom::select_each(&page.document().select("html"), "style") {
            for rule in style::parse_stylesheet(&sheet.text()) {
                let urls = style::image_urls(&rule.declarations);
                if urls.is_empty() || !self.rule_applies_visibly(page, &rule) {
                    continue;
                }
                let kind = if rule.targets_pseudo_element() {
                    ImageCategory::CssGenerated
                } else {
                    ImageCategory::Background
                };
                for raw in urls {
                    let Some(url) = page.resolve(&raw) else {
                        continue;
                    };
                    if is_video_url(&url) || !self.admit(&url) {
                        continue;
                    }
                    self.out.push(
                        ResourceRecord::new(url, kind)
                            .with_meta("selector", text::truncate(&rule.selector, 120))
                            .with_meta("source", "stylesheet"),
                    );
                }
            }
        }
    }

    fn scan_inline_svg(&mut self, page: &Page) {
        for svg in dom::select_each(&page.document().select("html"), "svg") {
            if dom::has_ancestor_tag(&svg, &["svg"]) || !self.visible(page, &svg) {
                continue;
            }
            let markup = dom::outer_html(&svg);
            let url = format!(
                "data:image/svg+xml;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(markup.as_bytes())
            );
            if !self.admit(&url) {
                continue;
            }
            let (width, height) = svg_size(&svg);
            let title = svg.select("title").first().text().trim().to_string();
            self.out.push(
                ResourceRecord::new(url, ImageCategory::Svg)
                    .with_dimensions(width, height)
                    .with_meta("element", "svg")
                    .with_meta("source", "inline")
                    .with_meta("title", title),
            );
        }
    }

    fn scan_referenced_svg(&mut self, page: &Page) {
        let html = page.document().select("html");
        let references = [("use", "href"), ("image", "href"), ("object", "data"), ("embed", "src")];

        for (tag, attr) in references {
            for el in dom::select_each(&html, tag) {
                let raw = dom::attr(&el, attr).or_else(|| dom::attr(&el, &format!("xlink:{attr}")));
                let Some(raw) = raw else {
                    continue;
                };
                // Same-document sprite references point back at inline SVG
                if raw.starts_with('#') || !self.visible(page, &el) {
                    continue;
                }
                let Some(url) = page.resolve(&raw) else {
                    continue;
                };
                let kind = if is_svg_url(&url) {
                    ImageCategory::Svg
                } else if tag == "image" || dom::attr(&el, "type").is_some_and(|t| t.starts_with("image/")) {
                    ImageCategory::Other
                } else {
                    continue;
                };
                if self.admit(&url) {
                    self.out.push(
                        ResourceRecord::new(url, kind)
                            .with_dimensions(dom::numeric_attr(&el, "width"), dom::numeric_attr(&el, "height"))
                            .with_meta("element", tag)
                            .with_meta("source", "reference"),
                    );
                }
            }
        }
    }

    fn scan_canvas(&mut self, page: &Page) {
        for canvas in dom::select_each(&page.document().select("html"), "canvas") {
            if !self.visible(page, &canvas) {
                continue;
            }
            self.canvas_index += 1;
            let key = match dom::attr(&canvas, "id") {
                Some(id) => format!("canvas:{}:id:{id}", page.depth()),
                None => format!("canvas:{}:{}", page.depth(), self.canvas_index),
            };
            if !self.seen.register_exact(&key) {
                continue;
            }
            self.out.push(
                ResourceRecord::new(key, ImageCategory::Canvas)
                    .with_dimensions(dom::numeric_attr(&canvas, "width"), dom::numeric_attr(&canvas, "height"))
                    .with_meta("element", "canvas")
                    .with_meta("status", "protected")
                    .with_meta("reason", "pixel data is not available in a page snapshot"),
            );
        }
    }

    fn scan_nested(&mut self, page: &Page) {
        if page.depth() >= self.options.max_frame_depth {
            debug!(depth = page.depth(), "frame depth limit reached");
            return;
        }

        let html = page.document().select("html");
        let mut nested_sources: Vec<(&'static str, String)> = Vec::new();

        for frame in dom::select_each(&html, "iframe") {
            if let Some(srcdoc) = dom::attr(&frame, "srcdoc") {
                if self.visible(page, &frame) {
                    nested_sources.push(("iframe", srcdoc));
                }
            }
        }
        for template in dom::select_each(&html, "template") {
            let is_shadow_root =
                dom::has_attribute(&template, "shadowrootmode") || dom::has_attribute(&template, "shadowroot");
            if is_shadow_root {
                nested_sources.push(("shadow-root", dom::inner_html(&template).to_string()));
            }
        }

        for (origin, html) in nested_sources {
            if html.trim().is_empty() {
                continue;
            }
            let nested = page.nested(&html);
            let before = self.out.len();
            self.scan_page(&nested);
            for record in &mut self.out.records_mut()[before..] {
                record.metadata.entry("frame".to_string()).or_insert_with(|| origin.to_string());
            }
        }
    }
}

/// Width and height of an `<svg>` from attributes, falling back to `viewBox`.
fn svg_size(svg: &Selection) -> (Option<u32>, Option<u32>) {
    let width = dom::numeric_attr(svg, "width");
    let height = dom::numeric_attr(svg, "height");
    if width.is_some() && height.is_some() {
        return (width, height);
    }

    let view_box: Vec<f32> = dom::attr(svg, "viewBox")
        .or_else(|| dom::attr(svg, "viewbox"))
        .map(|v| {
            v.split(|c: char| c.is_whitespace() || c == ',')
                .filter_map(|n| n.parse().ok())
                .collect()
        })
        .unwrap_or_default();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    match view_box.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => (Some(w.round() as u32), Some(h.round() as u32)),
        _ => (width, height),
    }
}
