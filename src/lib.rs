//! # page-inspector
//!
//! Finds, classifies and exports the resources of an HTML page.
//!
//! A [`Page`] is a parsed snapshot of a document plus the URL it was loaded
//! from. Finders scan it for one resource kind each and return a
//! categorized, de-duplicated result:
//!
//! - **Links**: unwanted, social, email, documents, media, navigation,
//!   internal and external
//! - **Images**: `<img>`, CSS backgrounds, SVG, canvas, lazy-loaded and
//!   pseudo-element images, including nested frames and shadow roots
//! - **Videos**: native `<video>`, YouTube, Vimeo, Instagram, generic
//!   players and CSS video backgrounds, with thumbnails and previews
//! - **Tables**: real tables, div/ARIA grids and definition lists,
//!   normalized, merged and exportable to CSV, Excel XML, JSON, Markdown
//!   and HTML
//!
//! The [`inspector`] module drives the finders behind a tabbed panel with
//! lazy scans and a per-page cache.
//!
//! ## Quick Start
//!
//! ```rust
//! use page_inspector::{inspect, Options, Page};
//!
//! let html = r#"<html><body>
//!   <nav><a href="/">Home</a></nav>
//!   <a href="https://twitter.com/site">Follow us</a>
//!   <img src="/hero.jpg" alt="Hero">
//! </body></html>"#;
//!
//! let page = Page::from_html(html, Some("https://site.com/"))?;
//! let report = inspect(&page, &Options::default());
//! assert_eq!(report.links.len(), 2);
//! assert_eq!(report.images.len(), 1);
//! # Ok::<(), page_inspector::Error>(())
//! ```
//!
//! ## Features
//!
//! - `probe` (default): HTTP liveness checks, image size probes and
//!   downloads via `reqwest`.

mod error;
mod options;
mod patterns;
mod report;

/// DOM helpers over `dom_query`.
pub mod dom;

/// URL resolution, normalization and classification helpers.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Text cleanup and escaping.
pub mod text;

/// Inline style and `<style>` rule parsing.
pub mod style;

/// Markup-level visibility checks.
pub mod visibility;

/// Parsed page snapshots.
pub mod page;

/// Scan records, categories and de-duplication.
pub mod record;

/// Trailing debounce timer.
pub mod debounce;

/// Link, image, video and word-count finders.
pub mod finders;

/// Table detection, normalization, merging and export.
pub mod tables;

/// Markdown escaping and pipe tables.
pub mod markdown;

/// Image format conversion.
pub mod convert;

/// Saving resources to disk.
pub mod download;

/// Per-page scan cache.
pub mod cache;

/// Tabbed inspector panel.
pub mod inspector;

/// Network probes.
#[cfg(feature = "probe")]
pub mod probe;

// Public API - re-exports
pub use error::{Error, Result};
pub use options::Options;
pub use page::Page;
pub use report::{inspect, PageReport};

/// Parse `html` and run every finder over it.
///
/// # Example
///
/// ```rust
/// use page_inspector::{inspect_html, Options};
///
/// let report = inspect_html(b"<a href='mailto:a@b.com'>mail</a>", None, &Options::default())?;
/// assert_eq!(report.links.len(), 1);
/// # Ok::<(), page_inspector::Error>(())
/// ```
///
/// # Errors
///
/// `Error::InvalidUrl` if `url` is given but is not absolute.
pub fn inspect_html(html: &[u8], url: Option<&str>, options: &Options) -> Result<PageReport> {
    let page = Page::from_bytes(html, url)?;
    Ok(inspect(&page, options))
}
