//! Whole-page scan report.
//!
//! `PageReport` bundles one run of every finder for callers that do not
//! drive the interactive inspector, such as the `inspect_page` binary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::finders::{
    CategorizedImages, CategorizedLinks, CategorizedVideos, Finder, ImageFinder, LinkFinder, VideoFinder,
    WordCounter,
};
use crate::options::Options;
use crate::page::Page;
use crate::tables::{TableFinder, TableModel};

/// Every finder's result for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    /// Page URL, if known.
    pub url: Option<String>,

    /// When the scans ran.
    pub scanned_at: DateTime<Utc>,

    /// Visible words on the page.
    pub word_count: usize,

    /// Links by category.
    pub links: CategorizedLinks,

    /// Images by category.
    pub images: CategorizedImages,

    /// Videos by category.
    pub videos: CategorizedVideos,

    /// Normalized (and, if enabled, merged) tables.
    pub tables: Vec<TableModel>,
}

impl PageReport {
    /// Total number of links, images, videos and tables found.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.links.len() + self.images.len() + self.videos.len() + self.tables.len()
    }
}

/// Run every finder once over `page`.
///
/// Never fails: a finder that finds nothing contributes an empty section.
#[must_use]
pub fn inspect(page: &Page, options: &Options) -> PageReport {
    let report = PageReport {
        url: page.url().map(|u| u.as_str().to_string()),
        scanned_at: Utc::now(),
        word_count: WordCounter::new().count(page),
        links: LinkFinder::new(options).find(page),
        images: ImageFinder::new(options).find(page),
        videos: VideoFinder::new(options).find(page),
        tables: TableFinder::new(options).find(page),
    };

    info!(
        url = report.url.as_deref().unwrap_or("about:blank"),
        words = report.word_count,
        links = report.links.len(),
        images = report.images.len(),
        videos = report.videos.len(),
        tables = report.tables.len(),
        "page inspected"
    );
    report
}
