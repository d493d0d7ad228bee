//! Resource finders.
//!
//! Each finder scans a `Page` for one resource kind and returns a
//! categorized, de-duplicated snapshot. Finders share nothing but the page:
//! every scan owns its output collection and its own `DedupSet`.

use crate::page::Page;

pub mod images;
pub mod links;
pub mod videos;
pub mod words;

pub use images::{CategorizedImages, ImageCategory, ImageFinder};
pub use links::{categorize_links, CategorizedLinks, LinkCategory, LinkFinder, LinkRules, RawLink};
pub use videos::{preview, CategorizedVideos, Preview, VideoCategory, VideoFinder, VideoRecord};
pub use words::{Trigger, WordCountMonitor, WordCounter};

/// The finders an inspector can run; also the scan-cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderKind {
    /// `LinkFinder`
    Links,
    /// `ImageFinder`
    Images,
    /// `VideoFinder`
    Videos,
    /// `TableFinder`
    Tables,
}

impl FinderKind {
    /// Human-readable plural name ("links", "images", ...).
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            FinderKind::Links => "links",
            FinderKind::Images => "images",
            FinderKind::Videos => "videos",
            FinderKind::Tables => "tables",
        }
    }
}

/// A scanner for one kind of page resource.
///
/// `find` never fails: per-item problems are logged and skipped, so the
/// worst outcome of a scan is an empty result.
pub trait Finder {
    /// Snapshot type produced by a scan.
    type Output: Clone;

    /// Which finder this is.
    const KIND: FinderKind;

    /// Scan the page.
    fn find(&self, page: &Page) -> Self::Output;
}

/// Visit `items` in batches of `batch_size`, logging progress per batch.
///
/// Scans over every element of a page run through here so that progress is
/// observable and the batch size stays configurable.
pub(crate) fn for_each_batch<'a, T>(
    items: &'a [T],
    batch_size: usize,
    scan: &'static str,
    mut visit: impl FnMut(&'a T),
) {
    let batch_size = batch_size.max(1);
    let total = items.len();

    for (index, batch) in items.chunks(batch_size).enumerate() {
        for item in batch {
            visit(item);
        }
        tracing::trace!(
            scan,
            batch = index + 1,
            processed = ((index + 1) * batch_size).min(total),
            total,
            "batch complete"
        );
    }
}
