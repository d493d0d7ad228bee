//! Per-page memo of finder results.
//!
//! A tab entered twice reuses the first scan; refreshing a tab clears only
//! that finder's entries and closing the inspector clears everything.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::finders::{CategorizedImages, CategorizedLinks, CategorizedVideos, FinderKind};
use crate::tables::TableModel;

/// The output of one finder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanOutput {
    /// `LinkFinder` result.
    Links(CategorizedLinks),
    /// `ImageFinder` result.
    Images(CategorizedImages),
    /// `VideoFinder` result.
    Videos(CategorizedVideos),
    /// `TableFinder` result.
    Tables(Vec<TableModel>),
}

impl ScanOutput {
    /// Finder that produced this output.
    #[must_use]
    pub fn kind(&self) -> FinderKind {
        match self {
            ScanOutput::Links(_) => FinderKind::Links,
            ScanOutput::Images(_) => FinderKind::Images,
            ScanOutput::Videos(_) => FinderKind::Videos,
            ScanOutput::Tables(_) => FinderKind::Tables,
        }
    }

    /// Number of items found.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ScanOutput::Links(c) => c.len(),
            ScanOutput::Images(c) => c.len(),
            ScanOutput::Videos(c) => c.len(),
            ScanOutput::Tables(t) => t.len(),
        }
    }

    /// Whether the scan found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cached scan and when it ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// The scan result.
    pub output: ScanOutput,
    /// Scan completion time.
    pub scanned_at: DateTime<Utc>,
}

/// Scan results keyed by finder and page.
#[derive(Debug, Clone, Default)]
pub struct ScanCache {
    entries: HashMap<(FinderKind, String), CacheEntry>,
}

impl ScanCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result of `kind` for the page identified by `page_key`.
    #[must_use]
    pub fn get(&self, kind: FinderKind, page_key: &str) -> Option<&CacheEntry> {
        self.entries.get(&(kind, page_key.to_string()))
    }

    /// Store a result, replacing any earlier one for the same finder and page.
    pub fn insert(&mut self, page_key: &str, output: ScanOutput) -> &CacheEntry {
        let kind = output.kind();
        debug!(finder = kind.noun(), page = page_key, items = output.len(), "scan cached");
        let entry = CacheEntry {
            output,
            scanned_at: Utc::now(),
        };
        match self.entries.entry((kind, page_key.to_string())) {
            Entry::Occupied(mut slot) => {
                slot.insert(entry);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(entry),
        }
    }

    /// Drop every entry of one finder.
    pub fn clear(&mut self, kind: FinderKind) {
        self.entries.retain(|(k, _), _| *k != kind);
    }

    /// Drop everything.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Whether a result for `kind` on `page_key` is cached.
    #[must_use]
    pub fn contains(&self, kind: FinderKind, page_key: &str) -> bool {
        self.get(kind, page_key).is_some()
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
