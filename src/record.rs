//! Scan result types.
//!
//! Every finder produces `ResourceRecord`s tagged with a closed category
//! enum and collected in a `Categorized` snapshot. Records are transient:
//! they describe the page at scan time and are rebuilt on every scan.

use std::collections::{BTreeMap, HashSet};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::url_utils;

/// A closed set of categories a finder sorts its records into.
pub trait Category: Copy + Ord + std::fmt::Debug + Serialize + 'static {
    /// Every category, in display order.
    const ALL: &'static [Self];

    /// Name used in serialized output and the inspector UI.
    fn label(self) -> &'static str;
}

/// Width and height in CSS pixels, as declared by the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// One discovered page resource.
///
/// `source_url` is the identity key: within one scan no two records of the
/// same collection share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord<K> {
    /// Normalized absolute URL (or a synthetic key for URL-less resources).
    pub source_url: String,

    /// Category the record was sorted into.
    pub kind: K,

    /// Declared dimensions, when the markup provides both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,

    /// Free-form details (alt text, link text, platform IDs, thumbnails).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Alternate URLs for the same resource (`<source>` children, srcset entries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl<K> ResourceRecord<K> {
    /// New record with no dimensions or metadata.
    pub fn new(source_url: impl Into<String>, kind: K) -> Self {
        Self {
            source_url: source_url.into(),
            kind,
            dimensions: None,
            metadata: BTreeMap::new(),
            variants: Vec::new(),
        }
    }

    /// Set dimensions when both are known.
    #[must_use]
    pub fn with_dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        if let (Some(width), Some(height)) = (width, height) {
            self.dimensions = Some(Dimensions { width, height });
        }
        self
    }

    /// Add a metadata entry; blank values are dropped.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_meta(key, value);
        self
    }

    /// Set a metadata entry in place; blank values are dropped.
    pub fn set_meta(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.metadata.insert(key.to_string(), value);
        }
    }

    /// Metadata value by key.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Records of one scan, in discovery order, grouped by category on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorized<K> {
    records: Vec<ResourceRecord<K>>,
}

impl<K> Default for Categorized<K> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<K: Category> Categorized<K> {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Callers de-duplicate with a `DedupSet` first.
    pub fn push(&mut self, record: ResourceRecord<K>) {
        self.records.push(record);
    }

    /// Every record in discovery order.
    #[must_use]
    pub fn records(&self) -> &[ResourceRecord<K>] {
        &self.records
    }

    /// Mutable access for post-scan annotation (e.g. link status).
    pub fn records_mut(&mut self) -> &mut [ResourceRecord<K>] {
        &mut self.records
    }

    /// Records of one category, in discovery order.
    pub fn in_category(&self, kind: K) -> impl Iterator<Item = &ResourceRecord<K>> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// URLs of one category, in discovery order.
    #[must_use]
    pub fn urls(&self, kind: K) -> Vec<&str> {
        self.in_category(kind).map(|r| r.source_url.as_str()).collect()
    }

    /// Look up a record by its identity key.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&ResourceRecord<K>> {
        self.records.iter().find(|r| r.source_url == url)
    }

    /// Number of records per category; categories without records are omitted.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<K, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the scan found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<K: Category> Serialize for Categorized<K>
where
    ResourceRecord<K>: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("total", &self.records.len())?;
        for kind in K::ALL {
            let group: Vec<&ResourceRecord<K>> = self.in_category(*kind).collect();
            if !group.is_empty() {
                map.serialize_entry(kind.label(), &group)?;
            }
        }
        map.end()
    }
}

/// URL-keyed set enforcing one record per identity within a scan.
///
/// A single set may span several sources so that a resource discovered
/// twice (e.g. `<img>` and CSS background) is kept once, first-seen wins.
#[derive(Debug, Default, Clone)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a URL; returns `false` if an equivalent URL was seen before.
    pub fn register(&mut self, url: &str) -> bool {
        self.seen.insert(url_utils::dedup_key(url))
    }

    /// Register a synthetic key (such as a canvas placeholder) as-is,
    /// without URL normalization.
    pub fn register_exact(&mut self, key: &str) -> bool {
        self.seen.insert(key.to_string())
    }

    /// Whether an equivalent URL was already registered.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&url_utils::dedup_key(url))
    }

    /// Number of distinct URLs registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
    enum Shade {
        Light,
        Dark,
    }

    impl Category for Shade {
        const ALL: &'static [Self] = &[Shade::Light, Shade::Dark];

        fn label(self) -> &'static str {
            match self {
                Shade::Light => "light",
                Shade::Dark => "dark",
            }
        }
    }

    #[test]
    fn test_dedup_set_ignores_fragments() {
        let mut set = DedupSet::new();
        assert!(set.register("https://example.com/a.png#one"));
        assert!(!set.register("https://example.com/a.png#two"));
        assert!(set.register("https://example.com/b.png"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_exact_keys_keep_fragments() {
        let mut set = DedupSet::new();
        assert!(set.register_exact("canvas:0#chart"));
        assert!(set.register_exact("canvas:0#graph"));
        assert!(!set.register_exact("canvas:0#chart"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_categorized_counts_and_order() {
        let mut c = Categorized::new();
        c.push(ResourceRecord::new("u1", Shade::Dark));
        c.push(ResourceRecord::new("u2", Shade::Light));
        c.push(ResourceRecord::new("u3", Shade::Dark));

        assert_eq!(c.urls(Shade::Dark), vec!["u1", "u3"]);
        assert_eq!(c.counts().get(&Shade::Light), Some(&1));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_categorized_serializes_grouped() {
        let mut c = Categorized::new();
        c.push(ResourceRecord::new("u1", Shade::Dark).with_meta("alt", "x"));
        let json = serde_json::to_value(&c).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(json["total"], 1);
        assert_eq!(json["dark"][0]["source_url"], "u1");
        assert_eq!(json["dark"][0]["metadata"]["alt"], "x");
        assert!(json.get("light").is_none());
    }

    #[test]
    fn test_blank_metadata_dropped() {
        let r = ResourceRecord::new("u", Shade::Light).with_meta("alt", "  ");
        assert!(r.metadata.is_empty());
        let r = r.with_dimensions(Some(10), None);
        assert!(r.dimensions.is_none());
    }
}
