//! Configuration options for page scans.
//!
//! The `Options` struct controls scan batching, heuristic filters, link
//! classification lists and table post-processing. It deserializes from JSON
//! with every missing field taking its default.

use serde::{Deserialize, Serialize};

use crate::patterns;

/// Configuration options for page scans.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use page_inspector::Options;
///
/// let options = Options {
///     batch_size: 250,
///     propagate_rowspan: true,
///     ..Options::default()
/// };
/// assert_eq!(options.debounce_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Number of elements processed per batch during a scan.
    ///
    /// Default: `100`
    pub batch_size: usize,

    /// Trailing debounce window for word-count recomputation (milliseconds).
    ///
    /// Default: `300`
    pub debounce_ms: u64,

    /// Timeout applied to every network probe (milliseconds).
    ///
    /// Default: `3000`
    pub probe_timeout_ms: u64,

    /// Data URLs shorter than this are skipped, unless they are SVG.
    ///
    /// Default: `100`
    pub min_data_url_len: usize,

    /// Skip images declared as 1x1 (tracking pixels).
    ///
    /// Default: `true`
    pub skip_tracking_pixels: bool,

    /// Exclude hidden elements from image, video and table scans.
    ///
    /// Default: `true`
    pub check_visibility: bool,

    /// Maximum nesting depth for `iframe[srcdoc]` and shadow-root documents.
    ///
    /// Default: `3`
    pub max_frame_depth: usize,

    /// Copy `rowspan` cells into the rows they span.
    ///
    /// Off by default: spanned cells are recorded but later rows are padded.
    ///
    /// Default: `false`
    pub propagate_rowspan: bool,

    /// Merge tables sharing a header signature.
    ///
    /// Default: `true`
    pub merge_tables: bool,

    /// Minimum number of rows (header row included) for a table to be kept.
    ///
    /// Default: `2`
    pub min_table_rows: usize,

    /// Substrings marking a link as unwanted (ads, trackers).
    pub unwanted_patterns: Vec<String>,

    /// Hostnames (and their subdomains) classified as social.
    pub social_domains: Vec<String>,

    /// File extensions classified as documents.
    pub document_extensions: Vec<String>,

    /// File extensions classified as media.
    pub media_extensions: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            batch_size: 100,
            debounce_ms: 300,
            probe_timeout_ms: 3000,
            min_data_url_len: 100,
            skip_tracking_pixels: true,
            check_visibility: true,
            max_frame_depth: 3,
            propagate_rowspan: false,
            merge_tables: true,
            min_table_rows: 2,
            unwanted_patterns: owned(patterns::UNWANTED_LINK_PATTERNS),
            social_domains: owned(patterns::SOCIAL_DOMAINS),
            document_extensions: owned(patterns::DOCUMENT_EXTENSIONS),
            media_extensions: owned(patterns::MEDIA_EXTENSIONS),
        }
    }
}

impl Options {
    /// Parse options from a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Batch size never below one, so batching always makes progress.
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert_eq!(opts.batch_size, 100);
        assert_eq!(opts.debounce_ms, 300);
        assert_eq!(opts.probe_timeout_ms, 3000);
        assert_eq!(opts.min_data_url_len, 100);
        assert!(opts.skip_tracking_pixels);
        assert!(opts.check_visibility);
        assert_eq!(opts.max_frame_depth, 3);
        assert!(!opts.propagate_rowspan);
        assert!(opts.merge_tables);
        assert_eq!(opts.min_table_rows, 2);
        assert!(opts.social_domains.iter().any(|d| d == "twitter.com"));
        assert!(opts.document_extensions.iter().any(|e| e == "pdf"));
        assert!(opts.media_extensions.iter().any(|e| e == "mp4"));
    }

    #[test]
    fn test_from_json_partial() {
        let opts = Options::from_json(r#"{"batch_size": 10, "propagate_rowspan": true}"#)
            .unwrap_or_else(|e| panic!("valid json rejected: {e}"));

        assert_eq!(opts.batch_size, 10);
        assert!(opts.propagate_rowspan);
        assert_eq!(opts.debounce_ms, 300);
        assert_eq!(opts.social_domains, Options::default().social_domains);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Options::from_json("{not json").is_err());
    }

    #[test]
    fn test_effective_batch_size_never_zero() {
        let opts = Options {
            batch_size: 0,
            ..Options::default()
        };
        assert_eq!(opts.effective_batch_size(), 1);
    }
}
