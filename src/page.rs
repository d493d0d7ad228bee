//! Page snapshots.
//!
//! A `Page` is the parsed document every finder reads from, together with
//! the URL it was loaded from. Nested documents (`iframe[srcdoc]`,
//! declarative shadow roots) are pages of their own that share the parent's
//! URL and track their nesting depth.

use std::sync::OnceLock;

use url::Url;

use crate::dom::{self, Document, Selection};
use crate::encoding;
use crate::url_utils;
use crate::visibility::{self, Hidden, StylesheetVisibility};
use crate::{Error, Result};

/// A parsed HTML document and the URL it was loaded from.
pub struct Page {
    document: Document,
    url: Option<Url>,
    hostname: Option<String>,
    depth: usize,
    stylesheet: OnceLock<StylesheetVisibility>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Parse a page from HTML.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `url` is given but is not absolute.
    pub fn from_html(html: &str, url: Option<&str>) -> Result<Self> {
        let url = url
            .map(|u| Url::parse(u.trim()).map_err(|e| Error::InvalidUrl(format!("{u}: {e}"))))
            .transpose()?;
        Ok(Self::with_url(dom::parse(html), url, 0))
    }

    /// Parse a page from raw bytes, honouring the declared charset.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `url` is given but is not absolute.
    pub fn from_bytes(html: &[u8], url: Option<&str>) -> Result<Self> {
        Self::from_html(&encoding::transcode_to_utf8(html), url)
    }

    /// A nested document inheriting this page's URL.
    #[must_use]
    pub fn nested(&self, html: &str) -> Self {
        Self::with_url(dom::parse(html), self.url.clone(), self.depth + 1)
    }

    fn with_url(document: Document, url: Option<Url>, depth: usize) -> Self {
        let hostname = url
            .as_ref()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));
        Self {
            document,
            url,
            hostname,
            depth,
            stylesheet: OnceLock::new(),
        }
    }

    /// The parsed document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The page URL, if known.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Cache key for this page: its URL, or `about:blank` when unknown.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.url
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |u| url_utils::dedup_key(u.as_str()))
    }

    /// Lowercase hostname of the page URL.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Nesting depth: `0` for the top-level page.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Elements hidden by this page's `<style>` rules, matched on first use.
    #[must_use]
    pub fn stylesheet_visibility(&self) -> &StylesheetVisibility {
        self.stylesheet
            .get_or_init(|| StylesheetVisibility::from_document(&self.document))
    }

    /// Why `sel` is hidden by its markup or this page's stylesheets.
    #[must_use]
    pub fn hidden_reason(&self, sel: &Selection) -> Option<Hidden> {
        visibility::hidden_reason_with(sel, self.stylesheet_visibility())
    }

    /// Visibility predicate used by every scan that filters hidden elements.
    #[must_use]
    pub fn is_visible(&self, sel: &Selection) -> bool {
        self.hidden_reason(sel).is_none()
    }

    /// Resolve an attribute value against the page URL.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<String> {
        url_utils::resolve(raw, self.url.as_ref())
    }
}
