//! Link finder.
//!
//! Enumerates `a[href]`, de-duplicates by resolved URL and sorts each link
//! into exactly one category with first-match-wins rules:
//!
//! 1. unwanted substring (ads, trackers, `javascript:`)
//! 2. social network domain
//! 3. `mailto:`
//! 4. document extension
//! 5. media extension
//! 6. navigation context (`nav`, `header`, `footer`, `menu`, roles, classes)
//! 7. same hostname as the page
//! 8. anything else is external

use dom_query::Selection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{for_each_batch, Finder, FinderKind};
use crate::dom;
use crate::options::Options;
use crate::page::Page;
use crate::patterns::NAVIGATION_CLASS;
use crate::record::{Categorized, Category, DedupSet, ResourceRecord};
use crate::text;
use crate::url_utils;
use crate::{Error, Result};

/// Link categories, in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LinkCategory {
    /// Ad and tracker links.
    #[serde(rename = "unwanted")]
    Unwanted,
    /// Social network profiles and posts.
    #[serde(rename = "socials")]
    Social,
    /// `mailto:` links.
    #[serde(rename = "email")]
    Email,
    /// Downloadable documents (PDF, office files, archives).
    #[serde(rename = "pdfs")]
    Document,
    /// Audio, video and image files.
    #[serde(rename = "media")]
    Media,
    /// Links inside navigation containers.
    #[serde(rename = "navigation")]
    Navigation,
    /// Same-host links.
    #[serde(rename = "internal")]
    Internal,
    /// Everything else.
    #[serde(rename = "external")]
    External,
}

impl Category for LinkCategory {
    const ALL: &'static [Self] = &[
        LinkCategory::Unwanted,
        LinkCategory::Social,
        LinkCategory::Email,
        LinkCategory::Document,
        LinkCategory::Media,
        LinkCategory::Navigation,
        LinkCategory::Internal,
        LinkCategory::External,
    ];

    fn label(self) -> &'static str {
        match self {
            LinkCategory::Unwanted => "unwanted",
            LinkCategory::Social => "socials",
            LinkCategory::Email => "email",
            LinkCategory::Document => "pdfs",
            LinkCategory::Media => "media",
            LinkCategory::Navigation => "navigation",
            LinkCategory::Internal => "internal",
            LinkCategory::External => "external",
        }
    }
}

/// Categorized link scan result.
pub type CategorizedLinks = Categorized<LinkCategory>;

/// A link as read from the page, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLink {
    /// Resolved href.
    pub href: String,
    /// Visible link text.
    pub text: String,
    /// `title` attribute.
    pub title: Option<String>,
    /// `rel` attribute.
    pub rel: Option<String>,
    /// `target` attribute.
    pub target: Option<String>,
    /// Whether the link sits in a navigation context.
    pub in_navigation: bool,
}

impl RawLink {
    /// A bare link with only its href.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// Lists driving link classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRules {
    /// Substrings marking unwanted links (matched case-insensitively).
    pub unwanted_patterns: Vec<String>,
    /// Social hostnames; subdomains match.
    pub social_domains: Vec<String>,
    /// Document extensions.
    pub document_extensions: Vec<String>,
    /// Media extensions.
    pub media_extensions: Vec<String>,
}

impl LinkRules {
    /// Rules taken from the options lists.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            unwanted_patterns: options.unwanted_patterns.iter().map(|p| p.to_ascii_lowercase()).collect(),
            social_domains: options.social_domains.clone(),
            document_extensions: options.document_extensions.clone(),
            media_extensions: options.media_extensions.clone(),
        }
    }
}

impl Default for LinkRules {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

/// Classify one link. First matching rule wins.
///
/// # Errors
///
/// Returns `Error::InvalidUrl` for hrefs that are empty or contain control
/// characters; callers skip such links.
pub fn classify_link(link: &RawLink, page_host: Option<&str>, rules: &LinkRules) -> Result<LinkCategory> {
    let href = link.href.trim();
    if href.is_empty() || href.chars().any(char::is_control) {
        return Err(Error::InvalidUrl(link.href.clone()));
    }

    let lower = href.to_ascii_lowercase();
    if rules.unwanted_patterns.iter().any(|p| lower.contains(p.as_str())) {
        return Ok(LinkCategory::Unwanted);
    }

    if let Some(host) = url_utils::hostname(href) {
        if rules.social_domains.iter().any(|d| url_utils::host_matches(&host, d)) {
            return Ok(LinkCategory::Social);
        }
    }

    if lower.starts_with("mailto:") {
        return Ok(LinkCategory::Email);
    }

    if let Some(ext) = url_utils::extension(href) {
        if rules.document_extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
            return Ok(LinkCategory::Document);
        }
        if rules.media_extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
            return Ok(LinkCategory::Media);
        }
    }

    if link.in_navigation {
        return Ok(LinkCategory::Navigation);
    }

    if url_utils::is_same_host(href, page_host) {
        return Ok(LinkCategory::Internal);
    }

    Ok(LinkCategory::External)
}

/// Classify a list of links into categories, preserving input order.
///
/// Duplicate hrefs keep their first occurrence; links that cannot be
/// classified are logged and left out.
#[must_use]
pub fn categorize_links(links: &[RawLink], page_host: Option<&str>, rules: &LinkRules) -> CategorizedLinks {
    let mut seen = DedupSet::new();
    let mut out = CategorizedLinks::new();

    for link in links {
        if !seen.register(&link.href) {
            continue;
        }
        match classify_link(link, page_host, rules) {
            Ok(kind) => out.push(link_record(link, kind)),
            Err(e) => warn!(href = %link.href, error = %e, "skipping unclassifiable link"),
        }
    }

    out
}

fn link_record(link: &RawLink, kind: LinkCategory) -> ResourceRecord<LinkCategory> {
    let mut record = ResourceRecord::new(link.href.trim(), kind)
        .with_meta("text", text::truncate(&link.text, 200));
    if let Some(title) = &link.title {
        record.set_meta("title", title.as_str());
    }
    if let Some(rel) = &link.rel {
        record.set_meta("rel", rel.as_str());
    }
    if let Some(target) = &link.target {
        record.set_meta("target", target.as_str());
    }
    record
}

const NAVIGATION_TAGS: &[&str] = &["nav", "header", "footer", "menu"];
const NAVIGATION_ROLES: &[&str] = &["navigation", "menubar", "menu", "menuitem"];

fn has_navigation_marker(sel: &Selection) -> bool {
    if dom::tag_name(sel).is_some_and(|t| NAVIGATION_TAGS.contains(&t.as_str())) {
        return true;
    }
    if dom::attr(sel, "role").is_some_and(|r| NAVIGATION_ROLES.contains(&r.to_ascii_lowercase().as_str())) {
        return true;
    }
    dom::class_tokens(sel)
        .iter()
        .chain(dom::attr(sel, "id").iter())
        .any(|token| NAVIGATION_CLASS.is_match(token))
}

/// Whether a link sits inside navigation chrome.
#[must_use]
pub fn is_navigation_context(link: &Selection) -> bool {
    has_navigation_marker(link) || dom::ancestors(link).iter().any(has_navigation_marker)
}

/// Finds and classifies the links of a page.
#[derive(Debug, Clone, Default)]
pub struct LinkFinder {
    options: Options,
    rules: LinkRules,
}

impl LinkFinder {
    /// Finder configured from `options`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            options: options.clone(),
            rules: LinkRules::from_options(options),
        }
    }

    /// Classification rules in use.
    #[must_use]
    pub fn rules(&self) -> &LinkRules {
        &self.rules
    }

    /// Read every `a[href]` of the page, de-duplicated, without classifying.
    #[must_use]
    pub fn collect_raw_links(&self, page: &Page) -> Vec<RawLink> {
        let anchors = dom::select_each(&page.document().select("body"), "a[href]");
        let mut seen = DedupSet::new();
        let mut raw = Vec::new();

        for_each_batch(&anchors, self.options.effective_batch_size(), "links", |anchor| {
            let Some(href) = dom::attr(anchor, "href").and_then(|h| page.resolve(&h)) else {
                return;
            };
            if !seen.register(&href) {
                return;
            }
            raw.push(RawLink {
                href,
                text: dom::clean_text(anchor),
                title: dom::attr(anchor, "title"),
                rel: dom::attr(anchor, "rel"),
                target: dom::attr(anchor, "target"),
                in_navigation: is_navigation_context(anchor),
            });
        });

        raw
    }
}

impl Finder for LinkFinder {
    type Output = CategorizedLinks;
    const KIND: FinderKind = FinderKind::Links;

    fn find(&self, page: &Page) -> CategorizedLinks {
        let raw = self.collect_raw_links(page);
        let links = categorize_links(&raw, page.hostname(), &self.rules);
        debug!(found = raw.len(), kept = links.len(), "link scan complete");
        links
    }
}
