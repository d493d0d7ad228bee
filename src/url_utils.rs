//! URL Utility Functions
//!
//! Resolution of element URLs against the page URL, identity keys for
//! de-duplication, hostname comparison, extension and filename extraction,
//! and `srcset` parsing.

use url::Url;

/// Schemes that are kept verbatim instead of being resolved.
const PASSTHROUGH_PREFIXES: &[&str] = &["data:", "blob:", "mailto:", "tel:", "javascript:"];

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Check for `data:`, `blob:`, `mailto:`, `tel:` and `javascript:` URLs.
#[must_use]
pub fn is_passthrough(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    PASSTHROUGH_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Resolve a raw attribute value into an absolute URL.
///
/// Passthrough schemes are returned unchanged. Without a base URL a
/// relative value is returned as written so it still has an identity.
///
/// # Returns
/// * `None` for empty values
#[must_use]
pub fn resolve(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    if is_passthrough(raw) {
        return Some(raw.to_string());
    }

    if let Ok(parsed) = Url::parse(raw) {
        return Some(parsed.to_string());
    }

    match base {
        Some(base_url) => base_url
            .join(raw)
            .map(|u| u.to_string())
            .ok()
            .or_else(|| Some(raw.to_string())),
        None => Some(raw.to_string()),
    }
}

/// Identity key used to decide whether two discovered URLs are the same.
///
/// Fragments are dropped for hierarchical URLs; passthrough URLs are their
/// own key.
#[must_use]
pub fn dedup_key(url: &str) -> String {
    if is_passthrough(url) {
        return url.to_string();
    }

    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.split('#').next().unwrap_or(url).to_string(),
    }
}

/// Lowercase hostname of an absolute URL.
#[must_use]
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// Check whether `host` is `domain` or one of its subdomains.
#[must_use]
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.');
    host.eq_ignore_ascii_case(domain)
        || (host.len() > domain.len()
            && host.to_ascii_lowercase().ends_with(&format!(".{}", domain.to_ascii_lowercase())))
}

/// Check whether a link points at the page's own host.
///
/// Fails open: when either hostname cannot be determined the link counts
/// as internal.
#[must_use]
pub fn is_same_host(url: &str, page_host: Option<&str>) -> bool {
    let (Some(link_host), Some(page_host)) = (hostname(url), page_host) else {
        return true;
    };
    let strip = |h: &str| h.strip_prefix("www.").unwrap_or(h).to_string();
    strip(&link_host) == strip(&page_host.to_ascii_lowercase())
}

/// Lowercase file extension of the URL path, query and fragment stripped.
#[must_use]
pub fn extension(url: &str) -> Option<String> {
    if is_passthrough(url) {
        return None;
    }

    let name = filename(url);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Extract filename from a URL, stripping query parameters and fragments.
///
/// # Examples
/// ```
/// use page_inspector::url_utils::filename;
///
/// assert_eq!(filename("https://example.com/images/photo.jpg?v=123"), "photo.jpg");
/// assert_eq!(filename("/path/to/image.png#section"), "image.png");
/// assert_eq!(filename("https://example.com/"), "");
/// ```
#[must_use]
pub fn filename(url: &str) -> String {
    let url = url.trim();

    let without_query = url.split('?').next().unwrap_or(url);
    let without_fragment = without_query.split('#').next().unwrap_or(without_query);

    // Skip the authority so "https://example.com" has no filename
    let path = without_fragment
        .split_once("://")
        .map_or(without_fragment, |(_, rest)| rest.split_once('/').map_or("", |(_, p)| p));

    let name = path.rsplit('/').next().unwrap_or("").trim();

    if name == "." || name == ".." {
        return String::new();
    }

    name.to_string()
}

/// One candidate of a `srcset` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SrcsetCandidate {
    /// Candidate URL as written.
    pub url: String,
    /// Width (`480w`) or density (`2x`) descriptor; `1.0` when absent.
    pub descriptor: f32,
}

/// Parse a `srcset` attribute into its candidates.
#[must_use]
pub fn parse_srcset(srcset: &str) -> Vec<SrcsetCandidate> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?.to_string();
            let descriptor = parts
                .next()
                .and_then(|d| d.trim_end_matches(['w', 'x', 'W', 'X']).parse::<f32>().ok())
                .unwrap_or(1.0);
            Some(SrcsetCandidate { url, descriptor })
        })
        .collect()
}

/// The largest candidate of a `srcset` attribute.
#[must_use]
pub fn best_srcset_candidate(srcset: &str) -> Option<String> {
    parse_srcset(srcset)
        .into_iter()
        .max_by(|a, b| a.descriptor.total_cmp(&b.descriptor))
        .map(|c| c.url)
}
