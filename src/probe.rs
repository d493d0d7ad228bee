//! Best-effort network probes.
//!
//! Link liveness, image byte sizes and resource downloads. Every probe is a
//! single attempt bounded by `Options::probe_timeout_ms`; liveness and size
//! probes degrade to "unknown" instead of failing.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::header::{CONTENT_LENGTH, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::finders::{CategorizedImages, CategorizedLinks, Finder, LinkFinder};
use crate::options::Options;
use crate::page::Page;
use crate::{Error, Result};

/// Probes in flight at once during annotation.
pub const MAX_CONCURRENT_PROBES: usize = 8;

const USER_AGENT: &str = concat!("page-inspector/", env!("CARGO_PKG_VERSION"));

/// Outcome of a liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum LinkStatus {
    /// 2xx response.
    Live(u16),
    /// 3xx response with its `Location`.
    Redirected(String),
    /// 4xx or 5xx response.
    Broken(u16),
    /// Timeout, transport error or a scheme that cannot be probed.
    Unknown,
}

impl LinkStatus {
    /// Short label stored in record metadata.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            LinkStatus::Live(code) => format!("live ({code})"),
            LinkStatus::Redirected(target) => format!("redirected to {target}"),
            LinkStatus::Broken(code) => format!("broken ({code})"),
            LinkStatus::Unknown => "unknown".to_string(),
        }
    }
}

fn is_probeable(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// HTTP client for probes.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Prober {
    /// Client with the configured probe timeout. Redirects are not followed
    /// so that a 3xx can be reported as such.
    ///
    /// # Errors
    ///
    /// `Error::Probe` if the HTTP client cannot be constructed.
    pub fn new(options: &Options) -> Result<Self> {
        let timeout = Duration::from_millis(options.probe_timeout_ms.max(1));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::Probe(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn head(&self, url: &str) -> Option<reqwest::Response> {
        let request = self.client.head(url).send();
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => Some(response),
            Ok(Err(e)) => {
                debug!(url, error = %e, "HEAD request failed");
                None
            }
            Err(_) => {
                debug!(url, timeout_ms = self.timeout.as_millis(), "HEAD request timed out");
                None
            }
        }
    }

    /// Check whether `url` answers. One HEAD request, never retried.
    pub async fn check_link(&self, url: &str) -> LinkStatus {
        if !is_probeable(url) {
            return LinkStatus::Unknown;
        }
        let Some(response) = self.head(url).await else {
            return LinkStatus::Unknown;
        };

        let status = response.status();
        if status.is_redirection() {
            let target = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| response.url().join(loc).ok())
                .map(String::from)
                .unwrap_or_default();
            LinkStatus::Redirected(target)
        } else if status.is_client_error() || status.is_server_error() {
            LinkStatus::Broken(status.as_u16())
        } else {
            LinkStatus::Live(status.as_u16())
        }
    }

    /// Declared size of the resource at `url`, from `Content-Length`.
    pub async fn content_length(&self, url: &str) -> Option<u64> {
        if !is_probeable(url) {
            return None;
        }
        let response = self.head(url).await?;
        if !response.status().is_success() {
            return None;
        }
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Download the body of `url`.
    ///
    /// # Errors
    ///
    /// `Error::Probe` on timeout, transport failure or a non-success status.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if !is_probeable(url) {
            return Err(Error::InvalidUrl(format!("not an http(s) URL: {url}")));
        }

        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| Error::Probe(format!("timed out fetching {url}")))?
            .map_err(|e| Error::Probe(format!("failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Probe(format!("{url} answered {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Probe(format!("failed to read body of {url}: {e}")))?;
        debug!(url, bytes = bytes.len(), "resource fetched");
        Ok(bytes.to_vec())
    }

    /// Probe every http(s) link and store the outcome as `status` metadata.
    pub async fn annotate_links(&self, links: &mut CategorizedLinks) {
        let targets: Vec<(usize, String)> = links
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| is_probeable(&r.source_url))
            .map(|(i, r)| (i, r.source_url.clone()))
            .collect();

        let results: Vec<(usize, LinkStatus)> = stream::iter(targets)
            .map(|(i, url)| async move { (i, self.check_link(&url).await) })
            .buffer_unordered(MAX_CONCURRENT_PROBES)
            .collect()
            .await;

        let unknown = results.iter().filter(|(_, s)| *s == LinkStatus::Unknown).count();
        let records = links.records_mut();
        for (i, status) in results {
            records[i].set_meta("status", status.label());
        }
        if unknown > 0 {
            warn!(unknown, "some links could not be probed");
        }
    }

    /// Probe the byte size of every http(s) image and store it as `bytes`
    /// metadata; images whose size is unknown are left untouched.
    pub async fn annotate_image_sizes(&self, images: &mut CategorizedImages) {
        let targets: Vec<(usize, String)> = images
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| is_probeable(&r.source_url))
            .map(|(i, r)| (i, r.source_url.clone()))
            .collect();

        let sizes: Vec<(usize, Option<u64>)> = stream::iter(targets)
            .map(|(i, url)| async move { (i, self.content_length(&url).await) })
            .buffer_unordered(MAX_CONCURRENT_PROBES)
            .collect()
            .await;

        let records = images.records_mut();
        for (i, size) in sizes {
            if let Some(size) = size {
                records[i].set_meta("bytes", size.to_string());
            }
        }
    }
}

impl LinkFinder {
    /// Scan the page, then probe every link for liveness.
    pub async fn find_with_status(&self, page: &Page, prober: &Prober) -> CategorizedLinks {
        let mut links = self.find(page);
        prober.annotate_links(&mut links).await;
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(LinkStatus::Live(200).label(), "live (200)");
        assert_eq!(LinkStatus::Broken(404).label(), "broken (404)");
        assert_eq!(LinkStatus::Unknown.label(), "unknown");
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_value(LinkStatus::Broken(500)).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json["status"], "broken");
        assert_eq!(json["detail"], 500);
    }

    #[tokio::test]
    async fn test_non_http_urls_are_unknown() {
        let prober = Prober::new(&Options::default()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(prober.check_link("mailto:a@b.com").await, LinkStatus::Unknown);
        assert_eq!(prober.content_length("data:image/png;base64,AAAA").await, None);
        assert!(matches!(prober.fetch_bytes("ftp://x/y").await, Err(Error::InvalidUrl(_))));
    }
}
