//! Saving discovered resources to disk.
//!
//! Downloads never overwrite: a name that is already taken gets a
//! `" (N)"` suffix before the extension, starting at 2.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::{debug, info};

use crate::url_utils;
use crate::{Error, Result};

/// Longest file stem `suggest_filename` produces.
const MAX_STEM_LEN: usize = 80;

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared media type (`text/plain;charset=US-ASCII` when omitted).
    pub mime_type: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Extension commonly used for a MIME type.
#[must_use]
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        "image/bmp" => "bmp",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "text/csv" => "csv",
        "application/json" => "json",
        _ => return None,
    };
    Some(ext)
}

fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    out
}

/// Decode a `data:` URL (base64 or percent-encoded payload).
///
/// # Errors
///
/// `Error::InvalidUrl` when the URL is not a `data:` URL or has no comma;
/// `Error::ParseError` when the base64 payload is malformed.
pub fn decode_data_url(url: &str) -> Result<DataUrl> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidUrl(url_utils::dedup_key(url)))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidUrl("data URL without payload".to_string()))?;

    let (mime, is_base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    let mime_type = if mime.is_empty() {
        "text/plain;charset=US-ASCII".to_string()
    } else {
        mime.to_string()
    };

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::ParseError(format!("invalid base64 in data URL: {e}")))?
    } else {
        percent_decode(payload)
    };

    Ok(DataUrl { mime_type, bytes })
}

fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    trimmed.chars().take(MAX_STEM_LEN).collect()
}

/// File name for a resource URL.
///
/// Uses the last path segment when it has one, a MIME-derived extension for
/// `data:` URLs, and `fallback_ext` otherwise.
#[must_use]
pub fn suggest_filename(url: &str, fallback_stem: &str, fallback_ext: &str) -> String {
    if url.trim_start().starts_with("data:") {
        let ext = decode_header_mime(url).and_then(|m| extension_for_mime(&m)).unwrap_or(fallback_ext);
        return format!("{}.{ext}", sanitize_stem(fallback_stem));
    }

    let raw = url_utils::filename(url);
    let (stem, ext) = match raw.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem.to_string(), ext.to_ascii_lowercase()),
        _ => (raw, fallback_ext.to_string()),
    };
    let stem = sanitize_stem(&stem);
    let stem = if stem.is_empty() { sanitize_stem(fallback_stem) } else { stem };
    format!("{stem}.{}", sanitize_stem(&ext))
}

fn decode_header_mime(url: &str) -> Option<String> {
    let header = url.trim().strip_prefix("data:")?.split(',').next()?;
    Some(header.split(';').next().unwrap_or_default().to_string())
}

/// First path in `dir` for `name` that does not exist yet.
#[must_use]
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    (2..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Write `bytes` to `dir/name` without overwriting, creating `dir` if needed.
///
/// # Errors
///
/// `Error::Io` when `dir` exists but is not a directory or writing fails.
pub fn save_bytes(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("path exists but is not a directory: {}", dir.display()),
        )));
    }
    fs::create_dir_all(dir)?;

    let path = unique_path(dir, name);
    fs::write(&path, bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(path)
}

/// Save a resource that can be materialized without the network.
///
/// # Errors
///
/// `Error::UnsupportedFormat` for `blob:` URLs (they only exist inside the
/// page that created them) and for URLs that need fetching.
pub fn save_local_resource(url: &str, dir: &Path) -> Result<PathBuf> {
    let trimmed = url.trim();
    if trimmed.starts_with("blob:") {
        return Err(Error::UnsupportedFormat("blob URLs cannot be saved from a snapshot".to_string()));
    }
    if !trimmed.starts_with("data:") {
        return Err(Error::UnsupportedFormat(format!("{} needs fetching", url_utils::dedup_key(trimmed))));
    }

    let data = decode_data_url(trimmed)?;
    let name = suggest_filename(trimmed, "resource", "bin");
    let path = save_bytes(dir, &name, &data.bytes)?;
    info!(path = %path.display(), mime = %data.mime_type, "data URL saved");
    Ok(path)
}

/// Save a resource, fetching it over HTTP when it is not a `data:` URL.
///
/// # Errors
///
/// Everything `save_local_resource` returns, plus `Error::Probe` when the
/// fetch fails.
#[cfg(feature = "probe")]
pub async fn download_resource(prober: &crate::probe::Prober, url: &str, dir: &Path) -> Result<PathBuf> {
    let trimmed = url.trim();
    if trimmed.starts_with("data:") || trimmed.starts_with("blob:") {
        return save_local_resource(trimmed, dir);
    }

    let bytes = prober.fetch_bytes(trimmed).await?;
    let name = suggest_filename(trimmed, "download", "bin");
    let path = save_bytes(dir, &name, &bytes)?;
    info!(url = trimmed, path = %path.display(), "resource downloaded");
    Ok(path)
}
