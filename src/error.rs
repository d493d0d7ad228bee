//! Error types for page-inspector.
//!
//! Scans never fail as a whole; these errors come from the side-effect
//! operations (exports, conversions, downloads, settings, inspector actions).

/// Error type for inspector operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTML parsing failed.
    #[error("HTML parsing failed: {0}")]
    ParseError(String),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Image decoding or encoding failed.
    #[error("Image conversion failed: {0}")]
    ImageError(#[from] image::ImageError),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A network probe could not complete.
    #[error("Network probe failed: {0}")]
    Probe(String),

    /// The inspector was built before every finder was registered.
    #[error("Inspector not ready: missing {0} finder")]
    NotReady(&'static str),

    /// An inspector action is not allowed in the current view state.
    #[error("Invalid inspector state: {0}")]
    InvalidState(String),

    /// The requested export or conversion format is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for inspector operations.
pub type Result<T> = std::result::Result<T, Error>;
