// Error types for ghprofile.
// Separates per-fetch outcomes from setup errors (config, HTTP client construction).

use thiserror::Error;

/// Terminal outcome of a failed profile or follow-list fetch.
///
/// Every non-200 status maps to `NotFound`, so rate limiting and server
/// errors are indistinguishable from a missing user here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchError {
    #[error("invalid response from GitHub")]
    InvalidResponse,

    #[error("no data returned from GitHub")]
    NoData,

    #[error("request to GitHub failed")]
    RequestFailed,

    #[error("user not found")]
    NotFound,

    #[error("unable to decode GitHub response")]
    InvalidData,

    /// Part of the taxonomy but never produced: offline fetches fall back to
    /// the cache instead.
    #[error("network unavailable")]
    NoConnectivity,
}

/// Errors raised while setting up the client, configuration or runtime.
#[derive(Error, Debug)]
pub enum GhProfileError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GhProfileError>;
