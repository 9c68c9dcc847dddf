// GitHub API HTTP client.
// Defines the transport contract used by the fetch layer and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// What came back from a GET, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status, or `None` when the response was not an HTTP response.
    pub status: Option<u16>,
    /// Response body, or `None` when no body was received.
    pub body: Option<Vec<u8>>,
}

impl RawResponse {
    /// An HTTP response with a body.
    pub fn http(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
        }
    }
}

/// The request never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Performs GET requests. Implemented over HTTP by [`GitHubClient`] and by mocks in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<RawResponse, TransportError>;
}

/// Unauthenticated GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
}

impl GitHubClient {
    /// Create a client sending the given user agent, with a per-request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.user_agent, config.request_timeout)
    }
}

#[async_trait]
impl Transport for GitHubClient {
    async fn get(&self, url: &str) -> std::result::Result<RawResponse, TransportError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(url, error = %e, "failed to read response body");
                None
            }
        };

        Ok(RawResponse {
            status: Some(status),
            body,
        })
    }
}
