// GitHub API module.
// Provides the transport, endpoint helpers and record types for the two user endpoints.

pub mod client;
pub mod endpoints;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

pub use client::{GitHubClient, RawResponse, Transport, TransportError};
pub use endpoints::GITHUB_API_BASE;
pub use types::*;
