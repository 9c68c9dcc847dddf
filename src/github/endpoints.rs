// GitHub API endpoint helpers.
// Builds the user URLs and decodes response bodies into typed records.

use reqwest::Url;

use super::types::{FollowEntry, UserProfile};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// `{api_base}/users/{username}[/{tail}]`, with the username encoded as one path segment.
fn user_endpoint(api_base: &str, username: &str, tail: Option<&str>) -> Option<String> {
    let mut url = Url::parse(api_base).ok()?;
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty().push("users").push(username);
        if let Some(tail) = tail {
            segments.push(tail);
        }
    }
    Some(url.into())
}

/// URL of a user's profile.
pub fn profile_url(api_base: &str, username: &str) -> Option<String> {
    user_endpoint(api_base, username, None)
}

/// URL of the accounts a user follows.
pub fn following_url(api_base: &str, username: &str) -> Option<String> {
    user_endpoint(api_base, username, Some("following"))
}

/// Decode a `GET /users/{username}` body.
pub fn decode_profile(body: &[u8]) -> serde_json::Result<UserProfile> {
    serde_json::from_slice(body)
}

/// Decode a followers or following list body.
pub fn decode_follows(body: &[u8]) -> serde_json::Result<Vec<FollowEntry>> {
    serde_json::from_slice(body)
}
