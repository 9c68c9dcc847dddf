// GitHub API response types.
// Profile and follow-list records decoded from the REST API.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::endpoints::{self, GITHUB_API_BASE};

/// Shown when a profile has no bio.
pub const ABOUT_PLACEHOLDER: &str = "About content not found";

/// A GitHub user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub avatar_url: Option<String>,
    #[serde(rename = "login")]
    pub username: String,
    #[serde(rename = "name")]
    pub display_name: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "followers")]
    pub followers_count: i64,
    #[serde(rename = "following")]
    pub following_count: i64,
    pub followers_url: String,
}

impl UserProfile {
    /// URL of the accounts this user follows on api.github.com. Not part of the API payload.
    pub fn following_url(&self) -> String {
        self.following_url_at(GITHUB_API_BASE)
    }

    /// URL of the accounts this user follows on the API rooted at `api_base`.
    pub fn following_url_at(&self, api_base: &str) -> String {
        endpoints::following_url(api_base, &self.username)
            .unwrap_or_else(|| format!("{}/users/{}/following", api_base, self.username))
    }

    /// Followers URL, only when there is something to list and the URL is usable.
    pub fn followers_target(&self) -> Option<String> {
        listable(self.followers_count, &self.followers_url)
    }

    /// Following URL, only when there is something to list and the URL is usable.
    pub fn following_target(&self) -> Option<String> {
        self.following_target_at(GITHUB_API_BASE)
    }

    /// Like [`following_target`](Self::following_target), against a custom API root.
    pub fn following_target_at(&self, api_base: &str) -> Option<String> {
        listable(self.following_count, &self.following_url_at(api_base))
    }

    /// The bio, or a placeholder when it is missing or empty.
    pub fn about(&self) -> &str {
        match self.bio.as_deref() {
            Some(bio) if !bio.is_empty() => bio,
            _ => ABOUT_PLACEHOLDER,
        }
    }
}

/// One account in a followers or following list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEntry {
    pub avatar_url: String,
    #[serde(rename = "login")]
    pub username: String,
}

fn listable(count: i64, url: &str) -> Option<String> {
    if count <= 0 {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| url.to_string())
}
