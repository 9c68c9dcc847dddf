// Fetch coordination between the GitHub API and the offline caches.
// Online calls hit the network and refresh the cache; offline calls are served from cache only.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::ExpiringCache;
use crate::error::FetchError;
use crate::github::endpoints::{self, GITHUB_API_BASE};
use crate::github::{FollowEntry, RawResponse, Transport, UserProfile};

use super::reachability::Reachability;

/// Profiles keyed by the username they were requested with.
pub type ProfileCache = ExpiringCache<String, UserProfile>;
/// Follow lists keyed by the exact URL they were fetched from.
pub type FollowsCache = ExpiringCache<String, Vec<FollowEntry>>;

type Decoder<T> = fn(&[u8]) -> serde_json::Result<T>;

/// Chooses network or cache for each fetch and keeps the caches populated.
///
/// Every call resolves to exactly one outcome. There is no retry and no
/// de-duplication: concurrent identical calls each hit the network and the
/// last cache write wins.
pub struct FetchCoordinator {
    transport: Arc<dyn Transport>,
    reachability: Arc<dyn Reachability>,
    profiles: Arc<ProfileCache>,
    follows: Arc<FollowsCache>,
    api_base: String,
}

impl FetchCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        reachability: Arc<dyn Reachability>,
        profiles: Arc<ProfileCache>,
        follows: Arc<FollowsCache>,
    ) -> Self {
        Self {
            transport,
            reachability,
            profiles,
            follows,
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    /// Use a different API root for profile lookups.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn profile_cache(&self) -> &Arc<ProfileCache> {
        &self.profiles
    }

    pub fn follows_cache(&self) -> &Arc<FollowsCache> {
        &self.follows
    }

    /// Fetch a user's profile, falling back to the cache when offline.
    pub async fn fetch_profile(&self, username: &str) -> Result<UserProfile, FetchError> {
        if !self.is_online().await {
            info!(username, "offline, reading profile from cache");
            let profiles = self.profiles.clone();
            let key = username.to_string();
            return read_offline(move || profiles.get(&key)).await;
        }

        let Some(url) = endpoints::profile_url(&self.api_base, username) else {
            warn!(api_base = %self.api_base, "cannot build profile URL");
            return Err(FetchError::RequestFailed);
        };

        let profile = self.request(&url, endpoints::decode_profile).await?;
        self.profiles.insert(username.to_string(), profile.clone());
        debug!(username, "cached profile");
        Ok(profile)
    }

    /// Fetch a followers or following list, falling back to the cache when offline.
    pub async fn fetch_follows(&self, url: &str) -> Result<Vec<FollowEntry>, FetchError> {
        if !self.is_online().await {
            info!(url, "offline, reading follows from cache");
            let follows = self.follows.clone();
            let key = url.to_string();
            return read_offline(move || follows.get(&key)).await;
        }

        let entries = self.request(url, endpoints::decode_follows).await?;
        self.follows.insert(url.to_string(), entries.clone());
        debug!(url, count = entries.len(), "cached follows");
        Ok(entries)
    }

    /// Poll the reachability signal on the blocking pool; probes may block for seconds.
    async fn is_online(&self) -> bool {
        let reachability = self.reachability.clone();
        match tokio::task::spawn_blocking(move || reachability.is_reachable()).await {
            Ok(online) => online,
            Err(e) => {
                warn!(error = %e, "reachability check failed, assuming offline");
                false
            }
        }
    }

    async fn request<T>(&self, url: &str, decode: Decoder<T>) -> Result<T, FetchError> {
        let response = self.transport.get(url).await.map_err(|e| {
            warn!(url, error = %e, "failed request to GitHub");
            FetchError::RequestFailed
        })?;
        classify(url, response, decode)
    }
}

/// Interpret a raw response. Checks run in a fixed order and the first failure wins.
pub fn classify<T>(url: &str, response: RawResponse, decode: Decoder<T>) -> Result<T, FetchError> {
    let Some(body) = response.body else {
        warn!(url, "no data returned from GitHub");
        return Err(FetchError::NoData);
    };

    let Some(status) = response.status else {
        warn!(url, "unable to process GitHub response");
        return Err(FetchError::InvalidResponse);
    };

    if status != 200 {
        warn!(url, status, "failure response from GitHub");
        return Err(FetchError::NotFound);
    }

    decode(&body).map_err(|e| {
        warn!(url, error = %e, "unable to decode GitHub response");
        FetchError::InvalidData
    })
}

/// Run a cache read on the blocking pool and hand the result back to the caller's task.
async fn read_offline<T, F>(read: F) -> Result<T, FetchError>
where
    T: Send + 'static,
    F: FnOnce() -> Option<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(read).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            debug!("cache miss");
            Err(FetchError::NotFound)
        }
        Err(e) => {
            warn!(error = %e, "cache read task failed");
            Err(FetchError::NotFound)
        }
    }
}
