// ghprofile library.
// GitHub profile and follow-list lookup with an expiring in-memory cache for offline use.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod github;
pub mod state;

pub use cache::{Clock, ExpiringCache, ManualClock, SystemClock};
pub use config::Config;
pub use error::{FetchError, GhProfileError, Result};
pub use fetch::{FetchCoordinator, FixedReachability, Reachability, TcpProbe};
pub use github::{FollowEntry, GitHubClient, Transport, UserProfile};
pub use state::{ObservableValue, ProfileViewModel};
