// Configuration loading.
// Defaults, then the TOML config file, then environment overrides; CLI flags are applied by the binary.

pub mod paths;

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::cache::DEFAULT_ENTRY_LIFETIME;
use crate::error::{GhProfileError, Result};
use crate::github::GITHUB_API_BASE;

pub const ENV_API_BASE: &str = "GHPROFILE_API_BASE";
pub const ENV_ENTRY_LIFETIME: &str = "GHPROFILE_ENTRY_LIFETIME_SECS";
pub const ENV_OFFLINE: &str = "GHPROFILE_OFFLINE";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    pub api_base: String,
    pub user_agent: String,
    /// How long fetched profiles and follow lists stay servable offline.
    pub entry_lifetime: Duration,
    pub request_timeout: Duration,
    /// Treat the network as unreachable and serve only from cache.
    pub offline: bool,
    /// `host:port` used for the reachability probe.
    pub probe_host: String,
    pub probe_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            user_agent: format!("ghprofile/{}", env!("CARGO_PKG_VERSION")),
            entry_lifetime: DEFAULT_ENTRY_LIFETIME,
            request_timeout: Duration::from_secs(30),
            offline: false,
            probe_host: "api.github.com:443".to_string(),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

/// On-disk form of [`Config`]; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_base: Option<String>,
    user_agent: Option<String>,
    entry_lifetime_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    offline: Option<bool>,
    probe_host: Option<String>,
    probe_timeout_secs: Option<u64>,
}

impl Config {
    /// Load from `path`, or the default config location when `None`, then apply
    /// environment overrides. A missing file means defaults. Not validated:
    /// call [`validate`](Self::validate) once all overrides are in.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(paths::config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML config file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::default();

        if let Some(api_base) = file.api_base {
            config.api_base = api_base;
        }
        if let Some(user_agent) = file.user_agent {
            config.user_agent = user_agent;
        }
        if let Some(secs) = file.entry_lifetime_secs {
            config.entry_lifetime = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(offline) = file.offline {
            config.offline = offline;
        }
        if let Some(probe_host) = file.probe_host {
            config.probe_host = probe_host;
        }
        if let Some(secs) = file.probe_timeout_secs {
            config.probe_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Apply `GHPROFILE_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(api_base) = lookup(ENV_API_BASE) {
            self.api_base = api_base;
        }

        if let Some(secs) = lookup(ENV_ENTRY_LIFETIME) {
            let secs: u64 = secs.trim().parse().map_err(|_| GhProfileError::InvalidConfig {
                field: ENV_ENTRY_LIFETIME,
                reason: format!("expected seconds, got {:?}", secs),
            })?;
            self.entry_lifetime = Duration::from_secs(secs);
        }

        if let Some(offline) = lookup(ENV_OFFLINE) {
            self.offline = match offline.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(GhProfileError::InvalidConfig {
                        field: ENV_OFFLINE,
                        reason: format!("expected a boolean, got {:?}", other),
                    });
                }
            };
        }

        Ok(())
    }

    /// Check values that would otherwise fail later at request time.
    pub fn validate(&self) -> Result<()> {
        if self.entry_lifetime.is_zero() {
            return Err(GhProfileError::InvalidConfig {
                field: "entry_lifetime",
                reason: "must be greater than zero".to_string(),
            });
        }

        let url = Url::parse(&self.api_base).map_err(|e| GhProfileError::InvalidConfig {
            field: "api_base",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(GhProfileError::InvalidConfig {
                field: "api_base",
                reason: format!("not an http(s) base URL: {}", self.api_base),
            });
        }

        Ok(())
    }
}
