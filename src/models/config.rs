//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Ten years, the upper bound for the archive threshold.
const MAX_ARCHIVE_AFTER_HOURS: u64 = 87_600;

/// Ten years, the upper bound for the delete threshold.
const MAX_DELETE_AFTER_DAYS: u64 = 3_650;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pocket API access settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Feed ingestion behavior
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Housekeeping thresholds
    #[serde(default)]
    pub housekeeping: HousekeepingConfig,

    /// Trigger server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Source registry: named groups of feed URLs
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.remote.endpoint.trim().is_empty() {
            return Err(AppError::config("remote.endpoint is empty"));
        }
        if self.remote.timeout_secs == 0 {
            return Err(AppError::config("remote.timeout_secs must be > 0"));
        }
        if self.ingest.batch_size == 0 {
            return Err(AppError::config("ingest.batch_size must be > 0"));
        }
        if self.ingest.max_concurrent == 0 {
            return Err(AppError::config("ingest.max_concurrent must be > 0"));
        }
        // Thresholds feed signed chrono durations; cap them well below
        // anything that could wrap.
        if self.housekeeping.archive_after_hours == 0
            || self.housekeeping.archive_after_hours > MAX_ARCHIVE_AFTER_HOURS
        {
            return Err(AppError::config(format!(
                "housekeeping.archive_after_hours must be between 1 and {}",
                MAX_ARCHIVE_AFTER_HOURS
            )));
        }
        if self.housekeeping.delete_after_days == 0
            || self.housekeeping.delete_after_days > MAX_DELETE_AFTER_DAYS
        {
            return Err(AppError::config(format!(
                "housekeeping.delete_after_days must be between 1 and {}",
                MAX_DELETE_AFTER_DAYS
            )));
        }
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(AppError::config("source with empty id"));
            }
            if source.feeds.is_empty() {
                return Err(AppError::config(format!(
                    "source '{}' has no feed URLs",
                    source.id
                )));
            }
            for feed in &source.feeds {
                let parsed = Url::parse(feed).map_err(|e| {
                    AppError::config(format!(
                        "source '{}': invalid feed URL '{}': {}",
                        source.id, feed, e
                    ))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::config(format!(
                        "source '{}': feed URL '{}' must be http or https",
                        source.id, feed
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve the feed URLs registered for a source id.
    pub fn feeds_for(&self, source_id: &str) -> Option<&[String]> {
        self.sources
            .iter()
            .find(|s| s.id == source_id)
            .map(|s| s.feeds.as_slice())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            ingest: IngestConfig::default(),
            housekeeping: HousekeepingConfig::default(),
            server: ServerConfig::default(),
            sources: Vec::new(),
        }
    }
}

/// Pocket API access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the Pocket v3 API
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Pocket consumer key (env: POCKET_CONSUMER_KEY)
    #[serde(default)]
    pub consumer_key: String,

    /// Pocket access token (env: POCKET_ACCESS_TOKEN)
    #[serde(default)]
    pub access_token: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            consumer_key: String::new(),
            access_token: String::new(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Feed ingestion behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Number of add actions grouped into one bulk submission
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Maximum feeds processed concurrently within one source
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Housekeeping age thresholds.
///
/// Unread items older than `archive_after_hours` are archived; archived
/// items older than `delete_after_days` are deleted. Favorited items are
/// exempt from both passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousekeepingConfig {
    #[serde(default = "defaults::archive_after_hours")]
    pub archive_after_hours: u64,

    #[serde(default = "defaults::delete_after_days")]
    pub delete_after_days: u64,
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            archive_after_hours: defaults::archive_after_hours(),
            delete_after_days: defaults::delete_after_days(),
        }
    }
}

/// Trigger server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the trigger endpoints
    #[serde(default = "defaults::listen")]
    pub listen: String,

    /// Basic-auth username (env: FEEDSTASH_USERNAME)
    #[serde(default)]
    pub username: String,

    /// Basic-auth password (env: FEEDSTASH_PASSWORD)
    #[serde(default)]
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: defaults::listen(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// A named group of feed endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source identifier, also used as the Pocket search term
    pub id: String,

    /// Feed URLs belonging to this source
    pub feeds: Vec<String>,
}

mod defaults {
    pub fn endpoint() -> String {
        "https://getpocket.com/v3".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; feedstash/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn batch_size() -> usize {
        8
    }
    pub fn max_concurrent() -> usize {
        8
    }
    pub fn archive_after_hours() -> u64 {
        24
    }
    pub fn delete_after_days() -> u64 {
        15
    }
    pub fn listen() -> String {
        "0.0.0.0:8080".into()
    }
}
