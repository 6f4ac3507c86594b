use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default CDX index endpoint of the Wayback Machine
pub const DEFAULT_INDEX_URL: &str = "https://web.archive.org/cdx/search/cdx";

/// Default replay endpoint of the Wayback Machine
pub const DEFAULT_SNAPSHOT_URL: &str = "http://web.archive.org/web";

/// Main configuration structure for Wayback-Robots
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Archive endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Base URL of the CDX index service
    #[serde(rename = "index-url")]
    pub index_url: String,

    /// Base URL of the replay service
    #[serde(rename = "snapshot-url")]
    pub snapshot_url: String,

    /// Maximum number of timestamps requested from the index
    pub limit: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            snapshot_url: DEFAULT_SNAPSHOT_URL.to_string(),
            limit: 10,
        }
    }
}

/// Network behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound for a single download attempt (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per URL, first attempt included
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Wait between two attempts on the same URL (seconds)
    #[serde(rename = "backoff-secs")]
    pub backoff_secs: u64,

    /// Pause between two successful snapshot downloads (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_attempts: 2,
            backoff_secs: 10,
            delay_secs: 0,
            user_agent: format!("wayback-robots/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which one folder per domain is created
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("robots.txt"),
        }
    }
}
