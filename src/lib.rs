//! Wayback-Robots: historical robots.txt retrieval from the Wayback Machine
//!
//! This crate resolves the capture timestamps of a domain's `robots.txt`, downloads every
//! archived snapshot in order, and merges the distinct lines of the usable snapshots into a
//! single file.

pub mod archive;
pub mod config;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for a retrieval run
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid domain: {0}")]
    Domain(#[from] DomainError),

    #[error("Could not download the timestamps from {url}. Please provide a ts.log manually.")]
    IndexUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("No files were successfully downloaded.")]
    NoSnapshots,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Domain normalization errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Domain cannot be empty")]
    Empty,

    #[error("Invalid domain format '{0}'. Please use a valid domain")]
    InvalidFormat(String),
}

/// Errors reported by the fetcher once its retry budget is spent
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to download {url} after {attempts} attempt(s): {reason}")]
    Exhausted {
        url: String,
        attempts: u32,
        reason: String,
    },
}

/// Errors raised while merging snapshot files
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for retrieval runs
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for domain operations
pub type DomainResult<T> = std::result::Result<T, DomainError>;

// Re-export commonly used types
pub use archive::{Fetcher, Pipeline, RetryPolicy, RunRequest};
pub use config::Config;
pub use output::{merge, ConsoleSink, MemorySink, MergedOutput, ProgressSink, Verbosity};
pub use state::{DownloadOutcome, DownloadRecord};
pub use storage::OutputDirectory;
pub use crate::url::{normalize_domain, ArchiveEndpoints};
