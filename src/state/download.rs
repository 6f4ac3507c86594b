//! Download record definitions for one snapshot fetch

use std::fmt;
use std::path::PathBuf;

/// Result of fetching a single snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Body was written to disk in full
    Downloaded {
        /// Number of body bytes written
        bytes: u64,
    },

    /// Every attempt failed
    Failed {
        /// Attempts made before giving up
        attempts: u32,
        /// Description of the last failure
        reason: String,
    },
}

impl DownloadOutcome {
    /// Returns true if the snapshot file is available for merging
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { bytes } => write!(f, "downloaded ({} bytes)", bytes),
            Self::Failed { attempts, reason } => {
                write!(f, "failed after {} attempt(s): {}", attempts, reason)
            }
        }
    }
}

/// A timestamp together with the file its snapshot was written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Opaque archive timestamp
    pub timestamp: String,

    /// Local destination of the snapshot body
    pub path: PathBuf,

    /// How the fetch ended
    pub outcome: DownloadOutcome,
}

impl DownloadRecord {
    pub fn downloaded(timestamp: impl Into<String>, path: impl Into<PathBuf>, bytes: u64) -> Self {
        Self {
            timestamp: timestamp.into(),
            path: path.into(),
            outcome: DownloadOutcome::Downloaded { bytes },
        }
    }

    pub fn failed(
        timestamp: impl Into<String>,
        path: impl Into<PathBuf>,
        attempts: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            path: path.into(),
            outcome: DownloadOutcome::Failed {
                attempts,
                reason: reason.into(),
            },
        }
    }

    pub fn is_downloaded(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Paths of the successfully downloaded records, in request order
pub fn downloaded_paths(records: &[DownloadRecord]) -> Vec<PathBuf> {
    records
        .iter()
        .filter(|r| r.is_downloaded())
        .map(|r| r.path.clone())
        .collect()
}
