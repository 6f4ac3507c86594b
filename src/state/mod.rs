//! State module for tracking snapshot downloads
//!
//! # Components
//!
//! - `DownloadOutcome`: Result of fetching one snapshot (downloaded or failed)
//! - `DownloadRecord`: A timestamp paired with its local file and outcome

mod download;

// Re-export main types
pub use download::{downloaded_paths, DownloadOutcome, DownloadRecord};
