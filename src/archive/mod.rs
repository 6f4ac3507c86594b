//! Archive module: snapshot retrieval from the Wayback Machine
//!
//! This module contains the core retrieval logic, including:
//! - HTTP fetching with a bounded retry policy
//! - Timestamp list parsing
//! - The sequential, fail-fast download pipeline

mod coordinator;
mod fetcher;
mod retry;
mod timestamps;

pub use coordinator::{Pipeline, RunRequest};
pub use fetcher::{build_http_client, Fetcher};
pub use retry::RetryPolicy;
pub use timestamps::{parse_timestamps, read_timestamps};

use crate::config::Config;
use crate::output::{ProgressSink, RunReport};
use crate::ArchiveError;
use std::sync::Arc;

/// Runs a complete retrieval for one domain
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client and the pipeline from the configuration
/// 2. Resolve the capture timestamps
/// 3. Download the snapshots, stopping at the first failure
/// 4. Merge the downloaded snapshots
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `request` - Domain, index limit and optional timestamp list
/// * `sink` - Receives progress and diagnostics
pub async fn retrieve(
    config: &Config,
    request: &RunRequest,
    sink: Arc<dyn ProgressSink>,
) -> Result<RunReport, ArchiveError> {
    Pipeline::from_config(config, sink)?.run(request).await
}
