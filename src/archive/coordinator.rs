//! Pipeline coordinator - main retrieval orchestration logic
//!
//! A run goes through four steps:
//! 1. Normalize and validate the domain
//! 2. Resolve the timestamp list (supplied file or archive index)
//! 3. Download every snapshot in order, stopping at the first failure
//! 4. Merge whatever was downloaded

use crate::archive::fetcher::Fetcher;
use crate::archive::timestamps::read_timestamps;
use crate::config::Config;
use crate::output::{merge, ProgressSink, RunReport};
use crate::state::{downloaded_paths, DownloadRecord};
use crate::storage::OutputDirectory;
use crate::url::{normalize_domain, ArchiveEndpoints};
use crate::{ArchiveError, FetchError};
use chrono::Utc;
use futures::{future, stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parameters of a single run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Domain or URL as typed by the user
    pub domain: String,

    /// Maximum number of timestamps requested from the index
    pub limit: u32,

    /// Timestamp list to use instead of querying the index
    pub timestamps_file: Option<PathBuf>,
}

impl RunRequest {
    pub fn new(domain: impl Into<String>, limit: u32) -> Self {
        Self {
            domain: domain.into(),
            limit,
            timestamps_file: None,
        }
    }

    pub fn with_timestamps_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.timestamps_file = Some(path.into());
        self
    }
}

/// Main pipeline structure
pub struct Pipeline {
    endpoints: ArchiveEndpoints,
    fetcher: Fetcher,
    root: PathBuf,
    delay: Duration,
    sink: Arc<dyn ProgressSink>,
}

impl Pipeline {
    /// Creates a new pipeline
    ///
    /// # Arguments
    ///
    /// * `endpoints` - Archive index and replay URLs
    /// * `fetcher` - Fetcher used for every request
    /// * `root` - Folder under which the per-domain output folder is created
    /// * `delay` - Pause between two successful snapshot downloads
    /// * `sink` - Receives diagnostics
    pub fn new(
        endpoints: ArchiveEndpoints,
        fetcher: Fetcher,
        root: impl Into<PathBuf>,
        delay: Duration,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            endpoints,
            fetcher,
            root: root.into(),
            delay,
            sink,
        }
    }

    /// Creates a pipeline from a validated configuration
    pub fn from_config(config: &Config, sink: Arc<dyn ProgressSink>) -> Result<Self, ArchiveError> {
        let endpoints = ArchiveEndpoints::from_config(&config.archive)?;
        let fetcher = Fetcher::from_config(&config.fetch, Arc::clone(&sink))?;

        Ok(Self::new(
            endpoints,
            fetcher,
            config.output.root.clone(),
            config.fetch.delay(),
            sink,
        ))
    }

    /// Runs the whole pipeline for one domain
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - At least one snapshot was downloaded and merged
    /// * `Err(ArchiveError::Domain)` - The domain is malformed; nothing was written
    /// * `Err(ArchiveError::IndexUnavailable)` - The timestamp index could not be fetched
    /// * `Err(ArchiveError::NoSnapshots)` - No snapshot could be downloaded
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport, ArchiveError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let domain = normalize_domain(&request.domain)?;
        let out = OutputDirectory::new(&self.root, &domain);
        out.create().map_err(|source| io_error(out.path(), source))?;

        let timestamps = self.resolve_timestamps(&domain, request, &out).await?;
        tracing::info!("Resolved {} timestamp(s) for {}", timestamps.len(), domain);

        let records = self.retrieve_snapshots(&domain, &timestamps, &out).await;
        let halted_at = records
            .last()
            .filter(|r| !r.is_downloaded())
            .map(|r| r.timestamp.clone());

        let files = downloaded_paths(&records);
        if files.is_empty() {
            return Err(ArchiveError::NoSnapshots);
        }

        self.sink.detail("Merging the downloaded files");
        let merged = merge(&files, &out.merged_file(), self.sink.as_ref())?;
        self.sink.detail(&format!(
            "Done! Merged file is saved as {}",
            merged.path.display()
        ));

        Ok(RunReport {
            domain,
            directory: out.path().to_path_buf(),
            timestamps,
            records,
            halted_at,
            merged,
            started_at,
            elapsed: clock.elapsed(),
        })
    }

    /// Reads the supplied timestamp list, or fetches it from the index into `ts.log`
    async fn resolve_timestamps(
        &self,
        domain: &str,
        request: &RunRequest,
        out: &OutputDirectory,
    ) -> Result<Vec<String>, ArchiveError> {
        let list = match &request.timestamps_file {
            Some(path) => {
                self.sink.detail(&format!(
                    "Using provided timestamp file: {}",
                    path.display()
                ));
                path.clone()
            }
            None => {
                let url = self.endpoints.index_url(domain, request.limit);
                let log = out.timestamp_log();
                self.sink
                    .detail(&format!("Downloading timestamps from: {}", url));
                self.fetcher
                    .fetch(&url, &log)
                    .await
                    .map_err(|source| ArchiveError::IndexUnavailable {
                        url: url.to_string(),
                        source,
                    })?;
                log
            }
        };

        self.sink
            .detail(&format!("Reading timestamps from {}", list.display()));
        read_timestamps(&list).map_err(|source| io_error(&list, source))
    }

    /// Downloads snapshots in order and stops at the first failure
    ///
    /// The returned records are every success followed by the failure, if any.
    /// Timestamps after a failure are never requested.
    async fn retrieve_snapshots(
        &self,
        domain: &str,
        timestamps: &[String],
        out: &OutputDirectory,
    ) -> Vec<DownloadRecord> {
        let mut failure: Option<DownloadRecord> = None;

        let mut records: Vec<DownloadRecord> = stream::iter(timestamps.iter().enumerate())
            .then(move |(index, timestamp)| self.retrieve_snapshot(domain, timestamp, index, out))
            .take_while(|record| {
                let downloaded = record.is_downloaded();
                if !downloaded {
                    failure = Some(record.clone());
                }
                future::ready(downloaded)
            })
            .collect()
            .await;

        records.extend(failure);
        records
    }

    async fn retrieve_snapshot(
        &self,
        domain: &str,
        timestamp: &str,
        index: usize,
        out: &OutputDirectory,
    ) -> DownloadRecord {
        // Reaching any index past the first means the previous download succeeded.
        if index > 0 && !self.delay.is_zero() {
            self.sink.detail(&format!(
                "Waiting {:.1}s before the next request",
                self.delay.as_secs_f64()
            ));
            tokio::time::sleep(self.delay).await;
        }

        let path = out.snapshot_file(timestamp);
        let url = match self.endpoints.snapshot_url(timestamp, domain) {
            Ok(url) => url,
            Err(e) => {
                self.sink.failure(&format!(
                    "Cannot build a snapshot URL for timestamp {}: {}",
                    timestamp, e
                ));
                return DownloadRecord::failed(timestamp, path, 0, e.to_string());
            }
        };

        self.sink
            .detail(&format!("Attempting to download: {}", url));

        match self.fetcher.fetch(&url, &path).await {
            Ok(bytes) => DownloadRecord::downloaded(timestamp, path, bytes),
            Err(FetchError::Exhausted {
                attempts, reason, ..
            }) => {
                self.sink.failure(&format!(
                    "Failed to download robots.txt for timestamp {} after retries.",
                    timestamp
                ));
                DownloadRecord::failed(timestamp, path, attempts, reason)
            }
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}
