//! HTTP fetcher implementation
//!
//! This module handles every request made to the archive:
//! - Building the HTTP client with the configured user agent
//! - Streaming response bodies to disk
//! - Bounded retries with a fixed pause between attempts
//! - Error classification for diagnostics
//!
//! Status codes are never inspected. An archive error page is still a body, and
//! telling it apart from a real snapshot is the merger's job.

use crate::archive::retry::RetryPolicy;
use crate::config::FetchConfig;
use crate::output::ProgressSink;
use crate::FetchError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Why a single attempt failed
#[derive(Debug, Error)]
enum AttemptError {
    #[error("{}", describe_http_error(.0))]
    Http(#[from] reqwest::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_http_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else if e.is_body() || e.is_decode() {
        format!("body transfer interrupted: {}", e)
    } else {
        e.to_string()
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed, since the replay service answers most snapshot
/// requests with a redirect to the nearest capture.
///
/// # Example
///
/// ```no_run
/// use wayback_robots::config::FetchConfig;
/// use wayback_robots::archive::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads URLs to files, retrying transient failures
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
    sink: Arc<dyn ProgressSink>,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `timeout` - Upper bound for each individual attempt
    /// * `retry` - Attempt budget and pause between attempts
    /// * `sink` - Receives progress and diagnostics
    pub fn new(
        client: Client,
        timeout: Duration,
        retry: RetryPolicy,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            client,
            timeout,
            retry,
            sink,
        }
    }

    pub fn from_config(
        config: &FetchConfig,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            config.timeout(),
            RetryPolicy::from_config(config),
            sink,
        ))
    }

    /// Streams the body of `url` into `destination`
    ///
    /// The destination is truncated on every attempt. Any HTTP status counts as
    /// success once the body is fully written.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of body bytes written
    /// * `Err(FetchError::Exhausted)` - Every attempt failed
    pub async fn fetch(&self, url: &Url, destination: &Path) -> Result<u64, FetchError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let error = match self.attempt(url, destination).await {
                Ok(bytes) => {
                    tracing::debug!("Wrote {} bytes from {} to {}", bytes, url, destination.display());
                    return Ok(bytes);
                }
                Err(e) => e,
            };

            if !self.retry.should_retry(attempts) {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts,
                    reason: error.to_string(),
                });
            }

            self.sink.detail(&format!(
                "Failed to download {} ({}). Retrying in {} seconds...",
                url,
                error,
                self.retry.backoff.as_secs()
            ));
            tokio::time::sleep(self.retry.backoff).await;
        }
    }

    async fn attempt(&self, url: &Url, destination: &Path) -> Result<u64, AttemptError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        tracing::debug!("{} answered with HTTP {}", url, response.status().as_u16());

        self.sink.transfer_started(url.as_str(), response.content_length());
        let result = self.stream_to_file(response, destination).await;
        self.sink.transfer_finished();

        result
    }

    async fn stream_to_file(
        &self,
        mut response: reqwest::Response,
        destination: &Path,
    ) -> Result<u64, AttemptError> {
        let mut file = File::create(destination).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            self.sink.transfer_progress(chunk.len() as u64);
        }

        file.flush().await?;
        Ok(written)
    }
}
