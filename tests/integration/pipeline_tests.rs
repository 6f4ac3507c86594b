//! End-to-end pipeline tests
//!
//! These tests use wiremock to stand in for the archive index and replay
//! services and run the full fetch-and-merge cycle against them.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wayback_robots::archive::{build_http_client, Fetcher, Pipeline, RetryPolicy, RunRequest};
use wayback_robots::config::FetchConfig;
use wayback_robots::output::{MemorySink, Verbosity};
use wayback_robots::url::ArchiveEndpoints;
use wayback_robots::ArchiveError;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a pipeline pointed at the mock server with short timeouts and no backoff
fn create_test_pipeline(
    server: &MockServer,
    root: &Path,
    delay: Duration,
    sink: Arc<MemorySink>,
) -> Pipeline {
    create_pipeline_with_retry(
        server,
        root,
        Duration::from_millis(500),
        RetryPolicy::immediate(2),
        delay,
        sink,
    )
}

fn create_pipeline_with_retry(
    server: &MockServer,
    root: &Path,
    timeout: Duration,
    retry: RetryPolicy,
    delay: Duration,
    sink: Arc<MemorySink>,
) -> Pipeline {
    let endpoints = ArchiveEndpoints::new(
        &format!("{}/cdx", server.uri()),
        &format!("{}/web", server.uri()),
    )
    .expect("Failed to build endpoints");

    let client = build_http_client(&FetchConfig::default()).expect("Failed to build client");
    let fetcher = Fetcher::new(client, timeout, retry, sink.clone());

    Pipeline::new(endpoints, fetcher, root, delay, sink)
}

async fn mount_snapshot(server: &MockServer, timestamp: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path_regex(format!("^/web/{}/", timestamp)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn write_timestamps(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("custom-ts.log");
    std::fs::write(&path, content).expect("Failed to write timestamp list");
    path
}

#[tokio::test]
async fn test_full_run_from_index() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .and(query_param("url", "example.com/robots.txt"))
        .and(query_param("fl", "timestamp"))
        .and(query_param("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("20200101000000\n20200601000000\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_snapshot(&server, "20200101000000", "User-agent: *\nDisallow: /a").await;
    mount_snapshot(&server, "20200601000000", "User-agent: *\nDisallow: /b").await;

    let root = TempDir::new().unwrap();
    let sink = Arc::new(MemorySink::new(Verbosity::Verbose));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink.clone());

    let report = pipeline
        .run(&RunRequest::new("https://example.com/", 2))
        .await
        .expect("Run failed");

    let dir = root.path().join("example.com");
    assert_eq!(report.domain, "example.com");
    assert_eq!(report.directory, dir);
    assert_eq!(report.timestamps, vec!["20200101000000", "20200601000000"]);
    assert_eq!(report.downloaded_count(), 2);
    assert!(report.halted_at.is_none());

    assert_eq!(
        std::fs::read_to_string(dir.join("merged.txt")).unwrap(),
        "User-agent: *\nDisallow: /a\nDisallow: /b\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.join("ts.log")).unwrap(),
        "20200101000000\n20200601000000\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.join("20200101000000.txt")).unwrap(),
        "User-agent: *\nDisallow: /a"
    );
    assert!(dir.join("20200601000000.txt").exists());
    assert!(sink.failures().is_empty());
}

#[tokio::test]
async fn test_supplied_timestamps_skip_index() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_string("should-not-be-used\n"))
        .expect(0)
        .mount(&server)
        .await;

    mount_snapshot(&server, "19990101000000", "Disallow: /old").await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "19990101000000\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Quiet));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink);

    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");

    assert_eq!(report.timestamps, vec!["19990101000000"]);
    assert!(!root.path().join("example.com").join("ts.log").exists());
    assert_eq!(
        std::fs::read_to_string(&report.merged.path).unwrap(),
        "Disallow: /old\n"
    );
}

#[tokio::test]
async fn test_failure_stops_remaining_snapshots() {
    let server = MockServer::start().await;

    mount_snapshot(&server, "A", "User-agent: *\nDisallow: /from-a").await;

    // B never answers within the attempt timeout.
    Mock::given(method("GET"))
        .and(path_regex("^/web/B/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/web/C/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Disallow: /from-c"))
        .expect(0)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "A\nB\nC\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Quiet));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink.clone());

    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");

    assert_eq!(report.halted_at.as_deref(), Some("B"));
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.downloaded_count(), 1);
    assert_eq!(report.not_attempted(), &["C".to_string()]);
    assert_eq!(
        std::fs::read_to_string(&report.merged.path).unwrap(),
        "User-agent: *\nDisallow: /from-a\n"
    );
    assert_eq!(
        sink.failures(),
        vec!["Failed to download robots.txt for timestamp B after retries.".to_string()]
    );
}

#[tokio::test]
async fn test_retry_backoff_timing_before_halt() {
    let server = MockServer::start().await;

    mount_snapshot(&server, "A", "User-agent: *\nDisallow: /a").await;

    Mock::given(method("GET"))
        .and(path_regex("^/web/B/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(5)),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/web/C/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Disallow: /c"))
        .expect(0)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "A\nB\nC\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Quiet));
    let pipeline = create_pipeline_with_retry(
        &server,
        root.path(),
        Duration::from_millis(300),
        RetryPolicy::new(2, Duration::from_millis(700)),
        Duration::ZERO,
        sink,
    );

    let started = Instant::now();
    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");
    let elapsed = started.elapsed();

    // Two 300ms attempts on B with one 700ms pause between them, none after the last.
    assert!(elapsed >= Duration::from_millis(1300), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2000), "elapsed {:?}", elapsed);
    assert_eq!(report.halted_at.as_deref(), Some("B"));
    assert_eq!(
        std::fs::read_to_string(&report.merged.path).unwrap(),
        "User-agent: *\nDisallow: /a\n"
    );
}

#[tokio::test]
async fn test_html_snapshot_excluded_from_merge() {
    let server = MockServer::start().await;

    mount_snapshot(&server, "1", "User-agent: *\nDisallow: /admin").await;
    mount_snapshot(
        &server,
        "2",
        "User-agent: *\nDisallow: /secret\n<html><body>Wayback Machine error</body></html>",
    )
    .await;
    mount_snapshot(&server, "3", "Disallow: /admin\nAllow: /public").await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "1\n2\n3\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Verbose));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink.clone());

    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");

    let merged = std::fs::read_to_string(&report.merged.path).unwrap();
    assert_eq!(merged, "User-agent: *\nDisallow: /admin\nAllow: /public\n");
    assert!(!merged.contains("/secret"));
    assert_eq!(report.merged.files_rejected.len(), 1);
    assert!(sink
        .details()
        .iter()
        .any(|d| d.contains("2.txt because it contains HTML tags")));
    assert!(sink.failures().is_empty());
}

#[tokio::test]
async fn test_transient_failure_recovered_by_retry() {
    let server = MockServer::start().await;

    // Mounted first, so it answers the first request only.
    Mock::given(method("GET"))
        .and(path_regex("^/web/1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("stale")
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_snapshot(&server, "1", "Disallow: /retry").await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "1\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Verbose));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink.clone());

    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");

    assert!(report.halted_at.is_none());
    assert_eq!(
        std::fs::read_to_string(&report.merged.path).unwrap(),
        "Disallow: /retry\n"
    );
    assert!(sink.details().iter().any(|d| d.contains("Retrying")));
}

#[tokio::test]
async fn test_delay_applied_between_snapshots() {
    let server = MockServer::start().await;

    mount_snapshot(&server, "1", "a").await;
    mount_snapshot(&server, "2", "b").await;
    mount_snapshot(&server, "3", "c").await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "1\n2\n3\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Verbose));
    let pipeline = create_test_pipeline(
        &server,
        root.path(),
        Duration::from_millis(200),
        sink.clone(),
    );

    let started = Instant::now();
    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");

    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(report.downloaded_count(), 3);
    let waits = sink
        .details()
        .iter()
        .filter(|d| d.starts_with("Waiting"))
        .count();
    assert_eq!(waits, 2);
}

#[tokio::test]
async fn test_index_failure_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("20200101000000\n")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let sink = Arc::new(MemorySink::new(Verbosity::Quiet));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink);

    let result = pipeline.run(&RunRequest::new("example.com", 5)).await;

    assert!(matches!(result, Err(ArchiveError::IndexUnavailable { .. })));
    assert!(!root.path().join("example.com").join("merged.txt").exists());
}

#[tokio::test]
async fn test_all_snapshots_rejected_still_writes_empty_merge() {
    let server = MockServer::start().await;

    mount_snapshot(&server, "1", "<!DOCTYPE html><html></html>").await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "1\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Quiet));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink);

    let report = pipeline
        .run(&RunRequest::new("example.com", 10).with_timestamps_file(&list))
        .await
        .expect("Run failed");

    assert_eq!(report.merged.files_merged, 0);
    assert_eq!(std::fs::read_to_string(&report.merged.path).unwrap(), "");
}

#[tokio::test]
async fn test_rerun_produces_identical_merge() {
    let server = MockServer::start().await;

    mount_snapshot(&server, "1", "User-agent: *\nDisallow: /x").await;
    mount_snapshot(&server, "2", "User-agent: bot\nDisallow: /x").await;

    let root = TempDir::new().unwrap();
    let list = write_timestamps(&root, "1\n2\n");
    let sink = Arc::new(MemorySink::new(Verbosity::Quiet));
    let pipeline = create_test_pipeline(&server, root.path(), Duration::ZERO, sink);
    let request = RunRequest::new("example.com", 10).with_timestamps_file(&list);

    let first = pipeline.run(&request).await.expect("First run failed");
    let first_bytes = std::fs::read(&first.merged.path).unwrap();
    let second = pipeline.run(&request).await.expect("Second run failed");
    let second_bytes = std::fs::read(&second.merged.path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(
        String::from_utf8(second_bytes).unwrap(),
        "User-agent: *\nDisallow: /x\nUser-agent: bot\n"
    );
}
