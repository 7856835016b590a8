//! Integration tests for resume capability
//!
//! Runs validation and the executor together against an in-memory log
//! source, checking that the checkpoint is the only thing carried between
//! runs and that it always names the end of a committed window.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use clap::Parser;
use cloudflare_logs_downloader::cli::{validate, Cli, CliError};
use cloudflare_logs_downloader::downloader::{DownloadError, DownloadExecutor};
use cloudflare_logs_downloader::fetcher::{
    ByteStream, FetcherError, FetcherResult, LogResponse, LogSource,
};
use cloudflare_logs_downloader::output::log_file_path;
use cloudflare_logs_downloader::resume::{CheckpointStore, ResumeError};
use cloudflare_logs_downloader::shutdown::ShutdownCoordinator;
use cloudflare_logs_downloader::Window;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Source that fails or stalls on chosen window starts
#[derive(Default)]
struct MemorySource {
    failing: Mutex<HashSet<i64>>,
    stalling: Mutex<HashSet<i64>>,
    requests: Mutex<Vec<(i64, i64)>>,
}

impl MemorySource {
    fn failing_at(self, start: i64) -> Self {
        self.failing.lock().unwrap().insert(start);
        self
    }

    fn stalling_at(self, start: i64) -> Self {
        self.stalling.lock().unwrap().insert(start);
        self
    }

    fn requests(&self) -> Vec<(i64, i64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSource for MemorySource {
    async fn fetch(&self, window: &Window) -> FetcherResult<LogResponse> {
        self.requests.lock().unwrap().push((window.start, window.end));
        let url = format!("mem://logs?start={}&end={}", window.start, window.end);

        if self.failing.lock().unwrap().contains(&window.start) {
            return Err(FetcherError::HttpError {
                status: 503,
                url,
                body: "try later".to_string(),
            });
        }

        let body: ByteStream = if self.stalling.lock().unwrap().contains(&window.start) {
            Box::pin(futures_util::stream::pending::<FetcherResult<Bytes>>())
        } else {
            let chunk: FetcherResult<Bytes> =
                Ok(Bytes::from(format!("{}-{}", window.start, window.end)));
            Box::pin(futures_util::stream::iter(vec![chunk]))
        };

        Ok(LogResponse {
            url,
            headers: BTreeMap::new(),
            body,
        })
    }

    fn base_url(&self) -> &str {
        "mem://logs"
    }
}

/// Fixed clock: 2023-11-14T22:13:20Z
fn now() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn cli(dir: &Path, extra: &[&str]) -> Cli {
    let dir = dir.to_str().unwrap().to_string();
    let mut args = vec![
        "cloudflare-logs-downloader",
        "--auth-email",
        "ops@example.com",
        "--auth-key",
        "CF",
        "--url",
        "https://api.example.com/logs",
        "--dir",
        &dir,
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

#[tokio::test]
async fn test_checkpoint_seeds_next_start() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::in_dir(temp_dir.path());
    store.save(1_699_999_880).unwrap();

    let config = validate(&cli(temp_dir.path(), &["--end", "1700000000"]), now()).unwrap();
    assert_eq!(config.range.start(), 1_699_999_880);

    let source = MemorySource::default();
    let executor = DownloadExecutor::new(source);
    let summary = executor.run(&config).await.unwrap();

    assert_eq!(summary.windows_completed, 2);
    assert_eq!(store.load().unwrap(), 1_700_000_000);
}

#[tokio::test]
async fn test_failed_window_resumes_on_next_run() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::in_dir(temp_dir.path());
    let start = 1_699_999_800;

    let config = validate(
        &cli(temp_dir.path(), &["--start", "1699999800", "--end", "1700000000"]),
        now(),
    )
    .unwrap();
    let source = MemorySource::default().failing_at(start + 120);
    let err = DownloadExecutor::new(source).run(&config).await.unwrap_err();

    assert!(matches!(err, DownloadError::Fetch { window, .. } if window.start == start + 120));
    assert_eq!(store.load().unwrap(), start + 120);
    assert!(log_file_path(temp_dir.path(), start + 60).unwrap().exists());
    assert!(!log_file_path(temp_dir.path(), start + 120).unwrap().exists());

    // No --start: the second run begins at the failed window
    let config = validate(&cli(temp_dir.path(), &["--end", "1700000000"]), now()).unwrap();
    let executor = DownloadExecutor::new(MemorySource::default());
    executor.run(&config).await.unwrap();

    assert_eq!(
        executor_requests(&executor),
        vec![(start + 120, start + 180), (start + 180, 1_700_000_000)]
    );
    assert_eq!(store.load().unwrap(), 1_700_000_000);
}

fn executor_requests(executor: &DownloadExecutor<MemorySource>) -> Vec<(i64, i64)> {
    executor.source().requests()
}

#[tokio::test]
async fn test_caught_up_rerun_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    CheckpointStore::in_dir(temp_dir.path())
        .save(1_700_000_000)
        .unwrap();

    let err = validate(&cli(temp_dir.path(), &["--end", "1700000000"]), now()).unwrap_err();

    assert!(matches!(
        err,
        CliError::EndNotAfterStart {
            start: 1_700_000_000,
            end: 1_700_000_000
        }
    ));
}

#[test]
fn test_stale_checkpoint_is_too_old() {
    let temp_dir = TempDir::new().unwrap();
    CheckpointStore::in_dir(temp_dir.path())
        .save(1_700_000_000 - 73 * 3600)
        .unwrap();

    let err = validate(&cli(temp_dir.path(), &[]), now()).unwrap_err();
    assert!(matches!(err, CliError::StartTooOld { .. }));

    // A larger --max-age lets the same checkpoint through
    let config = validate(&cli(temp_dir.path(), &["--max-age", "96h"]), now()).unwrap();
    assert_eq!(config.range.start(), 1_700_000_000 - 73 * 3600);
    assert_eq!(config.range.end(), 1_700_000_000);
}

#[test]
fn test_explicit_start_ignores_corrupt_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("checkpoint"), "garbage").unwrap();

    let config = validate(
        &cli(temp_dir.path(), &["--start", "1699999940", "--end", "1700000000"]),
        now(),
    )
    .unwrap();
    assert_eq!(config.range.start(), 1_699_999_940);

    let err = validate(&cli(temp_dir.path(), &["--end", "1700000000"]), now()).unwrap_err();
    assert!(matches!(
        err,
        CliError::ResumeError(ResumeError::Corrupt { .. })
    ));
}

#[tokio::test]
async fn test_interrupt_abandons_in_flight_window() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::in_dir(temp_dir.path());
    let start = 1_699_999_800;

    let config = validate(
        &cli(temp_dir.path(), &["--start", "1699999800", "--end", "1700000000"]),
        now(),
    )
    .unwrap();

    let shutdown = ShutdownCoordinator::shared();
    let executor = DownloadExecutor::new(MemorySource::default().stalling_at(start + 60))
        .with_shutdown(shutdown.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.request_shutdown();
    });

    let err = executor.run(&config).await.unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Interrupted {
            checkpoint: Some(c)
        } if c == start + 60
    ));
    assert_eq!(store.load().unwrap(), start + 60);
    assert!(log_file_path(temp_dir.path(), start).unwrap().exists());
    assert!(!log_file_path(temp_dir.path(), start + 60).unwrap().exists());
}

#[tokio::test]
async fn test_second_downloader_in_same_dir_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let config = validate(
        &cli(temp_dir.path(), &["--start", "1699999940", "--end", "1700000000"]),
        now(),
    )
    .unwrap();

    let shutdown = ShutdownCoordinator::shared();
    let stalled = DownloadExecutor::new(MemorySource::default().stalling_at(1_699_999_940))
        .with_shutdown(shutdown.clone());

    let first = {
        let config = config.clone();
        tokio::spawn(async move { stalled.run(&config).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = DownloadExecutor::new(MemorySource::default())
        .run(&config)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DownloadError::Resume(ResumeError::Lock { .. })
    ));

    shutdown.request_shutdown();
    let first = first.await.unwrap();
    assert!(matches!(first, Err(DownloadError::Interrupted { checkpoint: None })));
    assert!(!temp_dir.path().join("checkpoint").exists());
}
