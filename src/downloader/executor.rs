//! Download executor: the window-by-window fetch and persist loop

use futures_util::StreamExt;
use indicatif::ProgressBar;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::downloader::config::DownloadConfig;
use crate::downloader::window::Window;
use crate::downloader::DownloadError;
use crate::fetcher::{LogResponse, LogSource};
use crate::output::{log_file_path, AtomicFile, DownloadMetadata};
use crate::resume::{CheckpointLock, CheckpointStore};
use crate::shutdown::SharedShutdown;

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Windows fetched and committed
    pub windows_completed: u64,
    /// Log bytes written, sidecars excluded
    pub bytes_written: u64,
    /// Last checkpoint written, `None` if no window completed
    pub checkpoint: Option<i64>,
}

/// Drives one fetch-and-persist cycle per window, in order
pub struct DownloadExecutor<S> {
    source: S,
    shutdown: Option<SharedShutdown>,
    progress: Option<ProgressBar>,
}

impl<S: LogSource> DownloadExecutor<S> {
    /// Create an executor reading from `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            shutdown: None,
            progress: None,
        }
    }

    /// Attach a shared shutdown handle for graceful cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Report progress on `bar`; its length is set to the window count.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// The log source windows are fetched from
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Download every window of `config`
    ///
    /// Holds the output directory lock for the whole run. Stops at the first
    /// error; the checkpoint then still names the last committed window end.
    pub async fn run(&self, config: &DownloadConfig) -> Result<DownloadSummary, DownloadError> {
        let mut summary = DownloadSummary::default();
        self.run_tracked(config, &mut summary).await?;
        Ok(summary)
    }

    /// Like [`run`](Self::run), recording progress into `summary` as windows
    /// commit, so the caller can still report it when the run fails.
    pub async fn run_tracked(
        &self,
        config: &DownloadConfig,
        summary: &mut DownloadSummary,
    ) -> Result<(), DownloadError> {
        let mut lock = CheckpointLock::open(&config.output_dir)?;
        let _guard = lock.try_acquire()?;

        let checkpoint = CheckpointStore::in_dir(&config.output_dir);
        let windows = config.windows();
        let total = windows.remaining();

        info!(
            start = config.range.start(),
            end = config.range.end(),
            interval_secs = config.interval_secs(),
            windows = total,
            dir = %config.output_dir.display(),
            source = self.source.base_url(),
            "Starting download"
        );
        if let Some(bar) = &self.progress {
            bar.set_length(total);
        }

        for window in windows {
            if self.shutdown_requested() {
                return Err(self.interrupted(summary));
            }

            let bytes = match &self.shutdown {
                Some(shutdown) => tokio::select! {
                    result = self.fetch_and_persist(config, &checkpoint, &window) => result?,
                    _ = shutdown.wait_for_shutdown() => {
                        warn!(window = %window, "Shutdown requested, abandoning current window");
                        return Err(self.interrupted(summary));
                    }
                },
                None => self.fetch_and_persist(config, &checkpoint, &window).await?,
            };

            summary.windows_completed += 1;
            summary.bytes_written += bytes;
            summary.checkpoint = Some(window.end);
            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
        }

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
        info!(
            windows = summary.windows_completed,
            bytes = summary.bytes_written,
            checkpoint = ?summary.checkpoint,
            "Download complete"
        );
        Ok(())
    }

    /// Fetch one window, publish its file and sidecar, then advance the checkpoint
    async fn fetch_and_persist(
        &self,
        config: &DownloadConfig,
        checkpoint: &CheckpointStore,
        window: &Window,
    ) -> Result<u64, DownloadError> {
        info!(window = %window, "Downloading logs");

        let fetch_error = |source| DownloadError::Fetch {
            window: *window,
            source,
        };

        let LogResponse {
            url,
            headers,
            mut body,
        } = self.source.fetch(window).await.map_err(fetch_error)?;

        let path = log_file_path(&config.output_dir, window.start)?;
        let mut file = AtomicFile::create_in(&config.output_dir)?;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(fetch_error)?;
            file.write_chunk(&chunk)?;
        }

        // Last await is above: the file, sidecar and checkpoint are published
        // without yielding, so cancellation cannot split them.
        let bytes = file.commit(&path)?;
        if config.write_metadata {
            let metadata_path = DownloadMetadata::new(window, url, headers).write_for(&path)?;
            debug!(path = %metadata_path.display(), "Metadata written");
        }
        checkpoint.save(window.end)?;

        info!(
            file = %file_name(&path),
            bytes,
            checkpoint = window.end,
            "Window committed"
        );
        Ok(bytes)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|s| s.is_shutdown_requested())
    }

    fn interrupted(&self, summary: &DownloadSummary) -> DownloadError {
        if let Some(bar) = &self.progress {
            bar.abandon();
        }
        DownloadError::Interrupted {
            checkpoint: summary.checkpoint,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
