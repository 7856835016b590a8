//! Download configuration
//!
//! [`DownloadConfig`] is built once at startup by [`crate::cli::validate`]
//! and passed by reference into the executor. It is never mutated afterwards.

use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::window::{Alignment, TimeRange, Windows};

/// Default window length.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest accepted window length.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Longest accepted window length. Keeps single files bounded.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum age of the start timestamp.
/// The logs API only retains a few days of data.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(72 * 60 * 60);

/// Default idle read timeout for a request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Credentials sent with every request
#[derive(Clone)]
pub struct Credentials {
    /// Account email (`X-Auth-Email`)
    pub email: String,
    /// API key (`X-Auth-Key`)
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Logs API endpoint, without the `start`/`end` query
    pub base_url: reqwest::Url,
    /// Request credentials
    pub credentials: Credentials,
    /// Global range to download
    pub range: TimeRange,
    /// Window length
    pub interval: Duration,
    /// First window placement
    pub alignment: Alignment,
    /// Output directory for log files and the checkpoint
    pub output_dir: PathBuf,
    /// Whether to write the `.json` sidecar next to each log file
    pub write_metadata: bool,
    /// Idle read timeout per request
    pub request_timeout: Duration,
}

impl DownloadConfig {
    /// Window length in whole seconds
    pub fn interval_secs(&self) -> i64 {
        self.interval.as_secs() as i64
    }

    /// Windows covering the configured range
    pub fn windows(&self) -> Windows {
        Windows::new(self.range, self.interval_secs(), self.alignment)
    }
}
