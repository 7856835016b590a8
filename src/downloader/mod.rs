//! Download orchestration
//!
//! The downloader walks the configured range window by window:
//!
//! 1. **Partitioning**: [`window::Windows`] yields contiguous `[start, end)`
//!    windows of at most one interval each
//! 2. **Fetch**: one request per window through a [`crate::fetcher::LogSource`]
//! 3. **Persist**: the body is streamed to a temp file and renamed into place,
//!    followed by the metadata sidecar
//! 4. **Checkpoint**: the window end is recorded before moving on
//!
//! Windows are processed strictly in order, one at a time. The checkpoint
//! therefore always marks a fully downloaded prefix of the range.
//!
//! # Quick Start
//!
//! ```no_run
//! use cloudflare_logs_downloader::downloader::DownloadExecutor;
//! use cloudflare_logs_downloader::fetcher::LogsHttpClient;
//! # use cloudflare_logs_downloader::downloader::DownloadConfig;
//!
//! # async fn example(config: DownloadConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let source = LogsHttpClient::from_config(&config)?;
//! let summary = DownloadExecutor::new(source).run(&config).await?;
//! println!("downloaded {} windows", summary.windows_completed);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Nothing is retried. The first failure ends the run and is returned as a
//! [`DownloadError`]; the checkpoint stays at the last completed window so the
//! next run resumes there.

pub mod config;
pub mod executor;
pub mod window;

pub use config::{Credentials, DownloadConfig};
pub use executor::{DownloadExecutor, DownloadSummary};
pub use window::{Alignment, TimeRange, Window, Windows};

use crate::fetcher::FetcherError;
use crate::output::OutputError;
use crate::resume::ResumeError;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Request or transport failure, or non-2xx response
    #[error("fetch failed for {window}: {source}")]
    Fetch {
        /// Window being downloaded
        window: Window,
        /// Underlying error
        #[source]
        source: FetcherError,
    },

    /// Writing the log file or sidecar failed
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Reading or writing the checkpoint failed
    #[error("checkpoint error: {0}")]
    Resume(#[from] ResumeError),

    /// Stopped by a shutdown request
    #[error("interrupted; resume will continue from checkpoint {checkpoint:?}")]
    Interrupted {
        /// Last checkpoint written during this run, if any
        checkpoint: Option<i64>,
    },
}
