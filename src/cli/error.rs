//! CLI error types and conversions

use std::path::PathBuf;

use crate::downloader::DownloadError;
use crate::fetcher::FetcherError;
use crate::resume::ResumeError;

/// CLI errors
///
/// Configuration variants are raised by [`super::validate`] before any
/// request is made; the wrapped variants come from the run itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Required value missing or empty
    #[error("no {0} provided")]
    MissingArgument(&'static str),

    /// Logs API URL cannot be used
    #[error("invalid url ({url}): {reason}")]
    InvalidUrl {
        /// Value as given
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Start is further in the past than allowed
    #[error("start ({start}) is more than {max_age} old")]
    StartTooOld {
        /// Resolved start timestamp
        start: i64,
        /// Configured maximum age, human readable
        max_age: String,
    },

    /// End is negative
    #[error("the provided end ({0}) is < 0")]
    NegativeEnd(i64),

    /// End cannot be represented as a calendar date
    #[error("the provided end ({0}) is beyond the supported date range")]
    EndOutOfRange(i64),

    /// End is not after start
    #[error("the provided end ({end}) is not after start ({start})")]
    EndNotAfterStart {
        /// Resolved start timestamp
        start: i64,
        /// Resolved end timestamp
        end: i64,
    },

    /// Output directory does not exist
    #[error("the provided dir ({}) does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// Interval outside the accepted bounds
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Checkpoint error
    #[error("resume error: {0}")]
    ResumeError(#[from] ResumeError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Download error
    #[error("download error: {0}")]
    DownloadError(#[from] DownloadError),
}
