//! # Cloudflare Logs Downloader Library
//!
//! Downloads request logs from the Cloudflare logs API in fixed time windows,
//! one file per window, and records a checkpoint after each window so an
//! interrupted download resumes exactly where it stopped.
//!
//! ## Features
//!
//! - **Windowed downloads**: a `[start, end)` range is split into contiguous
//!   windows of a fixed interval (1 second to 24 hours)
//! - **Atomic output**: each log file is written to a temporary file and
//!   renamed into place, so a file is either absent or complete
//! - **Resume Capability**: the checkpoint records the end of the last
//!   committed window and seeds the next run's start
//! - **Diagnostics**: a JSON sidecar per file records the request URL and
//!   response headers
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use cloudflare_logs_downloader::cli::Cli;
//! use cloudflare_logs_downloader::shutdown::ShutdownCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cli = Cli::parse_from([
//!     "cloudflare-logs-downloader",
//!     "--auth-email", "ops@example.com",
//!     "--auth-key", "0123456789abcdef",
//!     "--url", "https://api.cloudflare.com/client/v4/zones/<zone>/logs/received",
//!     "--dir", "./logs",
//! ]);
//! let summary = cli.execute(ShutdownCoordinator::shared()).await?;
//! println!("{} files written", summary.windows_completed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`cli`] - Argument parsing and startup validation
//! - [`downloader`] - Window partitioning and the sequential download loop
//! - [`fetcher`] - Logs API client behind the [`fetcher::LogSource`] trait
//! - [`output`] - File naming, atomic writes, metadata sidecars
//! - [`resume`] - Checkpoint file and directory lock
//! - [`logging`] - Tracing subscriber setup
//! - [`shutdown`] - Ctrl+C coordination

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Download orchestration
pub mod downloader;

/// Log fetchers
pub mod fetcher;

/// Tracing subscriber setup
pub mod logging;

/// Log file and sidecar output
pub mod output;

/// Resume capability for interrupted downloads
pub mod resume;

/// Graceful shutdown coordination
pub mod shutdown;

// Re-export commonly used types
pub use downloader::{DownloadConfig, DownloadError, DownloadExecutor, TimeRange, Window};
