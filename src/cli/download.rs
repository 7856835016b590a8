//! Command line definition and the download command

use chrono::{DateTime, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::validate::validate;
use super::CliError;
use crate::downloader::{DownloadConfig, DownloadError, DownloadExecutor, DownloadSummary};
use crate::fetcher::LogsHttpClient;
use crate::shutdown::SharedShutdown;

/// Parse a timestamp given as Unix seconds or RFC 3339
///
/// Handles:
/// - "1700000000" - Unix seconds (negative values are passed on to validation)
/// - "2023-11-14T22:13:20Z" - explicit UTC
/// - "2023-11-14T23:13:20+01:00" - explicit offset
/// - "2023-11-14T22:13:20" - no timezone, assumed UTC
fn parse_timestamp(input: &str) -> Result<i64, String> {
    let input = input.trim();

    if let Ok(ts) = input.parse::<i64>() {
        return Ok(ts);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&format!("{input}Z")) {
        return Ok(dt.timestamp());
    }

    Err(format!(
        "'{input}' is neither a Unix timestamp nor an RFC 3339 datetime"
    ))
}

/// Parse a duration such as `90s`, `1m`, `72h` or `1h 30m`
fn parse_duration(input: &str) -> Result<Duration, String> {
    humantime::parse_duration(input.trim()).map_err(|e| format!("invalid duration '{input}': {e}"))
}

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Cloudflare logs downloader CLI
#[derive(Parser, Debug, Clone)]
#[command(name = "cloudflare-logs-downloader")]
#[command(about = "Download Cloudflare request logs in fixed time windows, resuming from a checkpoint", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Authorization email
    #[arg(long, env = "CF_AUTH_EMAIL", default_value = "", hide_env_values = true)]
    pub auth_email: String,

    /// Authorization key
    #[arg(long, env = "CF_AUTH_KEY", default_value = "", hide_env_values = true)]
    pub auth_key: String,

    /// Logs API URL, e.g. https://api.cloudflare.com/client/v4/zones/<zone tag>/logs/received
    #[arg(long, env = "CF_LOGS_URL", default_value = "")]
    pub url: String,

    /// Timestamp to start downloading from (Unix seconds or RFC 3339).
    /// Defaults to the checkpoint in --dir.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_timestamp)]
    pub start: Option<i64>,

    /// Maximum age of the start timestamp
    #[arg(long, default_value = "72h", value_parser = parse_duration)]
    pub max_age: Duration,

    /// Timestamp to stop downloading at (Unix seconds or RFC 3339). Defaults to now.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_timestamp)]
    pub end: Option<i64>,

    /// Time span covered by each log file (1s to 24h)
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    pub interval: Duration,

    /// Directory to download logs into. Defaults to the system temp directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Truncate the first window start down to a multiple of --interval
    #[arg(long, default_value_t = false)]
    pub align: bool,

    /// Do not write the .json metadata file next to each log file
    #[arg(long, default_value_t = false)]
    pub no_metadata: bool,

    /// Longest wait for the API to send more data before a request fails.
    /// Applies per read, so it does not limit the size of a window
    #[arg(long, default_value = "5m", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Show a progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Summary format (json or human)
    #[arg(long, default_value = "human")]
    pub output_format: OutputFormat,
}

impl Cli {
    /// Validate, then download the whole range
    ///
    /// Nothing is requested unless validation succeeds. Once downloading has
    /// started, the summary is printed whether or not the run succeeds, so it
    /// always matches what is on disk. Errors are returned, not logged.
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<DownloadSummary, CliError> {
        let config = validate(self, Utc::now())?;
        info!("Downloading to {}", config.output_dir.display());

        let source = LogsHttpClient::from_config(&config)?;
        let mut executor = DownloadExecutor::new(source).with_shutdown(shutdown);
        if self.progress {
            executor = executor.with_progress(create_progress_bar());
        }

        let mut summary = DownloadSummary::default();
        let result = executor.run_tracked(&config, &mut summary).await;
        let error = result.as_ref().err();

        match self.output_format {
            OutputFormat::Json => println!("{}", summary_json(&config, &summary, error)),
            OutputFormat::Human => output_human(&config, &summary, error),
        }

        result.map_err(CliError::DownloadError)?;
        Ok(summary)
    }
}

/// Run summary as JSON; progress fields reflect committed windows even on failure
fn summary_json(
    config: &DownloadConfig,
    summary: &DownloadSummary,
    error: Option<&DownloadError>,
) -> serde_json::Value {
    serde_json::json!({
        "success": error.is_none(),
        "start": config.range.start(),
        "end": config.range.end(),
        "interval_secs": config.interval_secs(),
        "dir": config.output_dir.display().to_string(),
        "windows_completed": summary.windows_completed,
        "bytes_written": summary.bytes_written,
        "checkpoint": summary.checkpoint,
        "error": error.map(|e| e.to_string()),
    })
}

/// Output result in human-readable format
fn output_human(config: &DownloadConfig, summary: &DownloadSummary, error: Option<&DownloadError>) {
    if error.is_none() {
        println!("\nDownload completed successfully!");
    } else {
        println!("\nDownload stopped early.");
    }
    println!("Output: {}", config.output_dir.display());
    println!("Files written: {}", summary.windows_completed);
    println!("Bytes written: {}", summary.bytes_written);
    if let Some(checkpoint) = summary.checkpoint {
        println!("Checkpoint: {checkpoint}");
    }
}

/// Create progress bar with style
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({percent}%) {msg}")
            .expect("hardcoded template is valid")
            .progress_chars("#>-"),
    );
    pb
}
