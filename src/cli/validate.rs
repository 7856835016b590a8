//! Startup validation and checkpoint bootstrap
//!
//! Turns parsed arguments into an immutable [`DownloadConfig`]. Checks run in
//! a fixed order and the first failure is returned; nothing touches the
//! network before validation succeeds.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info};

use super::download::Cli;
use super::CliError;
use crate::downloader::config::{DownloadConfig, MAX_INTERVAL, MIN_INTERVAL};
use crate::downloader::{Alignment, Credentials, TimeRange};
use crate::resume::CheckpointStore;

/// Validate `cli` against the clock reading `now`
///
/// Order: email, key, URL, start (explicit or from the checkpoint), start
/// age, end sign and date range, end after start, output directory, interval bounds.
pub fn validate(cli: &Cli, now: DateTime<Utc>) -> Result<DownloadConfig, CliError> {
    if cli.auth_email.is_empty() {
        return Err(CliError::MissingArgument("auth email"));
    }
    if cli.auth_key.is_empty() {
        return Err(CliError::MissingArgument("auth key"));
    }
    if cli.url.is_empty() {
        return Err(CliError::MissingArgument("url"));
    }
    let base_url = parse_base_url(&cli.url)?;

    let output_dir = cli.output_dir();
    let start = resolve_start(cli.start, &output_dir)?;

    let age_secs = now.timestamp() - start;
    let max_age_secs = i64::try_from(cli.max_age.as_secs()).unwrap_or(i64::MAX);
    if age_secs > max_age_secs {
        return Err(CliError::StartTooOld {
            start,
            max_age: humantime::format_duration(cli.max_age).to_string(),
        });
    }

    let end = cli.end.unwrap_or_else(|| now.timestamp());
    if end < 0 {
        return Err(CliError::NegativeEnd(end));
    }
    if DateTime::from_timestamp(end, 0).is_none() {
        return Err(CliError::EndOutOfRange(end));
    }
    if end <= start {
        return Err(CliError::EndNotAfterStart { start, end });
    }

    if !output_dir.is_dir() {
        return Err(CliError::MissingDirectory(output_dir));
    }

    validate_interval(cli.interval)?;

    let range = TimeRange::new(start, end).map_err(CliError::InvalidArgument)?;
    let alignment = if cli.align {
        Alignment::Interval
    } else {
        Alignment::Exact
    };

    debug!(start, end, dir = %output_dir.display(), "Configuration validated");
    Ok(DownloadConfig {
        base_url,
        credentials: Credentials {
            email: cli.auth_email.clone(),
            key: cli.auth_key.clone(),
        },
        range,
        interval: cli.interval,
        alignment,
        output_dir,
        write_metadata: !cli.no_metadata,
        request_timeout: cli.timeout,
    })
}

fn parse_base_url(raw: &str) -> Result<reqwest::Url, CliError> {
    let invalid = |reason: String| CliError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Explicit start wins; otherwise the checkpoint in `dir` must exist and parse
fn resolve_start(explicit: Option<i64>, dir: &std::path::Path) -> Result<i64, CliError> {
    match explicit {
        Some(start) if start < 0 => Err(CliError::InvalidArgument(format!(
            "the provided start ({start}) is < 0"
        ))),
        Some(start) => Ok(start),
        None => {
            let store = CheckpointStore::in_dir(dir);
            let start = store.load()?;
            info!(start, path = %store.path().display(), "Resuming from checkpoint");
            Ok(start)
        }
    }
}

fn validate_interval(interval: std::time::Duration) -> Result<(), CliError> {
    if interval < MIN_INTERVAL {
        return Err(CliError::InvalidInterval(
            "the interval of time is less than one second".to_string(),
        ));
    }
    if interval > MAX_INTERVAL {
        return Err(CliError::InvalidInterval(
            "the interval of time is greater than twenty-four hours".to_string(),
        ));
    }
    if interval.subsec_nanos() != 0 {
        return Err(CliError::InvalidInterval(format!(
            "{} is not a whole number of seconds",
            humantime::format_duration(interval)
        )));
    }
    Ok(())
}

impl Cli {
    /// Output directory, defaulting to the system temp directory
    pub fn output_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
