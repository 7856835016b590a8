//! Output file naming
//!
//! Log files are named from the window start in UTC:
//! `logs-YYYY_MM_DD-HH_MM_SS.log.gz`. The metadata sidecar appends `.json`
//! to the full log file name.
//!
//! ```rust
//! use cloudflare_logs_downloader::output::{log_file_path, metadata_path};
//! use std::path::Path;
//!
//! let path = log_file_path(Path::new("/var/logs"), 1_700_000_000).unwrap();
//! assert_eq!(path, Path::new("/var/logs/logs-2023_11_14-22_13_20.log.gz"));
//! assert_eq!(
//!     metadata_path(&path),
//!     Path::new("/var/logs/logs-2023_11_14-22_13_20.log.gz.json")
//! );
//! ```

use chrono::DateTime;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{OutputError, OutputResult};

/// `strftime` format of log file names
pub const LOG_FILE_FORMAT: &str = "logs-%Y_%m_%d-%H_%M_%S.log.gz";

/// Suffix appended to a log file name for its metadata sidecar
pub const METADATA_SUFFIX: &str = ".json";

/// Log file name for a window starting at `start` (Unix seconds)
pub fn log_file_name(start: i64) -> OutputResult<String> {
    let dt = DateTime::from_timestamp(start, 0).ok_or(OutputError::InvalidTimestamp(start))?;
    Ok(dt.format(LOG_FILE_FORMAT).to_string())
}

/// Full log file path inside `dir` for a window starting at `start`
pub fn log_file_path(dir: &Path, start: i64) -> OutputResult<PathBuf> {
    Ok(dir.join(log_file_name(start)?))
}

/// Sidecar path for a log file
pub fn metadata_path(log_path: &Path) -> PathBuf {
    let mut name = OsString::from(log_path.as_os_str());
    name.push(METADATA_SUFFIX);
    PathBuf::from(name)
}
