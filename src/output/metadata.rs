//! Diagnostic sidecar written next to each log file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::path::metadata_path;
use super::writer::AtomicFile;
use super::{OutputError, OutputResult};
use crate::downloader::window::Window;

/// Request and response details for one downloaded window
///
/// Never read back by the downloader; it exists for debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadMetadata {
    /// Human readable window, e.g. `2023-11-14T22:13:20Z to 2023-11-14T22:14:20Z`
    #[serde(rename = "timeRange")]
    pub time_range: String,
    /// Fully qualified request URL
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    /// Response headers, each name mapped to all of its values
    #[serde(rename = "responseHeaders")]
    pub response_headers: BTreeMap<String, Vec<String>>,
}

impl DownloadMetadata {
    /// Build metadata for a completed request
    pub fn new(
        window: &Window,
        download_url: impl Into<String>,
        response_headers: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            time_range: window.to_string(),
            download_url: download_url.into(),
            response_headers,
        }
    }

    /// Atomically write the sidecar for `log_path`, returning its path
    pub fn write_for(&self, log_path: &Path) -> OutputResult<PathBuf> {
        let path = metadata_path(log_path);
        let json = serde_json::to_vec(self)
            .map_err(|e| OutputError::SerializationError(e.to_string()))?;
        AtomicFile::write_all(&path, &json)?;
        Ok(path)
    }
}
