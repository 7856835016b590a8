//! Checkpoint persistence
//!
//! The checkpoint is a single decimal Unix timestamp stored in
//! `<dir>/checkpoint`. Everything before it has been downloaded and durably
//! written. It is replaced atomically (temp file, fsync, rename) after every
//! completed window, so a crash leaves either the old or the new value.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ResumeError;

/// Checkpoint file name inside the output directory
pub const CHECKPOINT_FILE: &str = "checkpoint";

/// Largest checkpoint file accepted on load. A Unix timestamp needs far less.
const MAX_CHECKPOINT_SIZE: u64 = 64;

/// Reads and writes the checkpoint file of one output directory
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store for the checkpoint inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(CHECKPOINT_FILE),
        }
    }

    /// Path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint
    ///
    /// # Errors
    /// - [`ResumeError::Missing`] if the file does not exist
    /// - [`ResumeError::Io`] if it cannot be read
    /// - [`ResumeError::Corrupt`] if it is not a non-negative integer
    pub fn load(&self) -> Result<i64, ResumeError> {
        debug!(path = %self.path.display(), "Loading checkpoint");

        let metadata = std::fs::metadata(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResumeError::Missing(self.path.clone())
            } else {
                ResumeError::Io {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
            }
        })?;
        if metadata.len() > MAX_CHECKPOINT_SIZE {
            return Err(ResumeError::Corrupt {
                path: self.path.clone(),
                contents: format!("<{} bytes>", metadata.len()),
            });
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| ResumeError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let timestamp = parse_checkpoint(&contents).ok_or_else(|| ResumeError::Corrupt {
            path: self.path.clone(),
            contents: contents.trim().to_string(),
        })?;

        info!(path = %self.path.display(), checkpoint = timestamp, "Loaded checkpoint");
        Ok(timestamp)
    }

    /// Atomically replace the checkpoint with `timestamp`
    pub fn save(&self, timestamp: i64) -> Result<(), ResumeError> {
        let io_error = |message: String| ResumeError::Io {
            path: self.path.clone(),
            message,
        };

        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| io_error(format!("Failed to create temp file: {e}")))?;

        temp_file
            .write_all(timestamp.to_string().as_bytes())
            .map_err(|e| io_error(format!("Failed to write to temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| io_error(format!("Failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| io_error(format!("Failed to sync temp file: {e}")))?;

        temp_file
            .persist(&self.path)
            .map_err(|e| io_error(format!("Failed to persist temp file: {e}")))?;

        // Fsync parent directory so the rename itself is durable
        if let Ok(dir) = std::fs::File::open(parent_dir) {
            let _ = dir.sync_all();
        }

        debug!(path = %self.path.display(), checkpoint = timestamp, "Checkpoint saved");
        Ok(())
    }
}

/// Parse checkpoint contents, tolerating surrounding whitespace
fn parse_checkpoint(contents: &str) -> Option<i64> {
    contents.trim().parse::<i64>().ok().filter(|ts| *ts >= 0)
}
