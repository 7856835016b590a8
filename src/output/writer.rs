//! Atomic file writer
//!
//! Uses tempfile::NamedTempFile created in the destination directory, so the
//! final rename never crosses a filesystem boundary.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{OutputError, OutputResult};

/// A file that only becomes visible under its final name on [`commit`](Self::commit)
///
/// Dropping an uncommitted `AtomicFile` deletes the temporary file.
pub struct AtomicFile {
    dir: PathBuf,
    writer: BufWriter<NamedTempFile>,
    bytes_written: u64,
}

impl AtomicFile {
    /// Start a new temporary file inside `dir`
    pub fn create_in(dir: &Path) -> OutputResult<Self> {
        let temp_file = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(dir)
            .map_err(|e| OutputError::IoError {
                path: dir.to_path_buf(),
                message: format!("Failed to create temp file: {e}"),
            })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            writer: BufWriter::new(temp_file),
            bytes_written: 0,
        })
    }

    /// Append bytes
    pub fn write_chunk(&mut self, chunk: &[u8]) -> OutputResult<()> {
        self.writer.write_all(chunk).map_err(|e| OutputError::IoError {
            path: self.writer.get_ref().path().to_path_buf(),
            message: format!("Failed to write to temp file: {e}"),
        })?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush, sync and atomically move the file to `path`, replacing any
    /// existing file. Returns the number of bytes written.
    pub fn commit(self, path: &Path) -> OutputResult<u64> {
        let io_error = |message: String| OutputError::IoError {
            path: path.to_path_buf(),
            message,
        };

        let temp_file = self
            .writer
            .into_inner()
            .map_err(|e| io_error(format!("Failed to flush temp file: {}", e.error())))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| io_error(format!("Failed to sync temp file: {e}")))?;
        temp_file
            .persist(path)
            .map_err(|e| io_error(format!("Failed to persist temp file: {e}")))?;

        // Fsync the directory so the rename survives a crash
        if let Ok(dir) = std::fs::File::open(&self.dir) {
            let _ = dir.sync_all();
        }

        debug!(path = %path.display(), bytes = self.bytes_written, "File committed");
        Ok(self.bytes_written)
    }

    /// Write `contents` to `path` atomically in one step
    pub fn write_all(path: &Path, contents: &[u8]) -> OutputResult<u64> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = Self::create_in(dir)?;
        file.write_chunk(contents)?;
        file.commit(path)
    }
}
