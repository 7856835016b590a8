//! Single-writer lock for an output directory
//!
//! Advisory exclusive lock on `<dir>/checkpoint.lock` using fd-lock. Only one
//! process may download into a directory at a time, so the checkpoint has
//! exactly one writer.

use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::checkpoint::CHECKPOINT_FILE;
use super::ResumeError;

/// Lock file guarding the checkpoint of one output directory
pub struct CheckpointLock {
    path: PathBuf,
    lock: RwLock<File>,
}

impl CheckpointLock {
    /// Open (creating if needed) the lock file inside `dir`
    pub fn open(dir: &Path) -> Result<Self, ResumeError> {
        let path = dir.join(format!("{CHECKPOINT_FILE}.lock"));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| ResumeError::Lock {
                path: path.clone(),
                message: format!("Failed to open lock file: {e}"),
            })?;

        Ok(Self {
            path,
            lock: RwLock::new(file),
        })
    }

    /// Try to take the exclusive lock without blocking
    ///
    /// The lock is held until the returned guard is dropped.
    pub fn try_acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>, ResumeError> {
        let path = &self.path;
        self.lock.try_write().map_err(|e| ResumeError::Lock {
            path: path.clone(),
            message: format!("another download appears to be running in this directory: {e}"),
        })
    }
}
