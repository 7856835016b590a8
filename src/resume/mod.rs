//! Resume capability for interrupted downloads
//!
//! Provides the checkpoint file with atomic writes and the directory lock
//! that keeps it single-writer.

use std::path::PathBuf;

pub mod checkpoint;
pub mod lock;

pub use checkpoint::{CheckpointStore, CHECKPOINT_FILE};
pub use lock::CheckpointLock;

/// Checkpoint errors
#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    /// No checkpoint file to resume from
    #[error("failed to read checkpoint file ({}): file not found", .0.display())]
    Missing(PathBuf),

    /// Checkpoint file does not hold a non-negative integer
    #[error("corrupt checkpoint file ({}): {contents:?}", path.display())]
    Corrupt {
        /// Checkpoint path
        path: PathBuf,
        /// Offending contents
        contents: String,
    },

    /// Reading or writing the checkpoint failed
    #[error("checkpoint I/O error ({}): {message}", path.display())]
    Io {
        /// Checkpoint path
        path: PathBuf,
        /// Underlying error
        message: String,
    },

    /// Directory lock could not be taken
    #[error("lock error ({}): {message}", path.display())]
    Lock {
        /// Lock file path
        path: PathBuf,
        /// Underlying error
        message: String,
    },
}
