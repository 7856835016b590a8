//! Log file and sidecar output
//!
//! Every file this crate publishes goes through [`AtomicFile`]: bytes are
//! written to a temporary file in the destination directory, synced, and
//! renamed into place. A log file is therefore either absent or complete.

use std::path::PathBuf;

pub mod metadata;
pub mod path;
pub mod writer;

pub use metadata::DownloadMetadata;
pub use path::{log_file_path, metadata_path, LOG_FILE_FORMAT, METADATA_SUFFIX};
pub use writer::AtomicFile;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error ({}): {message}", path.display())]
    IoError {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        message: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Timestamp cannot be represented as a date
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
