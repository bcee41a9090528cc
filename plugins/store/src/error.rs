use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by key-value storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a group file failed
    #[error("storage I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A group file exists but is not a JSON object of strings
    #[error("group file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A group could not be serialized
    #[error("failed to serialize group: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
