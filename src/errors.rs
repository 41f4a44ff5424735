use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request body could not be parsed as JSON.
    #[error("Malformed request body")]
    MalformedBody(#[source] serde_json::Error),

    /// The request body could not be read from the connection.
    #[error("Failed to read request body")]
    ReadBody(#[source] warp::Error),

    /// The request body exceeded the size limit.
    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// A timestamp could not be formatted.
    #[error("Failed to format timestamp")]
    Timestamp(#[source] time::error::Format),

    /// A blocking storage task panicked or was cancelled.
    #[error("Storage task failed")]
    StorageTask(#[source] tokio::task::JoinError),

    /// A stored slot could not be decoded.
    #[error("Malformed slot {key}")]
    MalformedSlot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be encoded for storage or export.
    #[error("Failed to serialize submissions")]
    Serialization(#[source] serde_json::Error),

    /// The storage backend failed to read or write a slot.
    #[error("Storage error on slot {key}")]
    Storage {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The storage directory could not be created.
    #[error("Cannot use storage directory {}", .path.display())]
    StorageDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The slot file could not be moved into place.
    #[error("Failed to persist slot {key}")]
    Persist {
        key: String,
        #[source]
        source: tempfile::PersistError,
    },

    /// The echo endpoint could not be reached or answered with an error.
    #[error("Remote sync failed")]
    RemoteSync(#[source] reqwest::Error),

    /// The echo endpoint answered with a non-success status.
    #[error("Remote sync answered with status {0}")]
    RemoteStatus(u16),
}

/// Enumerates errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse {name} ({value:?}): {reason}")]
    InvalidVariable {
        name: &'static str,
        value: String,
        reason: String,
    },
}
