//! Error types for the persistence layer.
//!
//! All errors are propagated via [`EventsError`], which wraps the underlying
//! I/O, serialization, and migration failures.

use crate::migration::MigrationError;

/// Errors that can occur while reading or writing profile data.
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The saved state could not be brought to the current schema.
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// The profile name would not map to a single directory.
    #[error("Invalid profile name: {0:?}")]
    InvalidProfile(String),
}

impl EventsError {
    /// Attach a path to an I/O error.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
