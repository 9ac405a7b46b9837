//! Error types for draw-state

use thiserror::Error;

/// Errors that can occur while connecting to or preparing the database
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

/// Errors returned through the storage traits
#[derive(Error, Debug)]
pub enum StorageError {
    /// A snapshot digest was not 64 hex characters
    #[error("invalid snapshot digest: {digest}")]
    InvalidDigest { digest: String },

    /// The roster file could not be read
    #[error("roster unreadable at {path}: {reason}")]
    RosterUnreadable { path: String, reason: String },

    /// The roster file was read but is not a valid roster document
    #[error("roster malformed at {path}: {reason}")]
    RosterMalformed { path: String, reason: String },

    /// A draw record failed to serialize or deserialize
    #[error("draw record encoding failed: {0}")]
    Encoding(String),

    /// Any error reported by the backing store
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Encoding(err.to_string())
    }
}
