//! Error types for SQLite-DBM
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using DbmError
pub type Result<T> = std::result::Result<T, DbmError>;

/// Unified error type for SQLite-DBM operations
#[derive(Debug, Error)]
pub enum DbmError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    // -------------------------------------------------------------------------
    // Value Errors (raised before any storage write)
    // -------------------------------------------------------------------------
    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Type error: {0}")]
    Type(String),

    // -------------------------------------------------------------------------
    // Read-path Errors
    // -------------------------------------------------------------------------
    /// Stored bytes do not match the expected header, compression or codec
    #[error("Corrupt record: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Engine / I/O Errors
    // -------------------------------------------------------------------------
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbmError {
    /// True for a missing-key lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbmError::KeyNotFound(_))
    }

    /// True when stored bytes could not be decoded
    pub fn is_corruption(&self) -> bool {
        matches!(self, DbmError::Corruption(_))
    }
}
