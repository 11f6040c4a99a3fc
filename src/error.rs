//! Error types for FlatFS
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FlatError
pub type Result<T> = std::result::Result<T, FlatError>;

/// Unified error type for FlatFS operations
#[derive(Debug, Error)]
pub enum FlatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("File with \"{0}\" name already exists")]
    NameExists(String),

    #[error("File {0} not found")]
    NotFound(String),

    #[error("Insufficient space: {requested} bytes requested, {available} bytes available")]
    InsufficientSpace { requested: u64, available: u32 },

    #[error("Store corruption detected: {0}")]
    CorruptStore(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FlatError {
    /// Shorthand for a corruption error with a formatted message
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        FlatError::CorruptStore(msg.into())
    }
}
