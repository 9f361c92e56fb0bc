//! Error types for txlink
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for txlink operations
#[derive(Debug, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Frame-level Errors (fatal to the connection)
    // -------------------------------------------------------------------------
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Another request is in progress")]
    RequestInProgress,

    #[error("Not connected to server")]
    NotConnected,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Operation timed out")]
    Timeout,

    // -------------------------------------------------------------------------
    // Remote Errors (reported by the peer inside a frame)
    // -------------------------------------------------------------------------
    #[error("Server error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// Whether this error must tear down the connection.
    ///
    /// Frame-level corruption has no resynchronization point, so the only
    /// safe reaction is to drop the connection. Everything else is visible
    /// to the caller as a failed exchange and leaves the connection usable.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, LinkError::InvalidFrame(_) | LinkError::Io(_))
    }
}
