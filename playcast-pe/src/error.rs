//! Error types for playcast-pe
//!
//! Module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the player engine service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Queue management errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Remote profile service errors
    #[error("Profile service error: {0}")]
    Profile(#[from] crate::profile::ProfileError),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using playcast-pe Error
pub type Result<T> = std::result::Result<T, Error>;
