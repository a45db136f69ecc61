//! Error types for docgate.

use thiserror::Error;

/// Main error type for docgate operations.
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The downstream submission failed; the attempt still used an admission slot
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The caller gave up before being admitted
    #[error("Cancelled while waiting for admission")]
    Cancelled,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the downstream document submission.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request or response failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The document could not be encoded
    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// Lower-level I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for docgate operations.
pub type Result<T> = std::result::Result<T, GateError>;
