//! Protocol error types.

use thiserror::Error;

/// Errors at the wire boundary: decoding inbound frames, encoding outbound ones.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame was not a well-formed envelope (bad JSON or missing fields).
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
