//! Client error types.

use parley_core::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the client API.
///
/// Transport failures are not errors at this level: they become
/// [`parley_core::ConnectionStatus::Error`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured endpoint cannot be turned into a socket URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The rejected input.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },
    /// An outbound frame could not be encoded.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] ProtocolError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_display() {
        let err = ClientError::InvalidEndpoint {
            endpoint: "http://x".into(),
            reason: "scheme must be ws or wss".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid endpoint 'http://x': scheme must be ws or wss"
        );
    }
}
