//! Transport connection status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of the single socket connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// A transport was requested and has not opened or failed yet.
    Connecting,
    /// The transport is open; sends are accepted.
    Connected,
    /// No transport is live.
    #[default]
    Disconnected,
    /// The transport reported a failure. A close normally follows.
    Error,
}

impl ConnectionStatus {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        }
    }

    /// Whether the user should be offered a manual reconnect.
    pub fn offers_reconnect(self) -> bool {
        !matches!(self, Self::Connected)
    }

    /// Whether outbound frames are accepted.
    pub fn can_send(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
