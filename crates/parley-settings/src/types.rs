//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every section is `#[serde(default)]`
//! so a settings file may name only the keys it changes.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings for the chat client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Where the analysis service lives.
    pub server: ServerSettings,
    /// Transport tuning.
    pub connection: ConnectionSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl ClientSettings {
    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue("server.host is empty".into()));
        }
        if self.server.port == 0 {
            return Err(SettingsError::InvalidValue("server.port must be non-zero".into()));
        }
        if !self.server.ws_path.starts_with('/') {
            return Err(SettingsError::InvalidValue(format!(
                "server.wsPath must start with '/': {}",
                self.server.ws_path
            )));
        }
        if self.connection.outbound_buffer == 0 {
            return Err(SettingsError::InvalidValue(
                "connection.outboundBuffer must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Analysis service location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
    /// Path prefix under which `/<session-id>` is appended.
    pub ws_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8000,
            secure: false,
            ws_path: "/ws".into(),
        }
    }
}

/// Transport tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Give up on the opening handshake after this long.
    pub connect_timeout_ms: u64,
    /// Capacity of the outbound frame queue.
    pub outbound_buffer: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            outbound_buffer: 64,
        }
    }
}

/// Log output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = ClientSettings::default();
        assert_eq!(s.server.host, "localhost");
        assert_eq!(s.server.port, 8000);
        assert!(!s.server.secure);
        assert_eq!(s.server.ws_path, "/ws");
        assert_eq!(s.connection.connect_timeout_ms, 10_000);
        assert_eq!(s.connection.outbound_buffer, 64);
        assert_eq!(s.logging.level, "warn");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn camel_case_keys() {
        let value = serde_json::to_value(ClientSettings::default()).unwrap();
        assert!(value["server"].get("wsPath").is_some());
        assert!(value["connection"].get("connectTimeoutMs").is_some());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: ClientSettings = serde_json::from_str(r#"{"server": {"port": 9001}}"#).unwrap();
        assert_eq!(s.server.port, 9001);
        assert_eq!(s.server.host, "localhost");
        assert_eq!(s.logging.level, "warn");
    }

    #[test]
    fn validate_rejects_zero_port() {
        let mut s = ClientSettings::default();
        s.server.port = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_relative_path() {
        let mut s = ClientSettings::default();
        s.server.ws_path = "ws".into();
        assert!(s.validate().is_err());
    }
}
