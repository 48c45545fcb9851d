//! Socket endpoint: `ws://<host>:<port><path>/<session-id>`.

use std::net::IpAddr;

use url::Url;

use parley_core::SessionId;
use parley_settings::ServerSettings;

use crate::errors::{ClientError, Result};

const DEFAULT_PATH: &str = "/ws";

/// Base address of the analysis service's socket route.
///
/// Holds a `ws`/`wss` URL without credentials, query or fragment, whose
/// path has no trailing slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

fn invalid(endpoint: impl Into<String>, reason: impl Into<String>) -> ClientError {
    ClientError::InvalidEndpoint {
        endpoint: endpoint.into(),
        reason: reason.into(),
    }
}

impl Endpoint {
    /// Build an endpoint from parts.
    ///
    /// `host` may be a name, an IPv4 address, or an IPv6 address with or
    /// without brackets.
    pub fn new(host: &str, port: u16, secure: bool, path: &str) -> Result<Self> {
        let shown = format!("{host}:{port}{path}");
        let host = host.trim();
        if host.is_empty() {
            return Err(invalid(shown, "host is empty"));
        }
        if port == 0 {
            return Err(invalid(shown, "port must be non-zero"));
        }
        if !path.starts_with('/') {
            return Err(invalid(shown, "path must start with '/'"));
        }

        let scheme = if secure { "wss" } else { "ws" };
        let mut base = Url::parse(&format!("{scheme}://localhost"))
            .map_err(|e| invalid(shown.as_str(), e.to_string()))?;
        match host.parse::<IpAddr>() {
            Ok(ip) => base
                .set_ip_host(ip)
                .map_err(|()| invalid(shown.as_str(), "host rejected"))?,
            Err(_) => base
                .set_host(Some(host))
                .map_err(|e| invalid(shown.as_str(), e.to_string()))?,
        }
        base.set_port(Some(port))
            .map_err(|()| invalid(shown.as_str(), "port rejected"))?;
        base.set_path(path.trim_end_matches('/'));
        Ok(Self { base })
    }

    /// Build an endpoint from the `server` settings section.
    pub fn from_settings(server: &ServerSettings) -> Result<Self> {
        Self::new(&server.host, server.port, server.secure, &server.ws_path)
    }

    /// Parse a base URL such as `ws://localhost:8000/ws`.
    ///
    /// The port defaults to 80 (`ws`) or 443 (`wss`); the path defaults to `/ws`.
    pub fn parse(base: &str) -> Result<Self> {
        let mut url = Url::parse(base.trim()).map_err(|e| invalid(base, e.to_string()))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(invalid(base, "scheme must be ws or wss"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid(base, "credentials are not allowed"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid(base, "query and fragment are not allowed"));
        }
        if url.host().is_none() {
            return Err(invalid(base, "host is empty"));
        }
        if url.port() == Some(0) {
            return Err(invalid(base, "port must be non-zero"));
        }

        let path = match url.path().trim_end_matches('/') {
            "" => DEFAULT_PATH.to_owned(),
            trimmed => trimmed.to_owned(),
        };
        url.set_path(&path);
        Ok(Self { base: url })
    }

    /// Socket URL scoped to `session_id`. The id is percent-encoded as one
    /// path segment.
    pub fn session_url(&self, session_id: &SessionId) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            let _ = segments.pop_if_empty().push(session_id.as_str());
        }
        url.into()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn s1(endpoint: &Endpoint) -> String {
        endpoint.session_url(&SessionId::from("S1"))
    }

    #[test]
    fn default_settings_url() {
        let endpoint = Endpoint::from_settings(&ServerSettings::default()).unwrap();
        assert_eq!(s1(&endpoint), "ws://localhost:8000/ws/S1");
    }

    #[test]
    fn secure_and_trailing_slash() {
        let endpoint = Endpoint::new("chat.example.com", 8443, true, "/live/").unwrap();
        assert_eq!(
            endpoint.session_url(&SessionId::from("abc")),
            "wss://chat.example.com:8443/live/abc"
        );
    }

    #[test]
    fn default_port_is_omitted() {
        let endpoint = Endpoint::new("chat.example.com", 443, true, "/ws").unwrap();
        assert_eq!(s1(&endpoint), "wss://chat.example.com/ws/S1");
    }

    #[test]
    fn root_path() {
        let endpoint = Endpoint::new("localhost", 8000, false, "/").unwrap();
        assert_eq!(s1(&endpoint), "ws://localhost:8000/S1");
    }

    #[test]
    fn bare_ipv6_host_gets_brackets() {
        let endpoint = Endpoint::new("::1", 8000, false, "/ws").unwrap();
        assert_eq!(s1(&endpoint), "ws://[::1]:8000/ws/S1");
    }

    #[test]
    fn bracketed_ipv6_host() {
        let endpoint = Endpoint::new("[::1]", 8000, false, "/ws").unwrap();
        assert_eq!(endpoint, Endpoint::new("::1", 8000, false, "/ws").unwrap());
    }

    #[test]
    fn session_id_is_escaped() {
        let endpoint = Endpoint::new("localhost", 8000, false, "/ws").unwrap();
        assert_eq!(
            endpoint.session_url(&SessionId::from("a b/c")),
            "ws://localhost:8000/ws/a%20b%2Fc"
        );
    }

    #[test]
    fn parse_full_url() {
        let endpoint = Endpoint::parse("ws://127.0.0.1:9000/ws").unwrap();
        assert_eq!(endpoint, Endpoint::new("127.0.0.1", 9000, false, "/ws").unwrap());
    }

    #[test]
    fn parse_ipv6_url() {
        let endpoint = Endpoint::parse("ws://[::1]/ws").unwrap();
        assert_eq!(s1(&endpoint), "ws://[::1]/ws/S1");
        assert_eq!(endpoint, Endpoint::new("::1", 80, false, "/ws").unwrap());
    }

    #[test]
    fn parse_defaults_port_and_path() {
        let endpoint = Endpoint::parse("wss://chat.example.com").unwrap();
        assert_eq!(s1(&endpoint), "wss://chat.example.com/ws/S1");
    }

    #[test]
    fn parse_rejects_http() {
        assert_matches!(
            Endpoint::parse("http://localhost:8000/ws"),
            Err(ClientError::InvalidEndpoint { reason, .. }) if reason.contains("scheme")
        );
    }

    #[test]
    fn parse_rejects_credentials() {
        assert_matches!(
            Endpoint::parse("ws://user@localhost:8000/ws"),
            Err(ClientError::InvalidEndpoint { reason, .. }) if reason.contains("credentials")
        );
        assert!(Endpoint::parse("ws://user:pw@localhost:8000/ws").is_err());
    }

    #[test]
    fn parse_rejects_query() {
        assert!(Endpoint::parse("ws://localhost:8000/ws?x=1").is_err());
    }

    #[test]
    fn parse_rejects_bad_port() {
        assert!(Endpoint::parse("ws://localhost:eighty/ws").is_err());
    }

    #[test]
    fn new_rejects_bad_hosts() {
        assert!(Endpoint::new(" ", 8000, false, "/ws").is_err());
        assert!(Endpoint::new("bad host", 8000, false, "/ws").is_err());
        assert!(Endpoint::new("localhost", 0, false, "/ws").is_err());
        assert!(Endpoint::new("localhost", 8000, false, "ws").is_err());
    }
}
