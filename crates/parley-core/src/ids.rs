//! Branded ID newtypes.
//!
//! Session and message identifiers are both plain strings on the wire, but
//! they are never interchangeable: a session id scopes the socket endpoint,
//! a message id is the deduplication key of the conversation log.
//!
//! Locally generated IDs are UUID v7 (time-ordered). IDs received from the
//! remote service are taken as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

branded_id! {
    /// Per-process client identity that scopes the socket endpoint.
    ///
    /// Generated once when a chat session is created and never replaced.
    SessionId
}

branded_id! {
    /// Identity of a chat message; the conversation log's dedup key.
    MessageId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_new_is_uuid_v7() {
        let id = SessionId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn message_ids_are_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn from_str_ref() {
        let id = SessionId::from("S1");
        assert_eq!(id.as_str(), "S1");
        assert_eq!(format!("{id}"), "S1");
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = MessageId::from("m1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");
        let back: MessageId = serde_json::from_str("\"m1\"").unwrap();
        assert_eq!(back, id);
    }
}
