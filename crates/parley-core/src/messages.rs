//! Chat messages and participant roles.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Display format for message timestamps (`HH:MM:SS`, local time).
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Who authored a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The customer seeking support.
    #[default]
    #[serde(rename = "customer")]
    Customer,
    /// The support agent handling the conversation.
    #[serde(rename = "support agent", alias = "support-agent", alias = "support_agent")]
    SupportAgent,
}

impl Role {
    /// Wire spelling of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::SupportAgent => "support agent",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::SupportAgent => "Support Agent",
        }
    }

    /// Parse a loosely typed role name (`agent`, `support agent`, `customer`, ...).
    pub fn parse_loose(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "customer" | "c" => Some(Self::Customer),
            "agent" | "support" | "support agent" | "support-agent" | "support_agent" | "a" => {
                Some(Self::SupportAgent)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identity; the conversation log deduplicates on it.
    pub id: MessageId,
    /// Author role.
    pub role: Role,
    /// Message text as typed.
    pub content: String,
    /// Display-formatted timestamp.
    pub timestamp: String,
}

impl Message {
    /// Build a locally authored message with a fresh id, stamped now.
    pub fn compose(role: Role, content: impl Into<String>) -> Self {
        Self::compose_at(role, content, Local::now())
    }

    /// Build a locally authored message with a fresh id, stamped at `at`.
    pub fn compose_at(role: Role, content: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"customer\"");
        assert_eq!(
            serde_json::to_string(&Role::SupportAgent).unwrap(),
            "\"support agent\""
        );
    }

    #[test]
    fn role_accepts_hyphenated_alias() {
        let role: Role = serde_json::from_str("\"support-agent\"").unwrap();
        assert_eq!(role, Role::SupportAgent);
    }

    #[test]
    fn role_rejects_unknown() {
        assert!(serde_json::from_str::<Role>("\"manager\"").is_err());
    }

    #[test]
    fn parse_loose_variants() {
        assert_eq!(Role::parse_loose("Agent"), Some(Role::SupportAgent));
        assert_eq!(Role::parse_loose(" customer "), Some(Role::Customer));
        assert_eq!(Role::parse_loose("boss"), None);
    }

    #[test]
    fn compose_formats_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap();
        let msg = Message::compose_at(Role::Customer, "hi", at);
        assert_eq!(msg.timestamp, "09:07:03");
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.role, Role::Customer);
    }

    #[test]
    fn message_wire_shape() {
        let msg = Message {
            id: "m1".into(),
            role: Role::Customer,
            content: "hi".into(),
            timestamp: "10:00:00".into(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": "m1", "role": "customer", "content": "hi", "timestamp": "10:00:00"})
        );
    }
}
