//! Wire frames exchanged with the analysis service.
//!
//! Outbound frames are a bare JSON [`Message`]. Inbound frames are an
//! [`Envelope`] carrying the (echoed or replied) message together with the
//! latest sentiment snapshot and coaching suggestions.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::messages::Message;
use crate::sentiment::SentimentSnapshot;

/// Inbound frame: `{message, sentiment, suggestions}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message to merge into the conversation log.
    pub message: Message,
    /// Replacement sentiment snapshot.
    pub sentiment: SentimentSnapshot,
    /// Replacement suggestion list.
    pub suggestions: Vec<String>,
}

impl Envelope {
    /// Decode an inbound text frame. All three fields are required.
    pub fn parse(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// Encode an outbound message frame.
pub fn encode_message(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::errors::ProtocolError;
    use crate::messages::Role;

    const M1_ENVELOPE: &str = r#"{
        "message": {"id": "m1", "role": "customer", "content": "hi", "timestamp": "10:00:00"},
        "sentiment": {"sentiment": "neutral", "score": 0, "reason": "greeting"},
        "suggestions": []
    }"#;

    #[test]
    fn parses_service_envelope() {
        let env = Envelope::parse(M1_ENVELOPE).unwrap();
        assert_eq!(env.message.id.as_str(), "m1");
        assert_eq!(env.message.role, Role::Customer);
        assert_eq!(env.sentiment.sentiment, "neutral");
        assert!(env.sentiment.score.abs() < f64::EPSILON);
        assert_eq!(env.sentiment.reason, "greeting");
        assert!(env.suggestions.is_empty());
    }

    #[test]
    fn rejects_non_json() {
        assert_matches!(Envelope::parse("{not json"), Err(ProtocolError::Json(_)));
    }

    #[test]
    fn rejects_missing_sentiment() {
        let frame = r#"{"message": {"id": "m1", "role": "customer", "content": "hi", "timestamp": "10:00:00"}, "suggestions": []}"#;
        assert!(Envelope::parse(frame).is_err());
    }

    #[test]
    fn rejects_bare_message() {
        let frame = r#"{"id": "m1", "role": "customer", "content": "hi", "timestamp": "10:00:00"}"#;
        assert!(Envelope::parse(frame).is_err());
    }

    #[test]
    fn encode_message_is_bare_object() {
        let msg = Message {
            id: "m1".into(),
            role: Role::SupportAgent,
            content: "hello".into(),
            timestamp: "10:00:01".into(),
        };
        let frame = encode_message(&msg).unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["id"], "m1");
        assert_eq!(value["role"], "support agent");
        assert!(value.get("message").is_none());
    }
}
