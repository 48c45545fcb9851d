//! Reconcilers: the only way inbound data reaches conversation state.
//!
//! - [`ConversationLog::merge`]: append-if-absent keyed on message id.
//!   Applying the same message any number of times yields the same log.
//! - [`SentimentState::replace`]: last write wins for the snapshot and the
//!   suggestion list together.

use std::collections::HashSet;

use crate::envelope::Envelope;
use crate::ids::MessageId;
use crate::messages::Message;
use crate::sentiment::SentimentSnapshot;

/// Insertion-ordered message log, unique by id.
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    seen: HashSet<MessageId>,
}

impl ConversationLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` unless a message with the same id is already present.
    ///
    /// Returns `true` if the log grew.
    pub fn merge(&mut self, message: Message) -> bool {
        if self.seen.contains(&message.id) {
            return false;
        }
        let _ = self.seen.insert(message.id.clone());
        self.messages.push(message);
        true
    }

    /// Whether a message with `id` is present.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Current sentiment snapshot plus coaching suggestions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SentimentState {
    snapshot: SentimentSnapshot,
    suggestions: Vec<String>,
}

impl SentimentState {
    /// Replace both the snapshot and the suggestions.
    pub fn replace(&mut self, snapshot: SentimentSnapshot, suggestions: Vec<String>) {
        self.snapshot = snapshot;
        self.suggestions = suggestions;
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &SentimentSnapshot {
        &self.snapshot
    }

    /// Current suggestions.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

/// Result of applying one envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    /// Id of the envelope's message.
    pub message_id: MessageId,
    /// Whether the message was new to the log.
    pub appended: bool,
}

/// Apply a well-formed envelope to both pieces of state in one step.
pub fn apply_envelope(
    log: &mut ConversationLog,
    sentiment: &mut SentimentState,
    envelope: Envelope,
) -> Applied {
    let Envelope {
        message,
        sentiment: snapshot,
        suggestions,
    } = envelope;
    let message_id = message.id.clone();
    let appended = log.merge(message);
    sentiment.replace(snapshot, suggestions);
    Applied {
        message_id,
        appended,
    }
}
