//! # parley-core
//!
//! Shared vocabulary for the Parley chat client:
//!
//! - **Branded IDs**: [`SessionId`], [`MessageId`]
//! - **Messages**: [`Message`] and [`Role`]
//! - **Sentiment**: [`SentimentSnapshot`] with normalized score and tone
//! - **Wire frames**: inbound [`Envelope`], outbound [`encode_message`]
//! - **Connection status**: [`ConnectionStatus`]
//! - **Reconcilers**: [`ConversationLog`], [`SentimentState`], [`apply_envelope`]
//! - **Errors**: [`ProtocolError`]
//! - **Logging**: `tracing` subscriber setup and test capture

#![deny(unsafe_code)]

pub mod envelope;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod reconcile;
pub mod sentiment;
pub mod status;

pub use envelope::{Envelope, encode_message};
pub use errors::ProtocolError;
pub use ids::{MessageId, SessionId};
pub use messages::{Message, Role, TIMESTAMP_FORMAT};
pub use reconcile::{Applied, ConversationLog, SentimentState, apply_envelope};
pub use sentiment::{SentimentSnapshot, Tone};
pub use status::ConnectionStatus;
