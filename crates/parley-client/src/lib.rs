//! # parley-client
//!
//! Client side of the live chat protocol:
//!
//! - [`Endpoint`]: socket URL scoped to a session identity
//! - [`state_machine`]: pure connection lifecycle transitions
//! - [`Connector`] / [`WsConnector`]: transport seam and its `tokio-tungstenite` implementation
//! - [`ConnectionManager`]: one live transport per session, generation-tagged events
//! - [`ChatSession`]: owns conversation and sentiment state, publishes [`SessionSnapshot`]s
//! - [`testing`]: scripted connector for driving sessions without a network

#![deny(unsafe_code)]

pub mod endpoint;
pub mod errors;
pub mod manager;
pub mod session;
pub mod state_machine;
pub mod testing;
pub mod transport;

pub use endpoint::Endpoint;
pub use errors::{ClientError, Result};
pub use manager::{ConnectionManager, ConnectionUpdate};
pub use session::{ChatSession, SessionSnapshot, SessionUpdate};
pub use state_machine::{Effect, Transition, TransportEvent, transition};
pub use transport::{Connector, EventSink, TaggedEvent, TransportHandle, WsConnector};
