//! Connection lifecycle as a pure transition function.
//!
//! ```text
//! disconnected ──connect()──▶ connecting ──Opened──▶ connected
//!       ▲                        │                      │
//!       │                      Failed                 Failed
//!       │                        ▼                      │
//!       └──────Closed─────────  error  ◀────────────────┘
//! ```
//!
//! `Closed` moves every state to `disconnected`. `connect()` itself is not an
//! event here: the manager sets `connecting` synchronously when it opens a
//! transport.

use parley_core::ConnectionStatus;

/// Something the transport reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed; the socket is open.
    Opened,
    /// A text frame arrived.
    Received(String),
    /// Transport-level failure (handshake, read or write).
    Failed(String),
    /// The socket closed, remotely or after a failure.
    Closed,
}

impl TransportEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Received(_) => "received",
            Self::Failed(_) => "failed",
            Self::Closed => "closed",
        }
    }
}

/// Side effect the caller performs after moving to [`Transition::next`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Status change only.
    None,
    /// Decode the frame and run the reconcilers.
    ApplyFrame(String),
    /// Event does not fit the current state; nothing changes.
    Discard,
}

/// Outcome of one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Status after the event.
    pub next: ConnectionStatus,
    /// What to do about it.
    pub effect: Effect,
}

impl Transition {
    fn to(next: ConnectionStatus) -> Self {
        Self {
            next,
            effect: Effect::None,
        }
    }

    fn discard(current: ConnectionStatus) -> Self {
        Self {
            next: current,
            effect: Effect::Discard,
        }
    }
}

/// Compute the transition for `event` in state `current`.
pub fn transition(current: ConnectionStatus, event: TransportEvent) -> Transition {
    use ConnectionStatus::{Connected, Connecting, Disconnected, Error};

    match (current, event) {
        (Connecting, TransportEvent::Opened) => Transition::to(Connected),
        (Connected, TransportEvent::Received(frame)) => Transition {
            next: Connected,
            effect: Effect::ApplyFrame(frame),
        },
        (Connecting | Connected, TransportEvent::Failed(_)) => Transition::to(Error),
        (Connecting | Connected | Error, TransportEvent::Closed) => Transition::to(Disconnected),
        (state, _) => Transition::discard(state),
    }
}
