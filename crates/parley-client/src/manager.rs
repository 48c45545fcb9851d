//! Connection manager: one live transport per session identity.
//!
//! The manager owns the transport handle exclusively. Every `connect()`
//! opens a new generation; events carry the generation they were produced
//! under and anything from an older generation is dropped on receipt. That
//! is what makes `connect()` while open and `disconnect()` final: the
//! previous transport is cancelled, and whatever it already queued can no
//! longer move the status.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use parley_core::{ConnectionStatus, Message, SessionId, encode_message};

use crate::endpoint::Endpoint;
use crate::errors::Result;
use crate::state_machine::{Effect, TransportEvent, transition};
use crate::transport::{Connector, EventSink, TaggedEvent, TransportHandle};

/// What one accepted transport event did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionUpdate {
    /// Status before the event.
    pub from: ConnectionStatus,
    /// Status after the event.
    pub to: ConnectionStatus,
    /// Inbound frame to reconcile, if the event carried one.
    pub frame: Option<String>,
}

/// Supervises the socket for one session.
pub struct ConnectionManager {
    session_id: SessionId,
    url: String,
    connector: Arc<dyn Connector>,
    status: ConnectionStatus,
    generation: u64,
    live: Option<TransportHandle>,
    events_tx: EventSink,
    events_rx: mpsc::UnboundedReceiver<TaggedEvent>,
}

impl ConnectionManager {
    /// Create a manager in `disconnected` state. Nothing is opened yet.
    pub fn new(session_id: SessionId, endpoint: &Endpoint, connector: Arc<dyn Connector>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let url = endpoint.session_url(&session_id);
        Self {
            session_id,
            url,
            connector,
            status: ConnectionStatus::Disconnected,
            generation: 0,
            live: None,
            events_tx,
            events_rx,
        }
    }

    /// Session identity the endpoint is scoped to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Socket URL for this session.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Generation of the live (or last) transport.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Open a new transport, disposing of any previous one first.
    ///
    /// Status is `connecting` when this returns; the outcome arrives later
    /// through [`next_update`](Self::next_update).
    pub fn connect(&mut self) -> ConnectionUpdate {
        let from = self.status;
        self.dispose();
        self.generation += 1;
        self.status = ConnectionStatus::Connecting;
        info!(
            session_id = %self.session_id,
            generation = self.generation,
            url = %self.url,
            "connecting"
        );
        self.live = Some(self.connector.open(&self.url, self.generation, self.events_tx.clone()));
        ConnectionUpdate {
            from,
            to: self.status,
            frame: None,
        }
    }

    /// Close the transport. No later event changes the status.
    pub fn disconnect(&mut self) -> ConnectionUpdate {
        let from = self.status;
        if self.dispose() {
            info!(session_id = %self.session_id, generation = self.generation, "disconnected locally");
        }
        // Retire the generation so queued events from the old transport are ignored.
        self.generation += 1;
        self.status = ConnectionStatus::Disconnected;
        ConnectionUpdate {
            from,
            to: self.status,
            frame: None,
        }
    }

    fn dispose(&mut self) -> bool {
        match self.live.take() {
            Some(handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    /// Queue `message` for sending.
    ///
    /// Returns `Ok(false)` without doing anything unless the status is
    /// `connected`, or when the outbound queue refuses the frame.
    pub fn send(&self, message: &Message) -> Result<bool> {
        let Some(handle) = self.live.as_ref().filter(|_| self.status.can_send()) else {
            debug!(
                session_id = %self.session_id,
                status = %self.status,
                message_id = %message.id,
                "not connected, dropping send"
            );
            return Ok(false);
        };
        let frame = encode_message(message)?;
        let queued = handle.try_send(frame);
        if !queued {
            debug!(session_id = %self.session_id, message_id = %message.id, "outbound queue refused frame");
        }
        Ok(queued)
    }

    /// Apply one tagged event.
    ///
    /// Returns `None` for events from a retired generation and for events
    /// that do not fit the current state.
    pub fn apply(&mut self, tagged: TaggedEvent) -> Option<ConnectionUpdate> {
        let TaggedEvent { generation, event } = tagged;
        if generation != self.generation {
            debug!(
                session_id = %self.session_id,
                generation,
                live_generation = self.generation,
                kind = event.kind(),
                "ignoring event from retired transport"
            );
            return None;
        }

        if let TransportEvent::Failed(reason) = &event {
            debug!(session_id = %self.session_id, %reason, "transport reported failure");
        }
        let kind = event.kind();
        let from = self.status;
        let step = transition(from, event);
        let frame = match step.effect {
            Effect::None => None,
            Effect::ApplyFrame(frame) => Some(frame),
            Effect::Discard => {
                debug!(session_id = %self.session_id, status = %from, kind, "discarding out-of-state event");
                return None;
            }
        };
        self.status = step.next;
        if step.next == ConnectionStatus::Disconnected {
            self.live = None;
        }
        if from != step.next {
            info!(session_id = %self.session_id, from = %from, to = %step.next, "connection status changed");
        }
        Some(ConnectionUpdate {
            from,
            to: step.next,
            frame,
        })
    }

    /// Wait for the next event from the live transport and apply it.
    ///
    /// Stale and out-of-state events are consumed silently. The manager
    /// keeps its own sender alive, so this only returns `None` if the
    /// channel is somehow closed.
    pub async fn next_update(&mut self) -> Option<ConnectionUpdate> {
        loop {
            let tagged = self.events_rx.recv().await?;
            if let Some(update) = self.apply(tagged) {
                return Some(update);
            }
        }
    }

    /// Apply any events already queued, without waiting.
    pub fn drain_ready(&mut self) -> Vec<ConnectionUpdate> {
        let mut updates = Vec::new();
        while let Ok(tagged) = self.events_rx.try_recv() {
            if let Some(update) = self.apply(tagged) {
                updates.push(update);
            }
        }
        updates
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}
