//! Chat session controller.
//!
//! [`ChatSession`] is the single owner of conversation state: the
//! connection manager, the conversation log, the sentiment state and the
//! role selection. Presentation never sees these directly; it reads
//! immutable [`SessionSnapshot`]s, either on demand or from the watch
//! channel returned by [`ChatSession::subscribe`], and calls back with
//! intents (`send`, `change_role`, `reconnect`).
//!
//! All mutation happens through `&mut self`, so intents and transport
//! events are serialized by whoever drives the session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use parley_core::{
    Applied, ConnectionStatus, ConversationLog, Envelope, Message, Role, SentimentSnapshot,
    SentimentState, SessionId, apply_envelope,
};

use crate::endpoint::Endpoint;
use crate::manager::{ConnectionManager, ConnectionUpdate};
use crate::transport::Connector;

/// Read-only view of everything presentation renders.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Session identity.
    pub session_id: SessionId,
    /// Transport status.
    pub status: ConnectionStatus,
    /// Role the local user is typing as.
    pub role: Role,
    /// Conversation in arrival order.
    pub messages: Vec<Message>,
    /// Latest sentiment.
    pub sentiment: SentimentSnapshot,
    /// Latest coaching suggestions.
    pub suggestions: Vec<String>,
}

impl SessionSnapshot {
    /// Whether presentation should offer a reconnect action.
    pub fn offers_reconnect(&self) -> bool {
        self.status.offers_reconnect()
    }

    /// Suggestions meant for the current role. Coaching is for agents only.
    pub fn visible_suggestions(&self) -> &[String] {
        match self.role {
            Role::SupportAgent => &self.suggestions,
            Role::Customer => &[],
        }
    }
}

/// What a processed transport event changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Connection status moved.
    Status {
        /// Previous status.
        from: ConnectionStatus,
        /// New status.
        to: ConnectionStatus,
    },
    /// A well-formed envelope was reconciled.
    Envelope(Applied),
    /// A frame failed to decode and was dropped; nothing changed.
    Rejected {
        /// Decoder error text.
        error: String,
    },
}

/// One chat session bound to one session identity.
pub struct ChatSession {
    manager: ConnectionManager,
    log: ConversationLog,
    sentiment: SentimentState,
    role: Role,
    snapshots: watch::Sender<Arc<SessionSnapshot>>,
}

impl ChatSession {
    /// Create a session with a fresh identity. Call [`connect`](Self::connect) to go online.
    pub fn new(endpoint: &Endpoint, connector: Arc<dyn Connector>) -> Self {
        Self::with_session_id(SessionId::new(), endpoint, connector)
    }

    /// Create a session with a given identity.
    pub fn with_session_id(
        session_id: SessionId,
        endpoint: &Endpoint,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let manager = ConnectionManager::new(session_id, endpoint, connector);
        let log = ConversationLog::new();
        let sentiment = SentimentState::default();
        let role = Role::default();
        let initial = Arc::new(SessionSnapshot {
            session_id: manager.session_id().clone(),
            status: manager.status(),
            role,
            messages: Vec::new(),
            sentiment: sentiment.snapshot().clone(),
            suggestions: Vec::new(),
        });
        let (snapshots, _) = watch::channel(initial);
        Self {
            manager,
            log,
            sentiment,
            role,
            snapshots,
        }
    }

    /// Session identity.
    pub fn session_id(&self) -> &SessionId {
        self.manager.session_id()
    }

    /// Socket URL.
    pub fn url(&self) -> &str {
        self.manager.url()
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.manager.status()
    }

    /// Current role selection.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Conversation log.
    pub fn conversation(&self) -> &ConversationLog {
        &self.log
    }

    /// Sentiment state.
    pub fn sentiment(&self) -> &SentimentState {
        &self.sentiment
    }

    /// Build a snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id().clone(),
            status: self.status(),
            role: self.role,
            messages: self.log.messages().to_vec(),
            sentiment: self.sentiment.snapshot().clone(),
            suggestions: self.sentiment.suggestions().to_vec(),
        }
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        let _ = self.snapshots.send_replace(Arc::new(self.snapshot()));
    }

    /// Open the transport (disposing of any previous one).
    pub fn connect(&mut self) {
        let _ = self.manager.connect();
        self.publish();
    }

    /// User-initiated reconnect. Same as [`connect`](Self::connect).
    pub fn reconnect(&mut self) {
        info!(session_id = %self.session_id(), status = %self.status(), "reconnect requested");
        self.connect();
    }

    /// Close the transport; later transport events are ignored.
    pub fn disconnect(&mut self) {
        let update = self.manager.disconnect();
        if update.from != update.to {
            self.publish();
        }
    }

    /// Change the role used for subsequent sends.
    pub fn change_role(&mut self, role: Role) {
        if self.role == role {
            return;
        }
        debug!(session_id = %self.session_id(), from = %self.role, to = %role, "role changed");
        self.role = role;
        self.publish();
    }

    /// Compose and send `content` as the current role.
    ///
    /// Blank input and sends while not connected are dropped silently and
    /// return `None`.
    pub fn send(&mut self, content: &str) -> Option<Message> {
        if content.trim().is_empty() || !self.status().can_send() {
            return None;
        }
        let message = Message::compose(self.role, content);
        self.send_message(message.clone()).then_some(message)
    }

    /// Send an already-built message and reflect it in the log.
    ///
    /// Returns `false` (and changes nothing) unless the frame was queued.
    pub fn send_message(&mut self, message: Message) -> bool {
        match self.manager.send(&message) {
            Ok(true) => {
                let _ = self.log.merge(message);
                self.publish();
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(session_id = %self.session_id(), error = %e, "failed to encode outbound message");
                false
            }
        }
    }

    /// Wait for the next transport event and apply it.
    ///
    /// For an inbound frame, the conversation log and the sentiment state
    /// are both updated before the snapshot is published.
    pub async fn next_event(&mut self) -> Option<SessionUpdate> {
        let update = self.manager.next_update().await?;
        Some(self.absorb(update))
    }

    /// Apply transport events that are already queued, without waiting.
    pub fn process_ready(&mut self) -> Vec<SessionUpdate> {
        self.manager
            .drain_ready()
            .into_iter()
            .map(|update| self.absorb(update))
            .collect()
    }

    fn absorb(&mut self, update: ConnectionUpdate) -> SessionUpdate {
        let ConnectionUpdate { from, to, frame } = update;
        let result = match frame {
            Some(frame) => self.reconcile_frame(&frame),
            None => SessionUpdate::Status { from, to },
        };
        if !matches!(result, SessionUpdate::Rejected { .. }) {
            self.publish();
        }
        result
    }

    fn reconcile_frame(&mut self, frame: &str) -> SessionUpdate {
        match Envelope::parse(frame) {
            Ok(envelope) => {
                let applied = apply_envelope(&mut self.log, &mut self.sentiment, envelope);
                debug!(
                    session_id = %self.session_id(),
                    message_id = %applied.message_id,
                    appended = applied.appended,
                    score = self.sentiment.snapshot().score,
                    "envelope applied"
                );
                SessionUpdate::Envelope(applied)
            }
            Err(e) => {
                warn!(
                    session_id = %self.session_id(),
                    error = %e,
                    frame_len = frame.len(),
                    "dropping malformed frame"
                );
                SessionUpdate::Rejected {
                    error: e.to_string(),
                }
            }
        }
    }
}
