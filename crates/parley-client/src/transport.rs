//! Transport seam and the `tokio-tungstenite` implementation.
//!
//! A [`Connector`] opens one socket per call and runs it on its own task.
//! The task never touches session state: it only forwards
//! [`TransportEvent`]s, tagged with the generation it was opened for, into
//! the manager's event channel, and drains outbound frames from the
//! [`TransportHandle`]. Cancelling the handle ends the task without emitting
//! anything further.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use parley_settings::ConnectionSettings;

use crate::state_machine::TransportEvent;

/// A transport event with the connection generation that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedEvent {
    /// Generation assigned by the manager when the transport was opened.
    pub generation: u64,
    /// What happened.
    pub event: TransportEvent,
}

/// Where transports deliver their events.
pub type EventSink = mpsc::UnboundedSender<TaggedEvent>;

/// Owner's side of a running transport.
///
/// Dropping the handle closes the transport.
#[derive(Debug)]
pub struct TransportHandle {
    outbound: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl TransportHandle {
    /// Wrap the outbound queue and the cancellation token of a transport task.
    pub fn new(outbound: mpsc::Sender<String>, cancel: CancellationToken) -> Self {
        Self { outbound, cancel }
    }

    /// Queue a text frame. Returns `false` if the queue is full or the
    /// transport task has ended.
    pub fn try_send(&self, frame: String) -> bool {
        self.outbound.try_send(frame).is_ok()
    }

    /// Stop the transport. No events are emitted after this returns.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Opens transports. The seam between the connection manager and the network.
pub trait Connector: Send + Sync {
    /// Start a transport to `url`. Must not block; completion is reported
    /// later through `events` as `Opened` or `Failed` + `Closed`.
    fn open(&self, url: &str, generation: u64, events: EventSink) -> TransportHandle;
}

/// WebSocket connector backed by `tokio-tungstenite`.
///
/// [`Connector::open`] spawns onto the current tokio runtime.
#[derive(Clone, Debug)]
pub struct WsConnector {
    connect_timeout: Duration,
    outbound_buffer: usize,
}

impl WsConnector {
    /// Create a connector.
    pub fn new(connect_timeout: Duration, outbound_buffer: usize) -> Self {
        Self {
            connect_timeout,
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    /// Create a connector from the `connection` settings section.
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.connect_timeout_ms),
            settings.outbound_buffer,
        )
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::from_settings(&ConnectionSettings::default())
    }
}

impl Connector for WsConnector {
    fn open(&self, url: &str, generation: u64, events: EventSink) -> TransportHandle {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        let cancel = CancellationToken::new();
        let emitter = Emitter {
            url: url.to_owned(),
            generation,
            events,
            cancel: cancel.clone(),
        };
        drop(tokio::spawn(run_transport(emitter, rx, self.connect_timeout)));
        TransportHandle::new(tx, cancel)
    }
}

/// Event forwarding for one transport task.
struct Emitter {
    url: String,
    generation: u64,
    events: EventSink,
    cancel: CancellationToken,
}

impl Emitter {
    fn emit(&self, event: TransportEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.events.send(TaggedEvent {
            generation: self.generation,
            event,
        });
    }

    fn fail(&self, reason: String) {
        warn!(url = %self.url, generation = self.generation, %reason, "transport failed");
        self.emit(TransportEvent::Failed(reason));
        self.emit(TransportEvent::Closed);
    }
}

async fn run_transport(
    emitter: Emitter,
    mut outbound: mpsc::Receiver<String>,
    connect_timeout: Duration,
) {
    let handshake = tokio::time::timeout(connect_timeout, connect_async(emitter.url.as_str()));
    let ws = tokio::select! {
        biased;
        () = emitter.cancel.cancelled() => return,
        result = handshake => match result {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                emitter.fail(format!("connect: {e}"));
                return;
            }
            Err(_) => {
                let ms = connect_timeout.as_millis();
                emitter.fail(format!("connect timed out after {ms}ms"));
                return;
            }
        },
    };

    debug!(url = %emitter.url, generation = emitter.generation, "transport open");
    emitter.emit(TransportEvent::Opened);
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            biased;
            () = emitter.cancel.cancelled() => {
                let _ = ws_tx.send(WsMessage::Close(None)).await;
                break;
            }
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    break;
                };
                if let Err(e) = ws_tx.send(WsMessage::Text(frame.into())).await {
                    emitter.fail(format!("write: {e}"));
                    break;
                }
            }
            msg = ws_rx.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => {
                    emitter.emit(TransportEvent::Received(text.as_str().to_owned()));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(generation = emitter.generation, ?frame, "remote closed");
                    emitter.emit(TransportEvent::Closed);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emitter.fail(format!("read: {e}"));
                    break;
                }
                None => {
                    emitter.emit(TransportEvent::Closed);
                    break;
                }
            },
        }
    }
}
