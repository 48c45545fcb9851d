//! Scripted connector for driving sessions without a network.
//!
//! Every [`Connector::open`] call records a [`MockTransport`]. Tests then
//! play transport events into it and read back the frames the client
//! queued.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::state_machine::TransportEvent;
use crate::transport::{Connector, EventSink, TaggedEvent, TransportHandle};

/// One transport opened through [`MockConnector`].
pub struct MockTransport {
    /// URL the client asked for.
    pub url: String,
    /// Generation the manager assigned.
    pub generation: u64,
    events: EventSink,
    outbound: mpsc::Receiver<String>,
    cancel: CancellationToken,
}

impl MockTransport {
    /// Deliver `event` as this transport would.
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(TaggedEvent {
            generation: self.generation,
            event,
        });
    }

    /// Frames queued so far, oldest first.
    pub fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Whether the client closed this transport.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Connector that hands out [`MockTransport`]s.
#[derive(Clone)]
pub struct MockConnector {
    opened: Arc<Mutex<Vec<MockTransport>>>,
    buffer: usize,
}

impl MockConnector {
    /// Connector whose transports queue up to 16 outbound frames.
    pub fn new() -> Self {
        Self::with_buffer(16)
    }

    /// Connector with a specific outbound queue capacity.
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            opened: Arc::default(),
            buffer: buffer.max(1),
        }
    }

    /// Number of transports opened.
    pub fn opened(&self) -> usize {
        self.opened.lock().len()
    }

    /// Run `f` against the `index`-th transport.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `index + 1` transports were opened.
    pub fn with<R>(&self, index: usize, f: impl FnOnce(&mut MockTransport) -> R) -> R {
        let mut opened = self.opened.lock();
        f(&mut opened[index])
    }

    /// Deliver `event` on the `index`-th transport.
    pub fn emit(&self, index: usize, event: TransportEvent) {
        self.with(index, |t| t.emit(event));
    }

    /// Drain frames queued on the `index`-th transport.
    pub fn frames(&self, index: usize) -> Vec<String> {
        self.with(index, MockTransport::drain_frames)
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for MockConnector {
    fn open(&self, url: &str, generation: u64, events: EventSink) -> TransportHandle {
        let (tx, rx) = mpsc::channel(self.buffer);
        let cancel = CancellationToken::new();
        self.opened.lock().push(MockTransport {
            url: url.to_owned(),
            generation,
            events,
            outbound: rx,
            cancel: cancel.clone(),
        });
        TransportHandle::new(tx, cancel)
    }
}
