//! Mock connector for unit and integration testing.
//!
//! Records every connection the session opens and every frame it sends,
//! and lets tests inject transport events without a network.  Only the most
//! recently opened connection is "live": `emit` targets it and `sent_frames`
//! reports its frames.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::application::transport::{
    Connector, Endpoint, TransportEvent, TransportEventKind, TransportEventSender, TransportHandle,
};

struct OpenedTransport {
    endpoint: Endpoint,
    generation: u64,
    events: TransportEventSender,
    outbound: mpsc::UnboundedReceiver<String>,
    sent: Vec<String>,
}

impl OpenedTransport {
    fn drain(&mut self) {
        while let Ok(frame) = self.outbound.try_recv() {
            self.sent.push(frame);
        }
    }
}

#[derive(Default)]
struct MockState {
    opened: Vec<OpenedTransport>,
    answers: VecDeque<TransportEventKind>,
}

/// A [`Connector`] that never touches the network.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues events that answer future `open` calls, one per call, as soon
    /// as the connection is opened.
    pub fn answer_opens_with(&self, answers: Vec<TransportEventKind>) {
        self.state.lock().expect("lock poisoned").answers.extend(answers);
    }

    /// Number of connections opened so far.
    pub fn open_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").opened.len()
    }

    pub fn last_endpoint(&self) -> Option<Endpoint> {
        let state = self.state.lock().expect("lock poisoned");
        state.opened.last().map(|t| t.endpoint.clone())
    }

    pub fn last_generation(&self) -> Option<u64> {
        let state = self.state.lock().expect("lock poisoned");
        state.opened.last().map(|t| t.generation)
    }

    /// Delivers `kind` as if the live connection observed it.
    ///
    /// Panics if nothing has been opened yet.
    pub fn emit(&self, kind: TransportEventKind) {
        let state = self.state.lock().expect("lock poisoned");
        let live = state.opened.last().expect("emit called before open");
        let _ = live.events.send(TransportEvent {
            generation: live.generation,
            kind,
        });
    }

    /// Delivers `kind` tagged with a generation older than the live one.
    pub fn emit_stale(&self, kind: TransportEventKind) {
        let state = self.state.lock().expect("lock poisoned");
        let live = state.opened.last().expect("emit_stale called before open");
        let _ = live.events.send(TransportEvent {
            generation: live.generation.wrapping_sub(1),
            kind,
        });
    }

    /// Frames sent on the live connection, oldest first.
    pub fn sent_frames(&self) -> Vec<String> {
        let mut state = self.state.lock().expect("lock poisoned");
        match state.opened.last_mut() {
            Some(live) => {
                live.drain();
                live.sent.clone()
            }
            None => Vec::new(),
        }
    }

    /// The `"mode"` field of every frame in [`MockConnector::sent_frames`].
    pub fn sent_modes(&self) -> Vec<String> {
        self.sent_frames()
            .iter()
            .filter_map(|frame| {
                let value: serde_json::Value = serde_json::from_str(frame).ok()?;
                value.get("mode")?.as_str().map(str::to_owned)
            })
            .collect()
    }

    /// Returns `true` once the session has released the live connection.
    pub fn transport_closed(&self) -> bool {
        let state = self.state.lock().expect("lock poisoned");
        state
            .opened
            .last()
            .map(|t| t.outbound.is_closed())
            .unwrap_or(false)
    }
}

impl Connector for MockConnector {
    fn open(
        &self,
        endpoint: &Endpoint,
        generation: u64,
        events: TransportEventSender,
    ) -> TransportHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().expect("lock poisoned");

        if let Some(kind) = state.answers.pop_front() {
            let _ = events.send(TransportEvent { generation, kind });
        }
        state.opened.push(OpenedTransport {
            endpoint: endpoint.clone(),
            generation,
            events,
            outbound: rx,
            sent: Vec::new(),
        });

        TransportHandle::new(tx, None)
    }
}
