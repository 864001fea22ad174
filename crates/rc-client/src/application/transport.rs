//! Transport port: how the session talks to whatever carries its frames.
//!
//! The application layer never touches sockets.  It asks a [`Connector`] to
//! open a connection and gets back a [`TransportHandle`] for outbound frames;
//! everything the connection observes (handshake done, frames, close, errors)
//! comes back as [`TransportEvent`]s on a channel owned by the session task.
//!
//! Every connection attempt is tagged with a *generation* number.  Events
//! carrying an older generation belong to a transport that has already been
//! torn down and are ignored by the receiver.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Where and how to open the control connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Full WebSocket URL, e.g. `ws://10.0.0.5:46968`.
    pub url: String,
    /// Value of the `Sec-WebSocket-Protocol` request header.
    pub subprotocol: String,
    /// Upper bound for DNS + TCP + handshake.
    pub connect_timeout: Duration,
}

/// What happened on a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// The handshake completed; frames may now flow.
    Connected,
    /// A text frame arrived.
    Text(String),
    /// A binary frame arrived.
    Binary(Vec<u8>),
    /// The peer closed the connection.
    Disconnected { reason: String, code: u16 },
    /// The handshake did not complete within the endpoint's timeout.
    TimedOut,
    /// The connection ended without any reason being available.
    Cancelled,
    /// An I/O or protocol error, with its description if one exists.
    Error(Option<String>),
}

/// A [`TransportEventKind`] tagged with the connection attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: u64,
    pub kind: TransportEventKind,
}

/// Sender half handed to connectors for reporting events.
pub type TransportEventSender = mpsc::UnboundedSender<TransportEvent>;

/// Opens connections for the session.
///
/// `open` must not block: it starts the connection in the background and
/// returns immediately.
pub trait Connector: Send + Sync {
    fn open(&self, endpoint: &Endpoint, generation: u64, events: TransportEventSender)
        -> TransportHandle;
}

/// Owner-side handle of one open (or opening) connection.
///
/// Frames are queued in FIFO order.  Dropping the handle aborts the
/// connection task; [`TransportHandle::close`] lets queued frames drain first.
#[derive(Debug)]
pub struct TransportHandle {
    outbound: Option<mpsc::UnboundedSender<String>>,
    task: Option<AbortHandle>,
}

impl TransportHandle {
    /// Wraps an outbound queue and the task driving the connection, if any.
    pub fn new(outbound: mpsc::UnboundedSender<String>, task: Option<AbortHandle>) -> Self {
        Self {
            outbound: Some(outbound),
            task,
        }
    }

    /// Queues a text frame.  Returns `false` if the connection is gone.
    pub fn send(&self, frame: String) -> bool {
        self.outbound
            .as_ref()
            .map(|tx| tx.send(frame).is_ok())
            .unwrap_or(false)
    }

    /// Closes the outbound queue and lets the connection finish on its own.
    pub fn close(mut self) {
        self.outbound = None;
        // Detach: the task ends once the queue is drained.
        self.task = None;
    }

    /// Aborts the connection immediately, discarding queued frames.
    pub fn force_close(self) {
        drop(self);
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
