//! WebSocket transport for the device control channel.
//!
//! Each [`WebSocketConnector::open`] spawns one task that owns the socket:
//!
//! ```text
//!   connect (bounded by the endpoint timeout)
//!        │
//!        ▼
//!   ┌──────────── select! ────────────┐
//!   │ outbound queue ──▶ Text frame   │
//!   │ socket frame   ──▶ TransportEvent│
//!   └─────────────────────────────────┘
//! ```
//!
//! The task reports everything it sees as [`TransportEvent`]s tagged with the
//! generation it was opened with.  It ends when the socket closes, on the first
//! I/O error, or when the owner drops the outbound queue (after sending a Close
//! frame).  Protocol-level pings are answered by tokio-tungstenite.
//!
//! The handshake asks for the endpoint's subprotocol.  Device daemons that
//! accept the connection without echoing it back are still accepted: the
//! handshake is retried once without the header.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        error::{ProtocolError, SubProtocolError},
        handshake::client::Request,
        http::HeaderValue,
        Error as WsError, Message as WsMessage,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::application::transport::{
    Connector, Endpoint, TransportEvent, TransportEventKind, TransportEventSender, TransportHandle,
};

/// How long to wait for our Close frame to flush before giving up.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors building the handshake request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid WebSocket URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: WsError,
    },
    #[error("invalid subprotocol {0:?}")]
    InvalidSubprotocol(String),
}

/// Opens real WebSocket connections with tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn open(
        &self,
        endpoint: &Endpoint,
        generation: u64,
        events: TransportEventSender,
    ) -> TransportHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(
            endpoint.clone(),
            generation,
            events,
            outbound_rx,
        ));
        TransportHandle::new(outbound_tx, Some(task.abort_handle()))
    }
}

/// Builds the client handshake request with the subprotocol header.
pub fn build_request(endpoint: &Endpoint) -> Result<Request, TransportError> {
    let mut request =
        endpoint
            .url
            .as_str()
            .into_client_request()
            .map_err(|source| TransportError::InvalidUrl {
                url: endpoint.url.clone(),
                source,
            })?;
    let protocol = HeaderValue::from_str(&endpoint.subprotocol)
        .map_err(|_| TransportError::InvalidSubprotocol(endpoint.subprotocol.clone()))?;
    request
        .headers_mut()
        .insert("Sec-WebSocket-Protocol", protocol);
    Ok(request)
}

async fn run_connection(
    endpoint: Endpoint,
    generation: u64,
    events: TransportEventSender,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let emit = |kind: TransportEventKind| {
        // The session may already be gone; nothing left to tell.
        let _ = events.send(TransportEvent { generation, kind });
    };

    let request = match build_request(&endpoint) {
        Ok(r) => r,
        Err(e) => {
            warn!(generation, "{e}");
            emit(TransportEventKind::Error(Some(e.to_string())));
            return;
        }
    };

    // ── Handshake ─────────────────────────────────────────────────────────────
    let ws_stream = match timeout(endpoint.connect_timeout, handshake(&endpoint, request)).await {
        Err(_) => {
            debug!(generation, url = %endpoint.url, "handshake timed out");
            emit(TransportEventKind::TimedOut);
            return;
        }
        Ok(Err(e)) => {
            debug!(generation, url = %endpoint.url, "handshake failed: {e}");
            emit(TransportEventKind::Error(Some(e.to_string())));
            return;
        }
        Ok(Ok(ws_stream)) => ws_stream,
    };
    info!(generation, url = %endpoint.url, "WebSocket connected");
    emit(TransportEventKind::Connected);

    // ── Frame pump ────────────────────────────────────────────────────────────
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(WsMessage::Text(text)).await {
                        emit(error_kind(e));
                        return;
                    }
                }
                None => {
                    // Owner closed the queue: every queued frame has been sent.
                    if timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
                        debug!(generation, "close handshake did not flush in time");
                    }
                    return;
                }
            },

            msg = stream.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => emit(TransportEventKind::Text(text)),
                Some(Ok(WsMessage::Binary(bytes))) => emit(TransportEventKind::Binary(bytes)),
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(frame))) => {
                    let (reason, code) = match frame {
                        Some(f) => (f.reason.into_owned(), u16::from(f.code)),
                        None => (String::new(), 1005),
                    };
                    debug!(generation, code, %reason, "peer sent Close");
                    emit(TransportEventKind::Disconnected { reason, code });
                    return;
                }
                Some(Err(e)) => {
                    emit(error_kind(e));
                    return;
                }
                None => {
                    emit(TransportEventKind::Disconnected { reason: String::new(), code: 1006 });
                    return;
                }
            },
        }
    }
}

/// Connects with `request`; if the server answers without any subprotocol,
/// connects again with a plain request to the same URL.
async fn handshake(
    endpoint: &Endpoint,
    request: Request,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, WsError> {
    match connect_async(request).await {
        Ok((ws_stream, _response)) => Ok(ws_stream),
        Err(WsError::Protocol(ProtocolError::SecWebSocketSubProtocolError(
            SubProtocolError::NoSubProtocol,
        ))) => {
            debug!(url = %endpoint.url, "server did not echo the subprotocol; reconnecting without it");
            let plain = endpoint.url.as_str().into_client_request()?;
            let (ws_stream, _response) = connect_async(plain).await?;
            Ok(ws_stream)
        }
        Err(e) => Err(e),
    }
}

fn error_kind(e: WsError) -> TransportEventKind {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportEventKind::Cancelled,
        other => TransportEventKind::Error(Some(other.to_string())),
    }
}
