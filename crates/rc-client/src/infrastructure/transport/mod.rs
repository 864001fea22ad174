//! Implementations of the [`Connector`](crate::application::transport::Connector) port.
//!
//! - **`websocket`** – the real transport (tokio-tungstenite).
//! - **`mock`**      – records frames and injects events; used by tests.

pub mod mock;
pub mod websocket;

pub use websocket::WebSocketConnector;
