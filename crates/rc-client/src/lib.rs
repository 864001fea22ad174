//! rc-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does rc-client do? (for beginners)
//!
//! The client drives a remote device (a phone or tablet running a control
//! daemon) from a desktop.  The device streams its screen elsewhere; this
//! crate handles the *input* side:
//!
//! 1. Asks the device's HTTP API for its name and whether the control daemon
//!    is running, spawning it from a script when needed.
//! 2. Opens a WebSocket to the daemon (`ws://<device>:46968`, subprotocol
//!    `RC`) and keeps it alive with heartbeats.
//! 3. Turns local pointer and keyboard events into the daemon's JSON
//!    commands, mapping coordinates onto the device screen and key codes
//!    onto browser key codes.
//! 4. Surfaces what the device sends back (screen size, clipboard text,
//!    screenshots) to whoever embeds the session.

/// Application layer: session orchestration, connection state, and ports.
pub mod application;

/// Infrastructure layer: WebSocket transport, HTTP bootstrap, config, console.
pub mod infrastructure;
