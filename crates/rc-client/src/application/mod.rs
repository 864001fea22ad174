//! Application layer for the remote-control client.
//!
//! # What lives here? (for beginners)
//!
//! This layer holds everything that decides *what* to send to the device and
//! *when*, without knowing how bytes actually travel.  Sockets and HTTP live in
//! `infrastructure`; this code reaches them only through traits
//! ([`transport::Connector`], [`bootstrap::DeviceBootstrap`]), so every use
//! case here can be tested with in-memory fakes.
//!
//! # Sub-modules
//!
//! - **`transport`**       – The port the session uses to open a connection and
//!   exchange frames.  Events are tagged with a generation so late events from
//!   a torn-down connection are ignored.
//!
//! - **`connection`**      – The connection state machine: `Idle`,
//!   `Connecting`, `Connected`, `Disconnecting`, plus the connect-attempt and
//!   heartbeat timers.
//!
//! - **`control_session`** – The orchestrator.  Maps pointer positions,
//!   translates key codes, tracks modifier state and answers heartbeats.
//!
//! - **`session_actor`**   – Runs a session on its own tokio task behind a
//!   cloneable [`session_actor::SessionHandle`].
//!
//! - **`bootstrap`**       – Labels the device and spawns its control script
//!   when a direct connection is not possible.
//!
//! - **`error`**           – [`error::SessionError`], the failure reasons shown
//!   to the user.

pub mod bootstrap;
pub mod connection;
pub mod control_session;
pub mod error;
pub mod session_actor;
pub mod transport;
