//! Error type shared by the session use cases.

use rc_core::AddressError;
use thiserror::Error;

/// Errors surfaced by a control session.
///
/// The `Display` strings of the connection failures are shown to the user
/// verbatim, so they read as sentences.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The supplied address is neither an IPv4 literal nor a hostname.
    #[error("invalid device address: {0:?}")]
    InvalidAddress(String),

    /// A session is already connecting or connected.
    #[error("a control session is already active")]
    SessionActive,

    /// No "connected" signal arrived within the allowed number of ticks.
    #[error("Connection timeout.")]
    ConnectTimeout,

    /// The transport reported a failure with its own message.
    #[error("{0}")]
    Transport(String),

    /// The transport closed without giving a reason.
    #[error("Connection cancelled.")]
    ConnectionCancelled,

    /// The session task is no longer running.
    #[error("control session has stopped")]
    ActorStopped,
}

impl From<AddressError> for SessionError {
    fn from(e: AddressError) -> Self {
        match e {
            AddressError::Invalid(input) => SessionError::InvalidAddress(input),
        }
    }
}
