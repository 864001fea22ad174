//! Device bootstrap: getting a device ready to accept a control session.
//!
//! Besides the WebSocket control port, the device runs a small HTTP API that
//! reports its name, reports whether the control daemon is running, and can
//! spawn that daemon from a script supplied by the client.  This module
//! defines the port ([`DeviceBootstrap`]) and the flow that uses it
//! ([`bootstrap_session`]); the HTTP implementation lives in
//! `infrastructure::device_api`.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::error::SessionError;
use super::session_actor::SessionHandle;

/// Status code meaning a direct connection attempt is pointless: the control
/// script has to be spawned first.
pub const SCRIPT_REQUIRED_STATUS: &str = "f00";

/// Failures talking to the device's HTTP API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceApiError {
    #[error("{0}")]
    Http(String),
    #[error("Failed to decode response.")]
    DecodeResponse,
    #[error("Invalid response.")]
    InvalidResponse,
}

/// Result of asking the device to spawn its control script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// HTTP-side operations on a device.
#[async_trait]
pub trait DeviceBootstrap: Send + Sync {
    /// Returns the trimmed status code string.
    async fn fetch_status(&self, address: &str) -> Result<String, DeviceApiError>;

    /// Returns the device's display name.
    async fn fetch_device_name(&self, address: &str) -> Result<String, DeviceApiError>;

    /// Uploads `script` and asks the device to run it.
    async fn spawn_control_script(
        &self,
        address: &str,
        script: &[u8],
    ) -> Result<SpawnOutcome, DeviceApiError>;
}

/// Why a bootstrap did not end in a connected session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error(transparent)]
    Api(#[from] DeviceApiError),
    #[error("{}", .0.as_deref().unwrap_or("The device refused to start the control script."))]
    SpawnRejected(Option<String>),
    #[error("no control script available to spawn")]
    MissingScript,
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Labels the session, then connects, spawning the control script when needed.
///
/// 1. The device name (or the address, if the name is unavailable) becomes
///    the session label.
/// 2. Unless the status says the script must be spawned first, a direct
///    connection is attempted.  Success ends the bootstrap.
/// 3. Otherwise `script` is spawned and a second connection is attempted.
///
/// # Errors
///
/// Address and "session already active" errors are returned immediately.
/// Spawn failures carry the device's message.
pub async fn bootstrap_session(
    handle: &SessionHandle,
    api: &dyn DeviceBootstrap,
    address: &str,
    script: Option<&[u8]>,
) -> Result<(), BootstrapError> {
    let label = match api.fetch_device_name(address).await {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => address.to_string(),
        Err(e) => {
            warn!(%address, error = %e, "could not fetch device name");
            address.to_string()
        }
    };
    handle.set_device_label(&label)?;

    let direct_first = match api.fetch_status(address).await {
        Ok(status) => {
            info!(%address, %status, "device status");
            status != SCRIPT_REQUIRED_STATUS
        }
        Err(e) => {
            warn!(%address, error = %e, "could not fetch device status");
            true
        }
    };

    if direct_first {
        match handle.connect(address).await {
            Ok(()) => return Ok(()),
            Err(
                e @ (SessionError::InvalidAddress(_)
                | SessionError::SessionActive
                | SessionError::ActorStopped),
            ) => return Err(e.into()),
            Err(e) => {
                info!(%address, reason = %e, "direct connection failed; spawning control script")
            }
        }
    }

    let script = script.ok_or(BootstrapError::MissingScript)?;
    let outcome = api.spawn_control_script(address, script).await?;
    if !outcome.success {
        return Err(BootstrapError::SpawnRejected(outcome.message));
    }
    info!(%address, "control script spawned");

    handle.connect(address).await?;
    Ok(())
}
