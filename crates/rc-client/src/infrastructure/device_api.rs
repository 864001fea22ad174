//! HTTP client for the device's bootstrap API.
//!
//! The device serves three plain-HTTP endpoints next to its control port:
//!
//! | Request            | Body             | Response                          |
//! |--------------------|------------------|-----------------------------------|
//! | `POST /status`     | none             | status code text, e.g. `f00`      |
//! | `GET /devicename`  | none             | display name text                 |
//! | `POST /spawn`      | control script   | `{"code": 0, "message": "..."}`   |
//!
//! `code == 0` means the script was started.  The spawn body is read whatever
//! the HTTP status, since a refusal still carries the `message` to show.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::application::bootstrap::{DeviceApiError, DeviceBootstrap, SpawnOutcome};

/// `reqwest`-backed [`DeviceBootstrap`].
#[derive(Debug, Clone)]
pub struct DeviceApi {
    client: reqwest::Client,
    port: u16,
}

#[derive(Debug, Deserialize)]
struct SpawnResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

impl DeviceApi {
    /// Builds a client for devices listening on `port`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceApiError::Http`] if the HTTP client cannot be built.
    pub fn new(port: u16, timeout: Duration) -> Result<Self, DeviceApiError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| DeviceApiError::Http(e.to_string()))?;
        Ok(Self { client, port })
    }

    fn url(&self, address: &str, path: &str) -> String {
        format!("http://{}:{}/{}", address, self.port, path)
    }

    async fn text(&self, request: reqwest::RequestBuilder) -> Result<String, DeviceApiError> {
        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DeviceApiError::Http(e.to_string()))?
            .text()
            .await
            .map_err(|_| DeviceApiError::DecodeResponse)
    }
}

/// Interprets the body of a `spawn` response.
///
/// # Errors
///
/// [`DeviceApiError::DecodeResponse`] if the body is not JSON,
/// [`DeviceApiError::InvalidResponse`] if it lacks an integer `code`.
pub fn parse_spawn_response(body: &[u8]) -> Result<SpawnOutcome, DeviceApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| DeviceApiError::DecodeResponse)?;
    let response: SpawnResponse =
        serde_json::from_value(value).map_err(|_| DeviceApiError::InvalidResponse)?;
    Ok(SpawnOutcome {
        success: response.code == 0,
        message: response.message.filter(|m| !m.is_empty()),
    })
}

#[async_trait]
impl DeviceBootstrap for DeviceApi {
    async fn fetch_status(&self, address: &str) -> Result<String, DeviceApiError> {
        let status = self.text(self.client.post(self.url(address, "status"))).await?;
        Ok(status.trim().to_string())
    }

    async fn fetch_device_name(&self, address: &str) -> Result<String, DeviceApiError> {
        self.text(self.client.get(self.url(address, "devicename")))
            .await
    }

    async fn spawn_control_script(
        &self,
        address: &str,
        script: &[u8],
    ) -> Result<SpawnOutcome, DeviceApiError> {
        debug!(%address, bytes = script.len(), "uploading control script");
        let body = self
            .client
            .post(self.url(address, "spawn"))
            .body(script.to_vec())
            .send()
            .await
            .map_err(|e| DeviceApiError::Http(e.to_string()))?
            .bytes()
            .await
            .map_err(|_| DeviceApiError::DecodeResponse)?;
        parse_spawn_response(&body)
    }
}
