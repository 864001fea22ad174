//! TOML configuration for the remote-control client.
//!
//! Read from `--config <path>` or the platform config file:
//! - Windows:  `%APPDATA%\RemoteControl\config.toml`
//! - Linux:    `~/.config/remotecontrol/config.toml`
//! - macOS:    `~/Library/Application Support/RemoteControl/config.toml`
//!
//! A missing file, a missing section or a missing field all fall back to the
//! defaults below, so an empty file is a valid configuration:
//!
//! ```toml
//! [device]
//! control_port = 46968
//! api_port = 46952
//! subprotocol = "RC"
//!
//! [session]
//! connect_timeout_ms = 3000
//! connect_tick_ms = 1000
//! connect_max_ticks = 3
//! heartbeat_interval_ms = 1000
//!
//! [client]
//! log_level = "info"
//! snapshot_dir = "/home/me/Pictures/RemoteControl"
//! ```
//!
//! The client never writes this file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::connection::ConnectionSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub client: ClientSection,
}

/// Ports and protocol of the device daemons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// WebSocket control port.
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// HTTP bootstrap API port.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// `Sec-WebSocket-Protocol` value.
    #[serde(default = "default_subprotocol")]
    pub subprotocol: String,
}

/// Connection timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_connect_tick_ms")]
    pub connect_tick_ms: u64,
    /// Connect ticks without a "connected" signal before the session fails.
    #[serde(default = "default_connect_max_ticks")]
    pub connect_max_ticks: u32,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

/// Local client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSection {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where saved snapshots are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_control_port() -> u16 {
    46968
}
fn default_api_port() -> u16 {
    46952
}
fn default_subprotocol() -> String {
    "RC".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    3000
}
fn default_connect_tick_ms() -> u64 {
    1000
}
fn default_connect_max_ticks() -> u32 {
    3
}
fn default_heartbeat_interval_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            control_port: default_control_port(),
            api_port: default_api_port(),
            subprotocol: default_subprotocol(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            connect_tick_ms: default_connect_tick_ms(),
            connect_max_ticks: default_connect_max_ticks(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            snapshot_dir: None,
        }
    }
}

impl ClientConfig {
    /// Connection settings for the session state machine.
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            control_port: self.device.control_port,
            subprotocol: self.device.subprotocol.clone(),
            connect_timeout: Duration::from_millis(self.session.connect_timeout_ms),
            connect_tick: Duration::from_millis(self.session.connect_tick_ms),
            connect_max_ticks: self.session.connect_max_ticks.max(1),
            heartbeat_interval: Duration::from_millis(self.session.heartbeat_interval_ms),
        }
    }

    /// Configured snapshot directory, or `<Pictures or home>/RemoteControl`.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.client
            .snapshot_dir
            .clone()
            .unwrap_or_else(default_snapshot_dir)
    }
}

fn default_snapshot_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from);
    match home {
        Some(home) if home.join("Pictures").is_dir() => {
            home.join("Pictures").join("RemoteControl")
        }
        Some(home) => home.join("RemoteControl"),
        None => PathBuf::from("RemoteControl"),
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the full path to the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the platform config file, or defaults if it does not exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `path`, returning `ClientConfig::default()` if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteControl"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("remotecontrol"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RemoteControl")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_device_protocol() {
        // Arrange / Act
        let cfg = ClientConfig::default();

        // Assert
        assert_eq!(cfg.device.control_port, 46968);
        assert_eq!(cfg.device.api_port, 46952);
        assert_eq!(cfg.device.subprotocol, "RC");
        assert_eq!(cfg.client.log_level, "info");
    }

    #[test]
    fn test_default_connection_settings_equal_state_machine_defaults() {
        let cfg = ClientConfig::default();

        assert_eq!(cfg.connection_settings(), ConnectionSettings::default());
    }

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let cfg: ClientConfig = toml::from_str("").expect("empty TOML is valid");

        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        // Arrange
        let text = "[session]\nconnect_max_ticks = 5\n";

        // Act
        let cfg: ClientConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.session.connect_max_ticks, 5);
        assert_eq!(cfg.session.connect_tick_ms, 1000);
        assert_eq!(cfg.device, DeviceConfig::default());
    }

    #[test]
    fn test_zero_max_ticks_is_clamped_to_one() {
        let mut cfg = ClientConfig::default();
        cfg.session.connect_max_ticks = 0;

        assert_eq!(cfg.connection_settings().connect_max_ticks, 1);
    }

    #[test]
    fn test_configured_snapshot_dir_wins() {
        let mut cfg = ClientConfig::default();
        cfg.client.snapshot_dir = Some(PathBuf::from("/tmp/shots"));

        assert_eq!(cfg.snapshot_dir(), PathBuf::from("/tmp/shots"));
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("rc-client-config-that-does-not-exist.toml");

        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        // Arrange
        let path = std::env::temp_dir().join(format!("rc-client-bad-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[device\ncontrol_port = ").unwrap();

        // Act
        let result = load_config_from(&path);
        let _ = std::fs::remove_file(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
