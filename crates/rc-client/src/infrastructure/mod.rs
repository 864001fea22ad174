//! Infrastructure layer for the remote-control client.
//!
//! Contains the adapters that touch the outside world: the WebSocket control
//! transport, the device's HTTP bootstrap API, the TOML config file, and the
//! stdin command parser used by the headless driver.
//!
//! **Dependency rule**: this layer may depend on `application` and `rc_core`,
//! but MUST NOT be imported by the `application` layer outside of tests.

pub mod config;
pub mod console;
pub mod device_api;
pub mod transport;
