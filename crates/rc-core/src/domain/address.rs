//! Device address validation.
//!
//! A device is reached either by a dotted-quad IPv4 literal or by a DNS
//! hostname.  Octets with leading zeros (`010.0.0.1`) are not accepted as
//! IPv4; such input is then checked against the hostname rules instead.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const IPV4_PATTERN: &str = r"^(([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])$";
const HOSTNAME_PATTERN: &str = r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$";

/// Errors returned by [`DeviceAddress::parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The input is neither a valid IPv4 literal nor a valid hostname.
    #[error("invalid device address: {0:?}")]
    Invalid(String),
}

/// A validated device address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceAddress {
    Ipv4(Ipv4Addr),
    Hostname(String),
}

impl DeviceAddress {
    /// Validates `input` (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Invalid`] if the input matches neither form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rc_core::DeviceAddress;
    ///
    /// assert!(DeviceAddress::parse("10.0.0.5").is_ok());
    /// assert!(DeviceAddress::parse("iphone.local").is_ok());
    /// assert!(DeviceAddress::parse("not a host").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if ipv4_regex().is_match(trimmed) {
            if let Ok(ip) = trimmed.parse::<Ipv4Addr>() {
                return Ok(DeviceAddress::Ipv4(ip));
            }
        }
        if hostname_regex().is_match(trimmed) {
            return Ok(DeviceAddress::Hostname(trimmed.to_string()));
        }
        Err(AddressError::Invalid(input.to_string()))
    }

}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceAddress::Ipv4(ip) => write!(f, "{ip}"),
            DeviceAddress::Hostname(host) => f.write_str(host),
        }
    }
}

impl std::str::FromStr for DeviceAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Both patterns are compile-time constants, so compilation cannot fail.
fn ipv4_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IPV4_PATTERN).expect("IPv4 pattern is valid"))
}

fn hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HOSTNAME_PATTERN).expect("hostname pattern is valid"))
}
