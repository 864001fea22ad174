//! # rc-core
//!
//! Shared library for the device remote-control client containing the
//! command protocol codec, domain values, and key code translation tables.
//!
//! It has zero dependencies on OS APIs, UI frameworks, or network sockets:
//! every function here is pure and can be exercised from a unit test.
//!
//! # Architecture overview (for beginners)
//!
//! The remote-control client drives a touchscreen device over the local
//! network.  Desktop mouse and keyboard events are translated into small JSON
//! commands and sent to an automation daemon running on the device, which
//! replays them as touches, hardware button presses, and key strokes.
//!
//! This crate (`rc-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How commands travel over the WebSocket.  Each command is
//!   a flat JSON object with a `"mode"` discriminator; inbound frames are
//!   decoded back into typed events.
//!
//! - **`domain`** – Pure business logic: mapping a pointer position in the
//!   local mirror view onto device pixels, tracking modifier key transitions,
//!   and validating device addresses.
//!
//! - **`keymap`** – The translation table from macOS virtual key codes to the
//!   browser `KeyboardEvent.keyCode` values the device daemon understands.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `rc_core::KeyCode` instead of `rc_core::keymap::browser::KeyCode`.
pub use domain::address::{AddressError, DeviceAddress};
pub use domain::geometry::{map_to_device, DevicePoint, Point, Size};
pub use domain::modifiers::{ModifierFlags, ModifierKey, ModifierState, ModifierTransition};
pub use keymap::browser::KeyCode;
pub use keymap::KeyMapper;
pub use protocol::codec::{decode_binary, decode_text, encode_command, ProtocolError};
pub use protocol::messages::{HardwareButton, InboundEvent, OutboundCommand, ScreenSize};
