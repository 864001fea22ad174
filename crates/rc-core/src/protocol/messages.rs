//! Command and event types exchanged with the device daemon.
//!
//! Every frame on the control WebSocket is a flat JSON object whose `"mode"`
//! field identifies the variant; any other fields sit next to it:
//!
//! ```json
//! {"mode":"down","x":540,"y":960}
//! {"mode":"input_down","key":65}
//! {"mode":"heart","size":{"w":375,"h":812}}
//! ```
//!
//! [`OutboundCommand`] covers what the client sends, [`InboundEvent`] what the
//! daemon sends back.  Keeping the two directions as distinct enums makes it a
//! compile-time error to send a device-only event from the client.

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{DevicePoint, Size};
use crate::keymap::browser::KeyCode;

// ── Client → device ───────────────────────────────────────────────────────────

/// A physical device button or menu action sent as a single `"mode"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareButton {
    Home,
    Power,
    Mute,
    VolumeIncrement,
    VolumeDecrement,
    /// Asks the device to take a screenshot into its own photo library.
    Snapshot,
    ToggleKeyboard,
}

impl HardwareButton {
    /// Wire `"mode"` string.
    pub fn mode(self) -> &'static str {
        match self {
            HardwareButton::Home => "home",
            HardwareButton::Power => "power",
            HardwareButton::Mute => "mute",
            HardwareButton::VolumeIncrement => "volume_increment",
            HardwareButton::VolumeDecrement => "volume_decrement",
            HardwareButton::Snapshot => "snapshot",
            HardwareButton::ToggleKeyboard => "toggle_keyboard",
        }
    }
}

/// Every command the client can send to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Touch begins at a device pixel (`"down"`).
    PointerDown(DevicePoint),
    /// Touch ends at a device pixel (`"up"`).
    PointerUp(DevicePoint),
    /// Touch moves to a device pixel (`"move"`).
    PointerMove(DevicePoint),
    HomeDown,
    HomeUp,
    PowerDown,
    PowerUp,
    /// Key pressed (`"input_down"`).
    KeyDown(KeyCode),
    /// Key released (`"input_up"`).
    KeyUp(KeyCode),
    /// Single press of a hardware button.
    Press(HardwareButton),
    /// Replace the device pasteboard with this text (`"clipboard"`).
    ClipboardWrite(String),
    /// Ask the device for its pasteboard (`"clipboard_read"`).
    ClipboardReadRequest,
    /// Type this text on the device (`"send_text"`).
    SendText(String),
    /// Alias of `Press(HardwareButton::Snapshot)`, kept as a named command.
    SnapshotRequest,
    /// Ask the device to return a PNG screenshot (`"save_snapshot"`).
    SaveSnapshotRequest,
    /// Keep-alive (`"heart"`).
    Heartbeat,
    /// Tell the daemon the client is going away (`"quit"`).
    Quit,
}

impl OutboundCommand {
    /// Returns the wire `"mode"` string for this command.
    pub fn mode(&self) -> &'static str {
        match self {
            OutboundCommand::PointerDown(_) => "down",
            OutboundCommand::PointerUp(_) => "up",
            OutboundCommand::PointerMove(_) => "move",
            OutboundCommand::HomeDown => "home_down",
            OutboundCommand::HomeUp => "home_up",
            OutboundCommand::PowerDown => "power_down",
            OutboundCommand::PowerUp => "power_up",
            OutboundCommand::KeyDown(_) => "input_down",
            OutboundCommand::KeyUp(_) => "input_up",
            OutboundCommand::Press(button) => button.mode(),
            OutboundCommand::ClipboardWrite(_) => "clipboard",
            OutboundCommand::ClipboardReadRequest => "clipboard_read",
            OutboundCommand::SendText(_) => "send_text",
            OutboundCommand::SnapshotRequest => "snapshot",
            OutboundCommand::SaveSnapshotRequest => "save_snapshot",
            OutboundCommand::Heartbeat => "heart",
            OutboundCommand::Quit => "quit",
        }
    }
}

// ── Device → client ───────────────────────────────────────────────────────────

/// Device screen size as reported in heartbeat frames (`{"w":..,"h":..}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub w: f64,
    pub h: f64,
}

impl From<ScreenSize> for Size {
    fn from(s: ScreenSize) -> Self {
        Size::new(s.w, s.h)
    }
}

/// Every event the device can send to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Keep-alive, optionally carrying the current screen size.
    Heartbeat(Option<ScreenSize>),
    /// Device pasteboard contents.
    ClipboardData(String),
    /// Decoded PNG screenshot bytes.
    SnapshotData(Vec<u8>),
    /// Anything that could not be decoded; carries the raw frame text.
    Unrecognized(String),
}
