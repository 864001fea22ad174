//! Key code translation for forwarding local keyboard events to the device.
//!
//! The canonical representation is the browser legacy `keyCode`
//! ([`KeyCode`]).  Local platform codes are translated into it at the
//! capture boundary, before a command is encoded.

pub mod browser;
pub mod macos_vk;

pub use browser::KeyCode;

/// Unified key mapper providing all translation directions.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a macOS virtual key code to a [`KeyCode`].
    ///
    /// Returns `None` if no mapping exists; the caller drops the event.
    pub fn translate(local_key_code: u16) -> Option<KeyCode> {
        macos_vk::macos_to_browser(local_key_code)
    }
}
