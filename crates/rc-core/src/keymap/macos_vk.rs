//! macOS virtual key code (`kVK_*`) to browser `keyCode` translation table.
//!
//! Virtual key codes are defined in Carbon `Events.h` (HIToolbox framework)
//! and identify physical key positions on an ANSI keyboard.  They range from
//! 0x00 to 0x7F, so the table below has exactly 128 entries.
//!
//! # How this table works
//!
//! `MACOS_TO_BROWSER_TABLE` is a compile-time constant array indexed by the
//! macOS key code.  Position 0x00 holds `Some(KeyCode::KeyA)` because
//! `kVK_ANSI_A` is 0x00.  Codes with no browser equivalent (right Command,
//! the Fn key, unassigned slots) store `None` and the event is dropped.

use super::browser::KeyCode;

/// Number of entries in the macOS translation table.
pub const MACOS_KEY_CODE_COUNT: usize = 0x80;

/// Translates a macOS virtual key code to a browser `keyCode`.
///
/// Returns `None` for codes `>= 0x80` and for codes without a mapping.
///
/// # Panics
///
/// This function never panics; all `u16` inputs are handled.
pub fn macos_to_browser(code: u16) -> Option<KeyCode> {
    MACOS_TO_BROWSER_TABLE.get(code as usize).copied().flatten()
}

/// Complete macOS → browser mapping table indexed by `kVK_*` code (0x00–0x7F).
const MACOS_TO_BROWSER_TABLE: [Option<KeyCode>; MACOS_KEY_CODE_COUNT] = {
    use KeyCode::*;
    let mut t: [Option<KeyCode>; MACOS_KEY_CODE_COUNT] = [None; MACOS_KEY_CODE_COUNT];

    // Letters (ANSI positions, not alphabetical)
    t[0x00] = Some(KeyA); // kVK_ANSI_A
    t[0x01] = Some(KeyS); // kVK_ANSI_S
    t[0x02] = Some(KeyD); // kVK_ANSI_D
    t[0x03] = Some(KeyF); // kVK_ANSI_F
    t[0x04] = Some(KeyH); // kVK_ANSI_H
    t[0x05] = Some(KeyG); // kVK_ANSI_G
    t[0x06] = Some(KeyZ); // kVK_ANSI_Z
    t[0x07] = Some(KeyX); // kVK_ANSI_X
    t[0x08] = Some(KeyC); // kVK_ANSI_C
    t[0x09] = Some(KeyV); // kVK_ANSI_V
    t[0x0B] = Some(KeyB); // kVK_ANSI_B
    t[0x0C] = Some(KeyQ); // kVK_ANSI_Q
    t[0x0D] = Some(KeyW); // kVK_ANSI_W
    t[0x0E] = Some(KeyE); // kVK_ANSI_E
    t[0x0F] = Some(KeyR); // kVK_ANSI_R
    t[0x10] = Some(KeyY); // kVK_ANSI_Y
    t[0x11] = Some(KeyT); // kVK_ANSI_T
    t[0x1F] = Some(KeyO); // kVK_ANSI_O
    t[0x20] = Some(KeyU); // kVK_ANSI_U
    t[0x22] = Some(KeyI); // kVK_ANSI_I
    t[0x23] = Some(KeyP); // kVK_ANSI_P
    t[0x25] = Some(KeyL); // kVK_ANSI_L
    t[0x26] = Some(KeyJ); // kVK_ANSI_J
    t[0x28] = Some(KeyK); // kVK_ANSI_K
    t[0x2D] = Some(KeyN); // kVK_ANSI_N
    t[0x2E] = Some(KeyM); // kVK_ANSI_M

    // Digits
    t[0x12] = Some(Digit1);
    t[0x13] = Some(Digit2);
    t[0x14] = Some(Digit3);
    t[0x15] = Some(Digit4);
    t[0x16] = Some(Digit6);
    t[0x17] = Some(Digit5);
    t[0x19] = Some(Digit9);
    t[0x1A] = Some(Digit7);
    t[0x1C] = Some(Digit8);
    t[0x1D] = Some(Digit0);

    // Punctuation
    t[0x18] = Some(Equal);
    t[0x1B] = Some(Minus);
    t[0x1E] = Some(BracketRight);
    t[0x21] = Some(BracketLeft);
    t[0x27] = Some(Quote);
    t[0x29] = Some(Semicolon);
    t[0x2A] = Some(Backslash);
    t[0x2B] = Some(Comma);
    t[0x2C] = Some(Slash);
    t[0x2F] = Some(Period);
    t[0x32] = Some(Backquote); // kVK_ANSI_Grave

    // Keypad
    t[0x41] = Some(NumpadDecimal);
    t[0x43] = Some(NumpadMultiply);
    t[0x45] = Some(NumpadAdd);
    t[0x47] = Some(Clear); // kVK_ANSI_KeypadClear
    t[0x4B] = Some(NumpadDivide);
    t[0x4C] = Some(Enter); // kVK_ANSI_KeypadEnter
    t[0x4E] = Some(NumpadSubtract);
    t[0x51] = Some(Equal); // kVK_ANSI_KeypadEquals
    t[0x52] = Some(Numpad0);
    t[0x53] = Some(Numpad1);
    t[0x54] = Some(Numpad2);
    t[0x55] = Some(Numpad3);
    t[0x56] = Some(Numpad4);
    t[0x57] = Some(Numpad5);
    t[0x58] = Some(Numpad6);
    t[0x59] = Some(Numpad7);
    t[0x5B] = Some(Numpad8);
    t[0x5C] = Some(Numpad9);

    // Control keys
    t[0x24] = Some(Enter); // kVK_Return
    t[0x30] = Some(Tab);
    t[0x31] = Some(Space);
    t[0x33] = Some(Backspace); // kVK_Delete
    t[0x35] = Some(Escape);

    // Modifiers (0x36 right Command and 0x3F Fn stay unmapped)
    t[0x37] = Some(Meta); // kVK_Command
    t[0x38] = Some(Shift); // kVK_Shift
    t[0x39] = Some(CapsLock);
    t[0x3A] = Some(Alt); // kVK_Option
    t[0x3B] = Some(Control);
    t[0x3C] = Some(Shift); // kVK_RightShift
    t[0x3D] = Some(Alt); // kVK_RightOption
    t[0x3E] = Some(Control); // kVK_RightControl

    // Volume
    t[0x48] = Some(AudioVolumeUp);
    t[0x49] = Some(AudioVolumeDown);
    t[0x4A] = Some(AudioVolumeMute);

    // Function keys (macOS numbering is not sequential)
    t[0x7A] = Some(F1);
    t[0x78] = Some(F2);
    t[0x63] = Some(F3);
    t[0x76] = Some(F4);
    t[0x60] = Some(F5);
    t[0x61] = Some(F6);
    t[0x62] = Some(F7);
    t[0x64] = Some(F8);
    t[0x65] = Some(F9);
    t[0x6D] = Some(F10);
    t[0x67] = Some(F11);
    t[0x6F] = Some(F12);
    t[0x69] = Some(F13);
    t[0x6B] = Some(F14);
    t[0x71] = Some(F15);
    t[0x6A] = Some(F16);
    t[0x40] = Some(F17);
    t[0x4F] = Some(F18);
    t[0x50] = Some(F19);
    t[0x5A] = Some(F20);

    // Navigation
    t[0x72] = Some(Insert); // kVK_Help
    t[0x73] = Some(Home);
    t[0x74] = Some(PageUp);
    t[0x75] = Some(Delete); // kVK_ForwardDelete
    t[0x77] = Some(End);
    t[0x79] = Some(PageDown);
    t[0x7B] = Some(ArrowLeft);
    t[0x7C] = Some(ArrowRight);
    t[0x7D] = Some(ArrowDown);
    t[0x7E] = Some(ArrowUp);

    t
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Raw `(macOS code, keyCode)` pairs for the whole table.
    const EXPECTED_MAPPINGS: &[(u16, u16)] = &[
        (0x00, 0x41), (0x01, 0x53), (0x02, 0x44), (0x03, 0x46), (0x04, 0x48),
        (0x05, 0x47), (0x06, 0x5A), (0x07, 0x58), (0x08, 0x43), (0x09, 0x56),
        (0x0B, 0x42), (0x0C, 0x51), (0x0D, 0x57), (0x0E, 0x45), (0x0F, 0x52),
        (0x10, 0x59), (0x11, 0x54), (0x12, 0x31), (0x13, 0x32), (0x14, 0x33),
        (0x15, 0x34), (0x16, 0x36), (0x17, 0x35), (0x18, 0xBB), (0x19, 0x39),
        (0x1A, 0x37), (0x1B, 0xBD), (0x1C, 0x38), (0x1D, 0x30), (0x1E, 0xDD),
        (0x1F, 0x4F), (0x20, 0x55), (0x21, 0xDB), (0x22, 0x49), (0x23, 0x50),
        (0x25, 0x4C), (0x26, 0x4A), (0x27, 0xDE), (0x28, 0x4B), (0x29, 0xBA),
        (0x2A, 0xDC), (0x2B, 0xBC), (0x2C, 0xBF), (0x2D, 0x4E), (0x2E, 0x4D),
        (0x2F, 0xBE), (0x32, 0xC0),
        (0x41, 0x6E), (0x43, 0x6A), (0x45, 0x6B), (0x47, 0x0C), (0x4B, 0x6F),
        (0x4C, 0x0D), (0x4E, 0x6D), (0x51, 0xBB), (0x52, 0x60), (0x53, 0x61),
        (0x54, 0x62), (0x55, 0x63), (0x56, 0x64), (0x57, 0x65), (0x58, 0x66),
        (0x59, 0x67), (0x5B, 0x68), (0x5C, 0x69),
        (0x24, 0x0D), (0x30, 0x09), (0x31, 0x20), (0x33, 0x08), (0x35, 0x1B),
        (0x37, 0x5B), (0x38, 0x10), (0x39, 0x14), (0x3A, 0x12), (0x3B, 0x11),
        (0x3C, 0x10), (0x3D, 0x12), (0x3E, 0x11), (0x40, 0x80), (0x48, 0xB7),
        (0x49, 0xB6), (0x4A, 0xB5), (0x4F, 0x81), (0x50, 0x82), (0x5A, 0x83),
        (0x60, 0x74), (0x61, 0x75), (0x62, 0x76), (0x63, 0x72), (0x64, 0x77),
        (0x65, 0x78), (0x67, 0x7A), (0x69, 0x7C), (0x6A, 0x7F), (0x6B, 0x7D),
        (0x6D, 0x79), (0x6F, 0x7B), (0x71, 0x7E), (0x72, 0x2D), (0x73, 0x24),
        (0x74, 0x21), (0x75, 0x2E), (0x76, 0x73), (0x77, 0x23), (0x78, 0x71),
        (0x79, 0x22), (0x7A, 0x70), (0x7B, 0x25), (0x7C, 0x27), (0x7D, 0x28),
        (0x7E, 0x26),
    ];

    #[test]
    fn test_every_mapped_code_translates_to_expected_key_code() {
        for &(mac, expected) in EXPECTED_MAPPINGS {
            let result = macos_to_browser(mac).map(KeyCode::as_u16);
            assert_eq!(
                result,
                Some(expected),
                "macos_to_browser(0x{mac:02X}) should return 0x{expected:02X}"
            );
        }
    }

    #[test]
    fn test_table_has_no_entries_beyond_the_expected_set() {
        let mapped = (0u16..0x80).filter(|&c| macos_to_browser(c).is_some()).count();
        assert_eq!(mapped, EXPECTED_MAPPINGS.len());
    }

    #[test]
    fn test_right_command_and_fn_are_unmapped() {
        assert_eq!(macos_to_browser(0x36), None);
        assert_eq!(macos_to_browser(0x3F), None);
    }

    #[test]
    fn test_codes_outside_table_return_none() {
        for code in [0x80u16, 0x81, 0xFF, 0x1234, u16::MAX] {
            assert_eq!(macos_to_browser(code), None, "0x{code:X} must be unmapped");
        }
    }

    #[test]
    fn test_left_and_right_modifiers_share_a_key_code() {
        assert_eq!(macos_to_browser(0x38), macos_to_browser(0x3C));
        assert_eq!(macos_to_browser(0x3A), macos_to_browser(0x3D));
        assert_eq!(macos_to_browser(0x3B), macos_to_browser(0x3E));
    }

    #[test]
    fn test_macos_to_browser_never_panics_for_any_u16() {
        for code in 0u16..=u16::MAX {
            let _ = macos_to_browser(code);
        }
    }
}
