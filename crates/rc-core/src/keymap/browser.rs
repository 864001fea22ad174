//! Browser `KeyboardEvent.keyCode` values (the legacy DOM key codes).
//!
//! This is the canonical key representation on the wire: the automation
//! daemon on the device injects key strokes by these numbers, so every local
//! key code is translated into this space before it is sent.
//!
//! # Why the legacy `keyCode`? (for beginners)
//!
//! Web browsers expose three different ways to identify a key:
//! `KeyboardEvent.key` (the produced character, e.g. `"a"`),
//! `KeyboardEvent.code` (the physical position, e.g. `"KeyA"`), and the older
//! numeric `KeyboardEvent.keyCode` (e.g. `65`).  The device daemon speaks the
//! numeric form, which is compact and layout-independent enough for letters,
//! digits, navigation and function keys.
//!
//! | Key          | keyCode |
//! |--------------|---------|
//! | Letter A     | 0x41    |
//! | Enter        | 0x0D    |
//! | Shift        | 0x10    |
//! | Arrow Up     | 0x26    |
//!
//! Left and right variants of a modifier share one code (there is only one
//! `Shift = 0x10`), which is why two different macOS key codes can translate
//! to the same [`KeyCode`].

/// A browser legacy `keyCode` value.
///
/// The numeric value of each variant is its `keyCode`.  Only codes reachable
/// from the macOS translation table are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum KeyCode {
    // Editing and whitespace
    Backspace = 0x08,
    Tab = 0x09,
    Clear = 0x0C,
    Enter = 0x0D,

    // Modifiers
    Shift = 0x10,
    Control = 0x11,
    Alt = 0x12,
    CapsLock = 0x14,
    Meta = 0x5B,

    Escape = 0x1B,
    Space = 0x20,

    // Navigation
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    Home = 0x24,
    ArrowLeft = 0x25,
    ArrowUp = 0x26,
    ArrowRight = 0x27,
    ArrowDown = 0x28,
    Insert = 0x2D,
    Delete = 0x2E,

    // Digits (ASCII '0'–'9')
    Digit0 = 0x30,
    Digit1 = 0x31,
    Digit2 = 0x32,
    Digit3 = 0x33,
    Digit4 = 0x34,
    Digit5 = 0x35,
    Digit6 = 0x36,
    Digit7 = 0x37,
    Digit8 = 0x38,
    Digit9 = 0x39,

    // Letters (ASCII 'A'–'Z')
    KeyA = 0x41,
    KeyB = 0x42,
    KeyC = 0x43,
    KeyD = 0x44,
    KeyE = 0x45,
    KeyF = 0x46,
    KeyG = 0x47,
    KeyH = 0x48,
    KeyI = 0x49,
    KeyJ = 0x4A,
    KeyK = 0x4B,
    KeyL = 0x4C,
    KeyM = 0x4D,
    KeyN = 0x4E,
    KeyO = 0x4F,
    KeyP = 0x50,
    KeyQ = 0x51,
    KeyR = 0x52,
    KeyS = 0x53,
    KeyT = 0x54,
    KeyU = 0x55,
    KeyV = 0x56,
    KeyW = 0x57,
    KeyX = 0x58,
    KeyY = 0x59,
    KeyZ = 0x5A,

    // Numeric keypad
    Numpad0 = 0x60,
    Numpad1 = 0x61,
    Numpad2 = 0x62,
    Numpad3 = 0x63,
    Numpad4 = 0x64,
    Numpad5 = 0x65,
    Numpad6 = 0x66,
    Numpad7 = 0x67,
    Numpad8 = 0x68,
    Numpad9 = 0x69,
    NumpadMultiply = 0x6A,
    NumpadAdd = 0x6B,
    NumpadSubtract = 0x6D,
    NumpadDecimal = 0x6E,
    NumpadDivide = 0x6F,

    // Function keys
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
    F13 = 0x7C,
    F14 = 0x7D,
    F15 = 0x7E,
    F16 = 0x7F,
    F17 = 0x80,
    F18 = 0x81,
    F19 = 0x82,
    F20 = 0x83,

    // Volume keys (Gecko numbering)
    AudioVolumeMute = 0xB5,
    AudioVolumeDown = 0xB6,
    AudioVolumeUp = 0xB7,

    // Punctuation
    Semicolon = 0xBA,
    Equal = 0xBB,
    Comma = 0xBC,
    Minus = 0xBD,
    Period = 0xBE,
    Slash = 0xBF,
    Backquote = 0xC0,
    BracketLeft = 0xDB,
    Backslash = 0xDC,
    BracketRight = 0xDD,
    Quote = 0xDE,
}

impl KeyCode {
    /// Returns the numeric `keyCode` sent on the wire.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a raw `keyCode` back into a [`KeyCode`].
    ///
    /// Returns `None` for values that are not part of the translation space.
    pub fn from_u16(value: u16) -> Option<Self> {
        use KeyCode::*;
        let key = match value {
            0x08 => Backspace,
            0x09 => Tab,
            0x0C => Clear,
            0x0D => Enter,
            0x10 => Shift,
            0x11 => Control,
            0x12 => Alt,
            0x14 => CapsLock,
            0x1B => Escape,
            0x20 => Space,
            0x21 => PageUp,
            0x22 => PageDown,
            0x23 => End,
            0x24 => Home,
            0x25 => ArrowLeft,
            0x26 => ArrowUp,
            0x27 => ArrowRight,
            0x28 => ArrowDown,
            0x2D => Insert,
            0x2E => Delete,
            0x30 => Digit0,
            0x31 => Digit1,
            0x32 => Digit2,
            0x33 => Digit3,
            0x34 => Digit4,
            0x35 => Digit5,
            0x36 => Digit6,
            0x37 => Digit7,
            0x38 => Digit8,
            0x39 => Digit9,
            0x41 => KeyA,
            0x42 => KeyB,
            0x43 => KeyC,
            0x44 => KeyD,
            0x45 => KeyE,
            0x46 => KeyF,
            0x47 => KeyG,
            0x48 => KeyH,
            0x49 => KeyI,
            0x4A => KeyJ,
            0x4B => KeyK,
            0x4C => KeyL,
            0x4D => KeyM,
            0x4E => KeyN,
            0x4F => KeyO,
            0x50 => KeyP,
            0x51 => KeyQ,
            0x52 => KeyR,
            0x53 => KeyS,
            0x54 => KeyT,
            0x55 => KeyU,
            0x56 => KeyV,
            0x57 => KeyW,
            0x58 => KeyX,
            0x59 => KeyY,
            0x5A => KeyZ,
            0x5B => Meta,
            0x60 => Numpad0,
            0x61 => Numpad1,
            0x62 => Numpad2,
            0x63 => Numpad3,
            0x64 => Numpad4,
            0x65 => Numpad5,
            0x66 => Numpad6,
            0x67 => Numpad7,
            0x68 => Numpad8,
            0x69 => Numpad9,
            0x6A => NumpadMultiply,
            0x6B => NumpadAdd,
            0x6D => NumpadSubtract,
            0x6E => NumpadDecimal,
            0x6F => NumpadDivide,
            0x70 => F1,
            0x71 => F2,
            0x72 => F3,
            0x73 => F4,
            0x74 => F5,
            0x75 => F6,
            0x76 => F7,
            0x77 => F8,
            0x78 => F9,
            0x79 => F10,
            0x7A => F11,
            0x7B => F12,
            0x7C => F13,
            0x7D => F14,
            0x7E => F15,
            0x7F => F16,
            0x80 => F17,
            0x81 => F18,
            0x82 => F19,
            0x83 => F20,
            0xB5 => AudioVolumeMute,
            0xB6 => AudioVolumeDown,
            0xB7 => AudioVolumeUp,
            0xBA => Semicolon,
            0xBB => Equal,
            0xBC => Comma,
            0xBD => Minus,
            0xBE => Period,
            0xBF => Slash,
            0xC0 => Backquote,
            0xDB => BracketLeft,
            0xDC => Backslash,
            0xDD => BracketRight,
            0xDE => Quote,
            _ => return None,
        };
        Some(key)
    }
}

impl From<KeyCode> for u16 {
    fn from(key: KeyCode) -> Self {
        key.as_u16()
    }
}
