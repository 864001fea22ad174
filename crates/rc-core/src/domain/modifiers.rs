//! Modifier key tracking.
//!
//! The desktop reports modifier changes as a single "flags changed" event
//! carrying the full bit mask of currently held modifiers, not as separate
//! key-down/key-up events.  [`ModifierState`] remembers the last seen state of
//! each modifier and turns a new mask into at most one press or release.
//!
//! Modifiers are scanned in a fixed priority order (see
//! [`ModifierKey::PRIORITY`]); only the first one whose state differs is
//! reported.  Every tracked modifier's state is recorded, so the remaining
//! differences in the same mask are absorbed rather than reported later.

use serde::{Deserialize, Serialize};

/// Device-independent modifier flag bits as delivered by the desktop event
/// system (`NSEvent.ModifierFlags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierFlags(pub u32);

impl ModifierFlags {
    pub const CAPS_LOCK: u32 = 1 << 16;
    pub const SHIFT: u32 = 1 << 17;
    pub const CONTROL: u32 = 1 << 18;
    pub const OPTION: u32 = 1 << 19;
    pub const COMMAND: u32 = 1 << 20;
    pub const NUMERIC_PAD: u32 = 1 << 21;
    pub const HELP: u32 = 1 << 22;
    pub const FUNCTION: u32 = 1 << 23;

    /// Returns `true` if the bit for `key` is set.
    pub fn contains(&self, key: ModifierKey) -> bool {
        self.0 & key.mask() != 0
    }

    /// Returns `true` if the Fn key is held.  Key events made with Fn held
    /// are local shortcuts and are not forwarded.
    pub fn function(&self) -> bool {
        self.contains(ModifierKey::Function)
    }
}

/// A tracked modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    CapsLock,
    Shift,
    Control,
    Option,
    Command,
    NumericPad,
    Help,
    Function,
}

impl ModifierKey {
    /// Scan order used when more than one modifier changed at once.
    pub const PRIORITY: [ModifierKey; 8] = [
        ModifierKey::CapsLock,
        ModifierKey::Shift,
        ModifierKey::Control,
        ModifierKey::Option,
        ModifierKey::Command,
        ModifierKey::NumericPad,
        ModifierKey::Help,
        ModifierKey::Function,
    ];

    /// The flag bit for this modifier.
    pub fn mask(self) -> u32 {
        match self {
            ModifierKey::CapsLock => ModifierFlags::CAPS_LOCK,
            ModifierKey::Shift => ModifierFlags::SHIFT,
            ModifierKey::Control => ModifierFlags::CONTROL,
            ModifierKey::Option => ModifierFlags::OPTION,
            ModifierKey::Command => ModifierFlags::COMMAND,
            ModifierKey::NumericPad => ModifierFlags::NUMERIC_PAD,
            ModifierKey::Help => ModifierFlags::HELP,
            ModifierKey::Function => ModifierFlags::FUNCTION,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One detected modifier edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierTransition {
    pub key: ModifierKey,
    /// `true` for press, `false` for release.
    pub pressed: bool,
}

/// Last known physical state of every tracked modifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierState {
    pressed: [bool; 8],
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded state of `key`.
    pub fn is_pressed(&self, key: ModifierKey) -> bool {
        self.pressed[key.index()]
    }

    /// Compares `flags` against the recorded state and returns the first
    /// transition in priority order.
    ///
    /// The whole mask is recorded, so an identical event right after this one
    /// returns `None`.
    pub fn detect_transition(&mut self, flags: ModifierFlags) -> Option<ModifierTransition> {
        let mut first = None;
        for key in ModifierKey::PRIORITY {
            let now = flags.contains(key);
            let slot = &mut self.pressed[key.index()];
            if *slot != now {
                *slot = now;
                first.get_or_insert(ModifierTransition { key, pressed: now });
            }
        }
        first
    }

    /// Clears every modifier back to released.
    pub fn reset(&mut self) {
        self.pressed = [false; 8];
    }
}
