//! Line commands for the headless driver.
//!
//! Each stdin line is one command.  Coordinates are in the local view's
//! coordinate space; `view W H` sets the size of that view.
//!
//! ```text
//! down X Y | move X Y | up X Y       primary pointer
//! view W H                           local view size
//! key down|up|repeat CODE [MASK]     local virtual key code (decimal or 0x..)
//! flags CODE MASK                    modifier change (MASK decimal or 0x..)
//! home | power                       press and release the button
//! mute | volume up | volume down
//! snapshot | save-snapshot | keyboard
//! text <anything>                    type text on the device
//! clipboard push <anything>          replace the device pasteboard
//! clipboard pull                     fetch the device pasteboard
//! status | quit
//! ```

use rc_core::{ModifierFlags, Point, Size};
use thiserror::Error;

use crate::application::control_session::{KeyPhase, PointerPhase};

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Pointer(PointerPhase, Point),
    View(Size),
    Key { phase: KeyPhase, code: u16, is_repeat: bool, flags: ModifierFlags },
    Flags { code: u16, flags: ModifierFlags },
    Home,
    Power,
    Mute,
    VolumeUp,
    VolumeDown,
    Snapshot,
    SaveSnapshot,
    ToggleKeyboard,
    Text(String),
    ClipboardPush(String),
    ClipboardPull,
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a number: {0:?}")]
    BadNumber(String),
}

/// Parses one console line.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim_start()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match head {
        "" => Err(ConsoleError::Empty),
        "down" | "move" | "up" => {
            let phase = match head {
                "down" => PointerPhase::Down,
                "up" => PointerPhase::Up,
                _ => PointerPhase::Move,
            };
            let [x, y] = two_floats(&args, "down|move|up X Y")?;
            Ok(ConsoleCommand::Pointer(phase, Point::new(x, y)))
        }
        "view" => {
            let [w, h] = two_floats(&args, "view W H")?;
            Ok(ConsoleCommand::View(Size::new(w, h)))
        }
        "key" => {
            const USAGE: &str = "key down|up|repeat CODE [MASK]";
            let (phase, is_repeat) = match args.first().copied() {
                Some("down") => (KeyPhase::Down, false),
                Some("up") => (KeyPhase::Up, false),
                Some("repeat") => (KeyPhase::Down, true),
                _ => return Err(ConsoleError::Usage(USAGE)),
            };
            let (code, mask) = match &args[1..] {
                [code] => (parse_int(code)?, 0),
                [code, mask] => (parse_int(code)?, parse_int(mask)?),
                _ => return Err(ConsoleError::Usage(USAGE)),
            };
            Ok(ConsoleCommand::Key {
                phase,
                code,
                is_repeat,
                flags: ModifierFlags(mask),
            })
        }
        "flags" => {
            const USAGE: &str = "flags CODE MASK";
            let (code, mask) = match args.as_slice() {
                [code, mask] => (parse_int(code)?, parse_int(mask)?),
                _ => return Err(ConsoleError::Usage(USAGE)),
            };
            Ok(ConsoleCommand::Flags {
                code,
                flags: ModifierFlags(mask),
            })
        }
        "home" => Ok(ConsoleCommand::Home),
        "power" => Ok(ConsoleCommand::Power),
        "mute" => Ok(ConsoleCommand::Mute),
        "volume" => match args.as_slice() {
            ["up"] => Ok(ConsoleCommand::VolumeUp),
            ["down"] => Ok(ConsoleCommand::VolumeDown),
            _ => Err(ConsoleError::Usage("volume up|down")),
        },
        "snapshot" => Ok(ConsoleCommand::Snapshot),
        "save-snapshot" => Ok(ConsoleCommand::SaveSnapshot),
        "keyboard" => Ok(ConsoleCommand::ToggleKeyboard),
        "text" if !rest.is_empty() => Ok(ConsoleCommand::Text(rest.to_string())),
        "text" => Err(ConsoleError::Usage("text <anything>")),
        "clipboard" => match rest.split_once(char::is_whitespace) {
            Some(("push", text)) => Ok(ConsoleCommand::ClipboardPush(text.trim_start().to_string())),
            None if rest == "pull" => Ok(ConsoleCommand::ClipboardPull),
            _ => Err(ConsoleError::Usage("clipboard push <text> | clipboard pull")),
        },
        "status" => Ok(ConsoleCommand::Status),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(ConsoleError::Unknown(other.to_string())),
    }
}

fn two_floats(args: &[&str], usage: &'static str) -> Result<[f64; 2], ConsoleError> {
    match args {
        [a, b] => Ok([parse_float(a)?, parse_float(b)?]),
        _ => Err(ConsoleError::Usage(usage)),
    }
}

fn parse_float(s: &str) -> Result<f64, ConsoleError> {
    s.parse().map_err(|_| ConsoleError::BadNumber(s.to_string()))
}

/// Parses decimal or `0x`-prefixed hexadecimal.
fn parse_int<T: TryFrom<u64>>(s: &str) -> Result<T, ConsoleError> {
    let bad = || ConsoleError::BadNumber(s.to_string());
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| bad())?,
        None => s.parse::<u64>().map_err(|_| bad())?,
    };
    T::try_from(value).map_err(|_| bad())
}
