//! JSON codec for the device control protocol.
//!
//! Wire format: one UTF-8 JSON object per WebSocket frame.
//! ```text
//! {"mode":"<discriminator>", ...fields}
//! ```
//! Encoding never fails.  Decoding never fails either: anything that is not
//! a well-formed, known event becomes [`InboundEvent::Unrecognized`] so that a
//! single bad frame can never tear down the connection.  The precise reason
//! is available through [`parse_text`] and is logged at `debug`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::protocol::messages::{InboundEvent, OutboundCommand, ScreenSize};

/// Reasons an inbound frame could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The payload is JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object has no string `"mode"` field.
    #[error("frame has no \"mode\" field")]
    MissingMode,

    /// The `"mode"` is not one the client understands.
    #[error("unknown mode: {0:?}")]
    UnknownMode(String),

    /// A field required by the mode is missing or has the wrong type.
    #[error("mode {mode:?}: missing or invalid field {field:?}")]
    InvalidField { mode: String, field: &'static str },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OutboundCommand`] as a JSON text frame.
///
/// # Examples
///
/// ```rust
/// use rc_core::protocol::codec::encode_command;
/// use rc_core::protocol::messages::OutboundCommand;
///
/// assert_eq!(encode_command(&OutboundCommand::Heartbeat), r#"{"mode":"heart"}"#);
/// ```
pub fn encode_command(cmd: &OutboundCommand) -> String {
    let mut obj = Map::new();
    obj.insert("mode".to_string(), Value::from(cmd.mode()));

    match cmd {
        OutboundCommand::PointerDown(p)
        | OutboundCommand::PointerUp(p)
        | OutboundCommand::PointerMove(p) => {
            obj.insert("x".to_string(), Value::from(p.x));
            obj.insert("y".to_string(), Value::from(p.y));
        }
        OutboundCommand::KeyDown(key) | OutboundCommand::KeyUp(key) => {
            obj.insert("key".to_string(), Value::from(key.as_u16()));
        }
        OutboundCommand::ClipboardWrite(text) | OutboundCommand::SendText(text) => {
            obj.insert("data".to_string(), Value::from(text.as_str()));
        }
        OutboundCommand::HomeDown
        | OutboundCommand::HomeUp
        | OutboundCommand::PowerDown
        | OutboundCommand::PowerUp
        | OutboundCommand::Press(_)
        | OutboundCommand::ClipboardReadRequest
        | OutboundCommand::SnapshotRequest
        | OutboundCommand::SaveSnapshotRequest
        | OutboundCommand::Heartbeat
        | OutboundCommand::Quit => {}
    }

    Value::Object(obj).to_string()
}

/// Decodes a text frame, folding every failure into
/// [`InboundEvent::Unrecognized`].
pub fn decode_text(text: &str) -> InboundEvent {
    match parse_text(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "unrecognized text frame");
            InboundEvent::Unrecognized(text.to_string())
        }
    }
}

/// Decodes a binary frame the same way as a text frame.
///
/// Non-UTF-8 bytes are replaced in the `Unrecognized` payload.
pub fn decode_binary(bytes: &[u8]) -> InboundEvent {
    let parsed = serde_json::from_slice::<Value>(bytes)
        .map_err(|e| ProtocolError::InvalidJson(e.to_string()))
        .and_then(|v| parse_value(&v));
    match parsed {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, len = bytes.len(), "unrecognized binary frame");
            InboundEvent::Unrecognized(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Decodes a text frame, reporting why it was rejected.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the frame is malformed or of an unknown mode.
pub fn parse_text(text: &str) -> Result<InboundEvent, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
    parse_value(&value)
}

// ── Event decoding ────────────────────────────────────────────────────────────

fn parse_value(value: &Value) -> Result<InboundEvent, ProtocolError> {
    let obj = value.as_object().ok_or(ProtocolError::NotAnObject)?;
    let mode = obj
        .get("mode")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingMode)?;

    match mode {
        "heart" => Ok(InboundEvent::Heartbeat(parse_size(obj.get("size")))),
        // The daemon answers a clipboard_read request with the same mode.
        "clipboard" | "clipboard_read" => {
            let data = string_field(obj, mode, "data")?;
            Ok(InboundEvent::ClipboardData(data.to_string()))
        }
        "save_snapshot" => {
            let data = string_field(obj, mode, "data")?;
            let bytes = STANDARD.decode(data).map_err(|_| ProtocolError::InvalidField {
                mode: mode.to_string(),
                field: "data",
            })?;
            Ok(InboundEvent::SnapshotData(bytes))
        }
        other => Err(ProtocolError::UnknownMode(other.to_string())),
    }
}

/// A heartbeat is still a heartbeat when its size is absent or malformed.
fn parse_size(value: Option<&Value>) -> Option<ScreenSize> {
    let size = value?.as_object()?;
    let w = size.get("w")?.as_f64()?;
    let h = size.get("h")?.as_f64()?;
    Some(ScreenSize { w, h })
}

fn string_field<'a>(
    obj: &'a Map<String, Value>,
    mode: &str,
    field: &'static str,
) -> Result<&'a str, ProtocolError> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::InvalidField {
            mode: mode.to_string(),
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::DevicePoint;
    use crate::keymap::browser::KeyCode;
    use crate::protocol::messages::HardwareButton;

    fn encoded_json(cmd: &OutboundCommand) -> Value {
        serde_json::from_str(&encode_command(cmd)).expect("encoder must emit valid JSON")
    }

    #[test]
    fn test_encode_pointer_commands_carry_coordinates() {
        let p = DevicePoint { x: 540, y: 960 };

        assert_eq!(
            encoded_json(&OutboundCommand::PointerDown(p)),
            serde_json::json!({"mode": "down", "x": 540, "y": 960})
        );
        assert_eq!(
            encoded_json(&OutboundCommand::PointerMove(p)),
            serde_json::json!({"mode": "move", "x": 540, "y": 960})
        );
        assert_eq!(
            encoded_json(&OutboundCommand::PointerUp(p)),
            serde_json::json!({"mode": "up", "x": 540, "y": 960})
        );
    }

    #[test]
    fn test_encode_key_commands_carry_numeric_key() {
        assert_eq!(
            encoded_json(&OutboundCommand::KeyDown(KeyCode::KeyA)),
            serde_json::json!({"mode": "input_down", "key": 65})
        );
        assert_eq!(
            encoded_json(&OutboundCommand::KeyUp(KeyCode::Enter)),
            serde_json::json!({"mode": "input_up", "key": 13})
        );
    }

    #[test]
    fn test_encode_text_commands_carry_data() {
        assert_eq!(
            encoded_json(&OutboundCommand::SendText("héllo \"x\"".into())),
            serde_json::json!({"mode": "send_text", "data": "héllo \"x\""})
        );
        assert_eq!(
            encoded_json(&OutboundCommand::ClipboardWrite("copied".into())),
            serde_json::json!({"mode": "clipboard", "data": "copied"})
        );
    }

    #[test]
    fn test_encode_bare_commands_have_only_mode() {
        let cases = [
            (OutboundCommand::HomeDown, "home_down"),
            (OutboundCommand::HomeUp, "home_up"),
            (OutboundCommand::PowerDown, "power_down"),
            (OutboundCommand::PowerUp, "power_up"),
            (OutboundCommand::Press(HardwareButton::VolumeIncrement), "volume_increment"),
            (OutboundCommand::Press(HardwareButton::ToggleKeyboard), "toggle_keyboard"),
            (OutboundCommand::ClipboardReadRequest, "clipboard_read"),
            (OutboundCommand::SnapshotRequest, "snapshot"),
            (OutboundCommand::SaveSnapshotRequest, "save_snapshot"),
            (OutboundCommand::Heartbeat, "heart"),
            (OutboundCommand::Quit, "quit"),
        ];

        for (cmd, mode) in cases {
            assert_eq!(encoded_json(&cmd), serde_json::json!({ "mode": mode }), "{cmd:?}");
        }
    }

    #[test]
    fn test_decode_heartbeat_with_size() {
        let event = decode_text(r#"{"mode":"heart","size":{"w":375,"h":812}}"#);

        assert_eq!(event, InboundEvent::Heartbeat(Some(ScreenSize { w: 375.0, h: 812.0 })));
    }

    #[test]
    fn test_decode_heartbeat_without_or_with_bad_size() {
        assert_eq!(decode_text(r#"{"mode":"heart"}"#), InboundEvent::Heartbeat(None));
        assert_eq!(
            decode_text(r#"{"mode":"heart","size":{"w":"wide"}}"#),
            InboundEvent::Heartbeat(None)
        );
    }

    #[test]
    fn test_decode_clipboard_under_both_modes() {
        assert_eq!(
            decode_text(r#"{"mode":"clipboard","data":"abc"}"#),
            InboundEvent::ClipboardData("abc".into())
        );
        assert_eq!(
            decode_text(r#"{"mode":"clipboard_read","data":"xyz"}"#),
            InboundEvent::ClipboardData("xyz".into())
        );
    }

    #[test]
    fn test_decode_snapshot_base64() {
        let event = decode_text(r#"{"mode":"save_snapshot","data":"iVBORw=="}"#);

        assert_eq!(event, InboundEvent::SnapshotData(vec![0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_parse_text_classifies_failures() {
        assert!(matches!(parse_text("not json"), Err(ProtocolError::InvalidJson(_))));
        assert_eq!(parse_text("[1,2]"), Err(ProtocolError::NotAnObject));
        assert_eq!(parse_text(r#"{"data":1}"#), Err(ProtocolError::MissingMode));
        assert_eq!(
            parse_text(r#"{"mode":"teleport"}"#),
            Err(ProtocolError::UnknownMode("teleport".into()))
        );
        assert_eq!(
            parse_text(r#"{"mode":"clipboard"}"#),
            Err(ProtocolError::InvalidField { mode: "clipboard".into(), field: "data" })
        );
        assert_eq!(
            parse_text(r#"{"mode":"save_snapshot","data":"***"}"#),
            Err(ProtocolError::InvalidField { mode: "save_snapshot".into(), field: "data" })
        );
    }

    #[test]
    fn test_decode_text_folds_failures_into_unrecognized() {
        assert_eq!(decode_text("not json"), InboundEvent::Unrecognized("not json".into()));
    }

    #[test]
    fn test_decode_binary_uses_same_rules() {
        assert_eq!(decode_binary(br#"{"mode":"heart"}"#), InboundEvent::Heartbeat(None));
        assert_eq!(
            decode_binary(&[0xFF, 0x00]),
            InboundEvent::Unrecognized("\u{FFFD}\u{0}".into())
        );
    }
}
