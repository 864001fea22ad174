//! Integration tests for the rc-core public API.
//!
//! These tests drive a local input event all the way to its wire frame
//! (translation or mapping, then encoding) and decode the frames a device
//! daemon sends back, exercising keymap, geometry and codec together.

use rc_core::{
    decode_binary, decode_text, encode_command, map_to_device, InboundEvent, KeyMapper,
    ModifierFlags, ModifierState, OutboundCommand, Point, ScreenSize, Size,
};
use serde_json::{json, Value};

fn wire(cmd: &OutboundCommand) -> Value {
    serde_json::from_str(&encode_command(cmd)).expect("encoder must emit valid JSON")
}

#[test]
fn test_click_in_rotated_mirror_produces_swapped_device_frame() {
    // Arrange: portrait mirror view, device reports a landscape size
    let view = Size::new(300.0, 600.0);
    let remote: Size = ScreenSize { w: 1920.0, h: 1080.0 }.into();

    // Act
    let point = map_to_device(Point::new(150.0, 300.0), view, remote).expect("sizes are usable");
    let frame = wire(&OutboundCommand::PointerDown(point));

    // Assert
    assert_eq!(frame, json!({"mode": "down", "x": 540, "y": 960}));
}

#[test]
fn test_key_press_produces_input_down_frame() {
    let key = KeyMapper::translate(0x00).expect("kVK_ANSI_A is mapped");

    assert_eq!(wire(&OutboundCommand::KeyDown(key)), json!({"mode": "input_down", "key": 0x41}));
}

#[test]
fn test_modifier_change_produces_one_input_frame() {
    // Arrange
    let mut state = ModifierState::new();
    let flags = ModifierFlags(ModifierFlags::SHIFT | ModifierFlags::CONTROL);

    // Act
    let transition = state.detect_transition(flags).expect("shift changed");
    let key = KeyMapper::translate(0x38).expect("kVK_Shift is mapped");
    let cmd = if transition.pressed {
        OutboundCommand::KeyDown(key)
    } else {
        OutboundCommand::KeyUp(key)
    };

    // Assert
    assert_eq!(wire(&cmd), json!({"mode": "input_down", "key": 0x10}));
}

#[test]
fn test_device_heartbeat_text_and_binary_decode_identically() {
    let raw = r#"{"mode":"heart","size":{"w":375,"h":812}}"#;

    let from_text = decode_text(raw);
    let from_binary = decode_binary(raw.as_bytes());

    assert_eq!(from_text, InboundEvent::Heartbeat(Some(ScreenSize { w: 375.0, h: 812.0 })));
    assert_eq!(from_text, from_binary);
}

#[test]
fn test_garbage_frames_never_panic_and_stay_unrecognized() {
    for raw in ["", "null", "42", "{}", r#"{"mode":7}"#, r#"{"mode":"heart""#, "\u{0}"] {
        assert!(
            matches!(decode_text(raw), InboundEvent::Unrecognized(_)),
            "{raw:?} must be unrecognized"
        );
    }
}
