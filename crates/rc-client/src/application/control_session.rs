//! Session orchestrator: turns local input into device commands.
//!
//! # How a session flows (for beginners)
//!
//! A [`ControlSession`] owns one [`ConnectionStateMachine`] and the small
//! amount of state that only matters while a device is being controlled:
//!
//! - the validated device address and its display label,
//! - the device's last reported screen size (needed to map pointer events),
//! - the last seen modifier-key state (so only *changes* are sent).
//!
//! Local input arrives through the `handle_*` methods.  Pointer positions are
//! mapped with [`map_to_device`], key codes go through [`KeyMapper`], and the
//! resulting [`OutboundCommand`] is handed to the state machine.  Nothing is
//! sent unless the connection is `Connected`.
//!
//! Frames from the device come back as [`InboundEvent`]s.  A heartbeat is
//! answered immediately; clipboard and snapshot payloads are passed to the
//! [`SessionObserver`].
//!
//! The session is plain synchronous state.  The task that owns it (see
//! `session_actor`) awaits transport events and timers and feeds them in.

use std::sync::Arc;

use rc_core::{
    map_to_device, DeviceAddress, HardwareButton, InboundEvent, KeyMapper, ModifierFlags,
    ModifierState, OutboundCommand, Point, ScreenSize, Size,
};
use serde::Serialize;
use tracing::{debug, info};

use super::connection::{
    ConnectionSettings, ConnectionState, ConnectionStateMachine, ConnectionUpdate, TimerTick,
};
use super::error::SessionError;
use super::transport::{Connector, TransportEvent};

// ── Input types ───────────────────────────────────────────────────────────────

/// Phase of a primary-button pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Up,
    Move,
}

/// Phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

/// Phase of a hardware-button press (home, power).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPhase {
    Down,
    Up,
}

/// A local "modifier flags changed" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierEvent {
    /// Local virtual key code of the modifier that changed.
    pub key_code: u16,
    /// Full modifier bitmask after the change.
    pub flags: ModifierFlags,
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Receives session notifications.  Every method defaults to doing nothing.
pub trait SessionObserver: Send + Sync {
    /// Called on every state transition; `Failed` carries the reason.
    fn connection_state_changed(&self, _state: &ConnectionState) {}

    fn clipboard_received(&self, _text: &str) {}

    /// Called with decoded PNG bytes.
    fn snapshot_received(&self, _png: &[u8]) {}

    fn device_label_updated(&self, _label: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

// ── Status ────────────────────────────────────────────────────────────────────

/// Point-in-time view of a session, suitable for a UI or `status` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub state: String,
    pub address: Option<String>,
    pub device_label: Option<String>,
    pub remote_screen: Option<ScreenSize>,
    pub last_failure: Option<String>,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Per-device control session.
pub struct ControlSession {
    machine: ConnectionStateMachine,
    observer: Arc<dyn SessionObserver>,
    address: Option<DeviceAddress>,
    device_label: Option<String>,
    remote_screen: Option<ScreenSize>,
    modifiers: ModifierState,
}

impl ControlSession {
    /// Creates an idle session and the receiver its transports report into.
    pub fn new(
        connector: Arc<dyn Connector>,
        settings: ConnectionSettings,
        observer: Arc<dyn SessionObserver>,
    ) -> (Self, tokio::sync::mpsc::UnboundedReceiver<TransportEvent>) {
        let (machine, events) = ConnectionStateMachine::new(connector, settings);
        let session = Self {
            machine,
            observer,
            address: None,
            device_label: None,
            remote_screen: None,
            modifiers: ModifierState::new(),
        };
        (session, events)
    }

    pub fn state(&self) -> &ConnectionState {
        self.machine.state()
    }

    pub fn last_failure(&self) -> Option<&SessionError> {
        self.machine.last_failure()
    }

    /// Last screen size reported by the device, if any.
    pub fn remote_screen(&self) -> Option<ScreenSize> {
        self.remote_screen
    }

    /// Validates `address` and starts connecting.
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionActive`] while another session is live,
    /// [`SessionError::InvalidAddress`] if `address` is neither a dotted-quad
    /// IPv4 address nor a hostname.
    pub fn begin_session(&mut self, address: &str) -> Result<(), SessionError> {
        if self.machine.state().is_active() {
            return Err(SessionError::SessionActive);
        }
        let parsed = DeviceAddress::parse(address)?;

        info!(address = %parsed, "beginning control session");
        self.remote_screen = None;
        self.modifiers.reset();

        let updates = self.machine.connect(&parsed)?;
        self.address = Some(parsed);
        self.apply(updates);
        Ok(())
    }

    /// Ends the session, sending `quit` if connected.
    pub fn end_session(&mut self) {
        let updates = self.machine.disconnect();
        self.apply(updates);
    }

    /// Maps a primary-button pointer event and sends it.
    pub fn handle_pointer_event(&mut self, phase: PointerPhase, local: Point, view: Size) {
        if !self.machine.is_connected() {
            return;
        }
        let Some(remote) = self.remote_screen else {
            debug!("pointer event before device size is known");
            return;
        };
        let Some(point) = map_to_device(local, view, remote.into()) else {
            return;
        };

        let cmd = match phase {
            PointerPhase::Down => OutboundCommand::PointerDown(point),
            PointerPhase::Up => OutboundCommand::PointerUp(point),
            PointerPhase::Move => OutboundCommand::PointerMove(point),
        };
        self.send(cmd);
    }

    /// Translates and sends a key event.  A repeated key-down is sent as an
    /// up/down pair.  Keys pressed while Fn is held stay local.
    pub fn handle_key_event(
        &mut self,
        phase: KeyPhase,
        local_key_code: u16,
        is_repeat: bool,
        flags: ModifierFlags,
    ) {
        if !self.machine.is_connected() {
            return;
        }
        if flags.function() {
            debug!(local_key_code, "key with Fn held not forwarded");
            return;
        }
        let Some(key) = KeyMapper::translate(local_key_code) else {
            debug!(local_key_code, "unmapped key dropped");
            return;
        };

        match (phase, is_repeat) {
            (KeyPhase::Down, true) => {
                self.send(OutboundCommand::KeyUp(key));
                self.send(OutboundCommand::KeyDown(key));
            }
            (KeyPhase::Down, false) => self.send(OutboundCommand::KeyDown(key)),
            (KeyPhase::Up, _) => self.send(OutboundCommand::KeyUp(key)),
        }
    }

    /// Sends at most one key event for the first modifier whose state changed.
    pub fn handle_modifier_event(&mut self, event: ModifierEvent) {
        if !self.machine.is_connected() {
            return;
        }
        let Some(transition) = self.modifiers.detect_transition(event.flags) else {
            return;
        };
        let Some(key) = KeyMapper::translate(event.key_code) else {
            debug!(key_code = event.key_code, ?transition, "unmapped modifier dropped");
            return;
        };

        if transition.pressed {
            self.send(OutboundCommand::KeyDown(key));
        } else {
            self.send(OutboundCommand::KeyUp(key));
        }
    }

    /// Reacts to a decoded frame from the device.
    pub fn handle_inbound_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Heartbeat(size) => {
                if let Some(size) = size {
                    if self.remote_screen != Some(size) {
                        debug!(w = size.w, h = size.h, "device screen size");
                    }
                    self.remote_screen = Some(size);
                }
                self.send(OutboundCommand::Heartbeat);
            }
            InboundEvent::ClipboardData(text) => self.observer.clipboard_received(&text),
            InboundEvent::SnapshotData(png) => self.observer.snapshot_received(&png),
            InboundEvent::Unrecognized(raw) => debug!(%raw, "unrecognized frame"),
        }
    }

    /// Secondary button: the device's home button.
    pub fn handle_home_button(&mut self, phase: ButtonPhase) {
        self.send(match phase {
            ButtonPhase::Down => OutboundCommand::HomeDown,
            ButtonPhase::Up => OutboundCommand::HomeUp,
        });
    }

    /// Other buttons: the device's power button.
    pub fn handle_power_button(&mut self, phase: ButtonPhase) {
        self.send(match phase {
            ButtonPhase::Down => OutboundCommand::PowerDown,
            ButtonPhase::Up => OutboundCommand::PowerUp,
        });
    }

    pub fn press_button(&mut self, button: HardwareButton) {
        self.send(OutboundCommand::Press(button));
    }

    /// Replaces the device pasteboard with `text`.
    pub fn write_clipboard(&mut self, text: &str) {
        self.send(OutboundCommand::ClipboardWrite(text.to_owned()));
    }

    /// Asks the device for its pasteboard; the reply reaches the observer.
    pub fn request_clipboard(&mut self) {
        self.send(OutboundCommand::ClipboardReadRequest);
    }

    /// Types `text` on the device.
    pub fn send_text(&mut self, text: &str) {
        self.send(OutboundCommand::SendText(text.to_owned()));
    }

    /// Takes a screenshot stored on the device.
    pub fn request_snapshot(&mut self) {
        self.send(OutboundCommand::SnapshotRequest);
    }

    /// Takes a screenshot and returns it to the observer as PNG bytes.
    pub fn save_snapshot(&mut self) {
        self.send(OutboundCommand::SaveSnapshotRequest);
    }

    /// Records the device's display name.  Works in any state.
    pub fn set_device_label(&mut self, label: &str) {
        self.device_label = Some(label.to_owned());
        self.observer.device_label_updated(label);
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.machine.state().name().to_string(),
            address: self.address.as_ref().map(ToString::to_string),
            device_label: self.device_label.clone(),
            remote_screen: self.remote_screen,
            last_failure: self.machine.last_failure().map(ToString::to_string),
        }
    }

    // ── Driven by the owning task ─────────────────────────────────────────────

    pub async fn next_tick(&mut self) -> TimerTick {
        self.machine.next_tick().await
    }

    pub fn on_tick(&mut self, tick: TimerTick) {
        let updates = self.machine.on_tick(tick);
        self.apply(updates);
    }

    pub fn on_transport_event(&mut self, event: TransportEvent) {
        let updates = self.machine.on_transport_event(event);
        self.apply(updates);
    }

    fn apply(&mut self, updates: Vec<ConnectionUpdate>) {
        for update in updates {
            match update {
                ConnectionUpdate::StateChanged(state) => {
                    self.observer.connection_state_changed(&state);
                }
                ConnectionUpdate::Inbound(event) => self.handle_inbound_event(event),
            }
        }
    }

    fn send(&mut self, cmd: OutboundCommand) {
        if self.machine.send(&cmd) {
            debug!(mode = cmd.mode(), ?cmd, "sent");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
