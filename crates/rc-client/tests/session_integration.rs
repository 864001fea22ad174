//! Integration tests for the session actor driven through the mock transport.
//!
//! Every test runs on tokio's paused clock, so connect-attempt and heartbeat
//! timers fire deterministically as virtual time advances.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rc_client::application::connection::{ConnectionSettings, ConnectionState};
use rc_client::application::control_session::{KeyPhase, ModifierEvent, SessionObserver};
use rc_client::application::error::SessionError;
use rc_client::application::session_actor::{spawn_session, SessionHandle};
use rc_client::application::transport::TransportEventKind;
use rc_client::infrastructure::transport::mock::MockConnector;
use rc_core::{ModifierFlags, ScreenSize};
use tokio::time::Instant;

#[derive(Default)]
struct RecordingObserver {
    states: Mutex<Vec<ConnectionState>>,
}

impl RecordingObserver {
    fn states(&self) -> Vec<ConnectionState> {
        self.states.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn connection_state_changed(&self, state: &ConnectionState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

struct Harness {
    handle: SessionHandle,
    connector: Arc<MockConnector>,
    observer: Arc<RecordingObserver>,
}

fn harness() -> Harness {
    let connector = Arc::new(MockConnector::new());
    let observer = Arc::new(RecordingObserver::default());
    let (handle, _task) =
        spawn_session(connector.clone(), ConnectionSettings::default(), observer.clone());
    Harness { handle, connector, observer }
}

async fn connected_harness() -> Harness {
    let h = harness();
    h.handle.begin_session("10.0.0.5").await.unwrap();
    h.connector.emit(TransportEventKind::Connected);
    h.handle.wait_connected().await.unwrap();
    h
}

/// Lets the actor drain its inputs without reaching the next timer.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_three_connect_ticks_without_answer_fail_with_timeout() {
    // Arrange
    let h = harness();
    let start = Instant::now();

    // Act
    h.handle.begin_session("10.0.0.5").await.unwrap();
    let outcome = h.handle.wait_connected().await;

    // Assert
    assert_eq!(outcome, Err(SessionError::ConnectTimeout));
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(
        h.observer.states(),
        vec![
            ConnectionState::Connecting,
            ConnectionState::Failed(SessionError::ConnectTimeout),
            ConnectionState::Idle,
        ]
    );
    assert_eq!(
        h.handle.status().await.unwrap().last_failure.as_deref(),
        Some("Connection timeout.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_device_heartbeat_sets_size_and_gets_exactly_one_reply() {
    // Arrange
    let h = connected_harness().await;

    // Act
    h.connector.emit(TransportEventKind::Text(
        r#"{"mode":"heart","size":{"w":375,"h":812}}"#.to_string(),
    ));
    settle().await;

    // Assert
    assert_eq!(h.connector.sent_modes(), vec!["heart"]);
    let status = h.handle.status().await.unwrap();
    assert_eq!(status.remote_screen, Some(ScreenSize { w: 375.0, h: 812.0 }));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_timer_sends_one_frame_per_second() {
    let h = connected_harness().await;

    tokio::time::sleep(Duration::from_millis(2_500)).await;

    assert_eq!(h.connector.sent_modes(), vec!["heart", "heart"]);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_keeps_session_without_notification() {
    // Arrange
    let h = connected_harness().await;
    let states_before = h.observer.states();

    // Act
    h.connector.emit(TransportEventKind::Text("not json".to_string()));
    settle().await;

    // Assert
    assert_eq!(h.handle.status().await.unwrap().state, "connected");
    assert_eq!(h.observer.states(), states_before);
    assert!(h.connector.sent_frames().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_key_repeat_is_sent_as_up_then_down() {
    let h = connected_harness().await;

    h.handle.key(KeyPhase::Down, 0x00, true, ModifierFlags::default()).unwrap();
    settle().await;

    assert_eq!(h.connector.sent_modes(), vec!["input_up", "input_down"]);
}

#[tokio::test(start_paused = true)]
async fn test_simultaneous_modifiers_emit_one_event_and_repeat_emits_none() {
    // Arrange
    let h = connected_harness().await;
    let event = ModifierEvent {
        key_code: 0x38,
        flags: ModifierFlags(ModifierFlags::SHIFT | ModifierFlags::CONTROL),
    };

    // Act
    h.handle.modifier(event).unwrap();
    h.handle.modifier(event).unwrap();
    settle().await;

    // Assert
    let frames: Vec<serde_json::Value> = h
        .connector
        .sent_frames()
        .iter()
        .map(|f| serde_json::from_str(f).unwrap())
        .collect();
    assert_eq!(frames, vec![serde_json::json!({"mode": "input_down", "key": 0x10})]);
}

#[tokio::test(start_paused = true)]
async fn test_end_session_sends_quit_and_releases_transport() {
    let h = connected_harness().await;

    h.handle.end_session().await.unwrap();

    assert_eq!(h.connector.sent_modes(), vec!["quit"]);
    assert!(h.connector.transport_closed());
    assert_eq!(
        h.observer.states()[2..],
        [ConnectionState::Disconnecting, ConnectionState::Idle]
    );
}

#[tokio::test(start_paused = true)]
async fn test_second_begin_while_connecting_is_rejected() {
    let h = harness();
    h.handle.begin_session("10.0.0.5").await.unwrap();

    let second = h.handle.begin_session("10.0.0.6").await;

    assert_eq!(second, Err(SessionError::SessionActive));
    assert_eq!(h.connector.open_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_transport_events_are_ignored() {
    // Arrange
    let h = harness();
    h.handle.begin_session("10.0.0.5").await.unwrap();

    // Act
    h.connector.emit_stale(TransportEventKind::Connected);
    settle().await;

    // Assert
    assert_eq!(h.handle.status().await.unwrap().state, "connecting");
}

#[tokio::test(start_paused = true)]
async fn test_peer_close_reason_is_reported_and_session_can_restart() {
    // Arrange
    let h = connected_harness().await;

    // Act
    h.connector.emit(TransportEventKind::Disconnected {
        reason: "Server shutting down".to_string(),
        code: 1001,
    });
    settle().await;
    let outcome = h.handle.wait_connected().await;
    let restart = h.handle.begin_session("10.0.0.5").await;

    // Assert
    assert_eq!(outcome, Err(SessionError::Transport("Server shutting down".to_string())));
    assert_eq!(restart, Ok(()));
    assert_eq!(h.handle.status().await.unwrap().last_failure, None);
}
