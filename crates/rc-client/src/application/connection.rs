//! Connection state machine for the device control channel.
//!
//! ```text
//!            connect()             Connected event
//!   Idle ───────────────▶ Connecting ───────────────▶ Connected
//!    ▲                        │                           │
//!    │        3rd tick /      │    disconnect / cancel /  │
//!    │        close / error   ▼    error                  ▼
//!    ├──────────────── Failed(reason) ◀───────────────────┘
//!    │
//!    └──────── Disconnecting ◀──── disconnect() (from Connecting or Connected)
//! ```
//!
//! The machine owns the transport handle and both timers.  It never spawns
//! anything and never sleeps: the session task awaits [`ConnectionStateMachine::next_tick`]
//! alongside its other inputs and feeds the results back in, so every
//! transition happens on that one task.
//!
//! Each call returns the [`ConnectionUpdate`]s it produced, in order.  A
//! failure produces `Failed(reason)` followed by `Idle`; the reason is kept
//! in [`ConnectionStateMachine::last_failure`] until the next `connect`.

use std::sync::Arc;
use std::time::Duration;

use rc_core::protocol::codec::{decode_binary, decode_text, encode_command};
use rc_core::{DeviceAddress, InboundEvent, OutboundCommand};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::transport::{
    Connector, Endpoint, TransportEvent, TransportEventKind, TransportHandle,
};

// ── Settings ──────────────────────────────────────────────────────────────────

/// Tunables for the control connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// WebSocket port of the device daemon.
    pub control_port: u16,
    /// `Sec-WebSocket-Protocol` value.
    pub subprotocol: String,
    /// Transport-level handshake timeout.
    pub connect_timeout: Duration,
    /// Period of the connect-attempt timer.
    pub connect_tick: Duration,
    /// Ticks without a "connected" signal before giving up.
    pub connect_max_ticks: u32,
    /// Period of the heartbeat timer.
    pub heartbeat_interval: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            control_port: 46968,
            subprotocol: "RC".to_string(),
            connect_timeout: Duration::from_secs(3),
            connect_tick: Duration::from_secs(1),
            connect_max_ticks: 3,
            heartbeat_interval: Duration::from_secs(1),
        }
    }
}

impl ConnectionSettings {
    /// Builds the control endpoint for `address`.
    pub fn endpoint_for(&self, address: &DeviceAddress) -> Endpoint {
        Endpoint {
            url: format!("ws://{}:{}", address, self.control_port),
            subprotocol: self.subprotocol.clone(),
            connect_timeout: self.connect_timeout,
        }
    }
}

// ── States and outputs ────────────────────────────────────────────────────────

/// Connection lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnecting,
    /// Transient: reported once, immediately followed by `Idle`.
    Failed(SessionError),
}

impl ConnectionState {
    /// Short lowercase name for logs and status snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::Failed(_) => "failed",
        }
    }

    /// Returns `true` while a session occupies the machine.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Disconnecting
        )
    }
}

/// Something the session must react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionUpdate {
    StateChanged(ConnectionState),
    /// A decoded text frame received while connected.
    Inbound(InboundEvent),
}

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    ConnectAttempt,
    Heartbeat,
}

// ── Machine ───────────────────────────────────────────────────────────────────

/// Owns the transport and timers of one control channel.
pub struct ConnectionStateMachine {
    connector: Arc<dyn Connector>,
    settings: ConnectionSettings,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    state: ConnectionState,
    transport: Option<TransportHandle>,
    generation: u64,
    connect_timer: Option<Interval>,
    connect_ticks: u32,
    heartbeat_timer: Option<Interval>,
    last_failure: Option<SessionError>,
}

impl ConnectionStateMachine {
    /// Creates an idle machine and the receiver its transports report into.
    pub fn new(
        connector: Arc<dyn Connector>,
        settings: ConnectionSettings,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let machine = Self {
            connector,
            settings,
            events_tx,
            state: ConnectionState::Idle,
            transport: None,
            generation: 0,
            connect_timer: None,
            connect_ticks: 0,
            heartbeat_timer: None,
            last_failure: None,
        };
        (machine, events_rx)
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn last_failure(&self) -> Option<&SessionError> {
        self.last_failure.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Generation of the current (or most recent) transport.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens a transport to `address` and arms the connect-attempt timer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionActive`] unless the machine is idle.
    pub fn connect(&mut self, address: &DeviceAddress) -> Result<Vec<ConnectionUpdate>, SessionError> {
        if self.state.is_active() {
            return Err(SessionError::SessionActive);
        }

        self.generation += 1;
        self.last_failure = None;
        self.connect_ticks = 0;

        let endpoint = self.settings.endpoint_for(address);
        info!(url = %endpoint.url, generation = self.generation, "opening control connection");

        let handle = self
            .connector
            .open(&endpoint, self.generation, self.events_tx.clone());
        self.transport = Some(handle);
        self.connect_timer = Some(periodic(self.settings.connect_tick));
        self.state = ConnectionState::Connecting;

        Ok(vec![ConnectionUpdate::StateChanged(ConnectionState::Connecting)])
    }

    /// Explicitly ends the session: timers first, then a best-effort `quit`,
    /// then the transport.
    pub fn disconnect(&mut self) -> Vec<ConnectionUpdate> {
        if !matches!(self.state, ConnectionState::Connecting | ConnectionState::Connected) {
            return Vec::new();
        }

        self.cancel_timers();
        let was_connected = self.is_connected();
        self.state = ConnectionState::Disconnecting;
        let mut updates = vec![ConnectionUpdate::StateChanged(ConnectionState::Disconnecting)];

        if let Some(transport) = self.transport.take() {
            if was_connected {
                transport.send(encode_command(&OutboundCommand::Quit));
            }
            transport.close();
        }

        info!(generation = self.generation, "control connection closed");
        self.state = ConnectionState::Idle;
        updates.push(ConnectionUpdate::StateChanged(ConnectionState::Idle));
        updates
    }

    /// Encodes and queues `cmd`.  Returns `false` unless connected.
    pub fn send(&self, cmd: &OutboundCommand) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.transport
            .as_ref()
            .map(|t| t.send(encode_command(cmd)))
            .unwrap_or(false)
    }

    /// Waits for whichever timer is armed.  Pends forever if none is.
    ///
    /// Cancel-safe: dropping the future loses no tick.
    pub async fn next_tick(&mut self) -> TimerTick {
        if let Some(timer) = self.connect_timer.as_mut() {
            timer.tick().await;
            return TimerTick::ConnectAttempt;
        }
        if let Some(timer) = self.heartbeat_timer.as_mut() {
            timer.tick().await;
            return TimerTick::Heartbeat;
        }
        std::future::pending().await
    }

    /// Applies a fired timer.
    pub fn on_tick(&mut self, tick: TimerTick) -> Vec<ConnectionUpdate> {
        match (tick, &self.state) {
            (TimerTick::ConnectAttempt, ConnectionState::Connecting) => {
                self.connect_ticks += 1;
                debug!(tick = self.connect_ticks, "still connecting");
                if self.connect_ticks >= self.settings.connect_max_ticks {
                    return self.fail(SessionError::ConnectTimeout);
                }
                Vec::new()
            }
            (TimerTick::Heartbeat, ConnectionState::Connected) => {
                self.send(&OutboundCommand::Heartbeat);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Applies an event reported by a transport.
    pub fn on_transport_event(&mut self, event: TransportEvent) -> Vec<ConnectionUpdate> {
        if event.generation != self.generation || self.transport.is_none() {
            debug!(
                event_generation = event.generation,
                current = self.generation,
                "ignoring event from stale transport"
            );
            return Vec::new();
        }

        match event.kind {
            TransportEventKind::Connected => {
                if self.state != ConnectionState::Connecting {
                    return Vec::new();
                }
                self.connect_timer = None;
                self.heartbeat_timer = Some(periodic(self.settings.heartbeat_interval));
                self.state = ConnectionState::Connected;
                info!(generation = self.generation, "control connection established");
                vec![ConnectionUpdate::StateChanged(ConnectionState::Connected)]
            }
            TransportEventKind::Text(text) => {
                if !self.is_connected() {
                    return Vec::new();
                }
                vec![ConnectionUpdate::Inbound(decode_text(&text))]
            }
            TransportEventKind::Binary(bytes) => {
                if self.is_connected() {
                    let event = decode_binary(&bytes);
                    debug!(len = bytes.len(), ?event, "binary frame discarded");
                }
                Vec::new()
            }
            TransportEventKind::Disconnected { reason, code } => {
                warn!(code, %reason, "device closed the control connection");
                let reason = if reason.is_empty() {
                    SessionError::ConnectionCancelled
                } else {
                    SessionError::Transport(reason)
                };
                self.fail(reason)
            }
            TransportEventKind::TimedOut => self.fail(SessionError::ConnectTimeout),
            TransportEventKind::Cancelled => self.fail(SessionError::ConnectionCancelled),
            TransportEventKind::Error(message) => {
                let reason = match message {
                    Some(m) if !m.is_empty() => SessionError::Transport(m),
                    _ => SessionError::ConnectionCancelled,
                };
                self.fail(reason)
            }
        }
    }

    fn fail(&mut self, reason: SessionError) -> Vec<ConnectionUpdate> {
        if !matches!(self.state, ConnectionState::Connecting | ConnectionState::Connected) {
            return Vec::new();
        }
        warn!(%reason, generation = self.generation, "control connection failed");

        self.cancel_timers();
        if let Some(transport) = self.transport.take() {
            transport.force_close();
        }
        self.last_failure = Some(reason.clone());
        self.state = ConnectionState::Idle;

        vec![
            ConnectionUpdate::StateChanged(ConnectionState::Failed(reason)),
            ConnectionUpdate::StateChanged(ConnectionState::Idle),
        ]
    }

    fn cancel_timers(&mut self) {
        self.connect_timer = None;
        self.heartbeat_timer = None;
        self.connect_ticks = 0;
    }
}

/// Repeating timer whose first tick is one full period from now.
fn periodic(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::mock::MockConnector;
    use tokio_test::{assert_pending, task};

    fn machine() -> (ConnectionStateMachine, Arc<MockConnector>) {
        let connector = Arc::new(MockConnector::new());
        let (machine, _rx) = ConnectionStateMachine::new(connector.clone(), ConnectionSettings::default());
        (machine, connector)
    }

    fn event(generation: u64, kind: TransportEventKind) -> TransportEvent {
        TransportEvent { generation, kind }
    }

    fn address() -> DeviceAddress {
        DeviceAddress::parse("10.0.0.5").unwrap()
    }

    fn connected() -> (ConnectionStateMachine, Arc<MockConnector>) {
        let (mut m, c) = machine();
        m.connect(&address()).unwrap();
        m.on_transport_event(event(m.generation(), TransportEventKind::Connected));
        (m, c)
    }

    #[tokio::test]
    async fn test_connect_enters_connecting_and_opens_endpoint() {
        // Arrange
        let (mut m, connector) = machine();

        // Act
        let updates = m.connect(&address()).unwrap();

        // Assert
        assert_eq!(updates, vec![ConnectionUpdate::StateChanged(ConnectionState::Connecting)]);
        assert_eq!(m.state(), &ConnectionState::Connecting);
        let endpoint = connector.last_endpoint().expect("transport opened");
        assert_eq!(endpoint.url, "ws://10.0.0.5:46968");
        assert_eq!(endpoint.subprotocol, "RC");
        assert_eq!(endpoint.connect_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_connect_while_active_is_rejected() {
        let (mut m, connector) = machine();
        m.connect(&address()).unwrap();

        let result = m.connect(&address());

        assert_eq!(result, Err(SessionError::SessionActive));
        assert_eq!(connector.open_count(), 1);
    }

    #[tokio::test]
    async fn test_third_connect_tick_fails_with_timeout() {
        // Arrange
        let (mut m, connector) = machine();
        m.connect(&address()).unwrap();

        // Act
        let first = m.on_tick(TimerTick::ConnectAttempt);
        let second = m.on_tick(TimerTick::ConnectAttempt);
        let third = m.on_tick(TimerTick::ConnectAttempt);

        // Assert
        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(
            third,
            vec![
                ConnectionUpdate::StateChanged(ConnectionState::Failed(SessionError::ConnectTimeout)),
                ConnectionUpdate::StateChanged(ConnectionState::Idle),
            ]
        );
        assert_eq!(m.state(), &ConnectionState::Idle);
        assert_eq!(m.last_failure(), Some(&SessionError::ConnectTimeout));
        assert!(connector.transport_closed());
    }

    #[tokio::test]
    async fn test_connected_event_arms_heartbeat_and_stops_connect_ticks() {
        let (mut m, connector) = connected();

        let late_tick = m.on_tick(TimerTick::ConnectAttempt);
        m.on_tick(TimerTick::Heartbeat);

        assert!(late_tick.is_empty());
        assert!(m.is_connected());
        assert_eq!(connector.sent_modes(), vec!["heart"]);
    }

    #[tokio::test]
    async fn test_heartbeat_tick_before_connected_sends_nothing() {
        let (mut m, connector) = machine();
        m.connect(&address()).unwrap();

        m.on_tick(TimerTick::Heartbeat);

        assert!(connector.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn test_text_frames_decode_only_when_connected() {
        let (mut m, _c) = machine();
        m.connect(&address()).unwrap();
        let generation = m.generation();

        let early = m.on_transport_event(event(generation, TransportEventKind::Text(r#"{"mode":"heart"}"#.into())));
        m.on_transport_event(event(generation, TransportEventKind::Connected));
        let later = m.on_transport_event(event(generation, TransportEventKind::Text(r#"{"mode":"heart"}"#.into())));

        assert!(early.is_empty());
        assert_eq!(later, vec![ConnectionUpdate::Inbound(InboundEvent::Heartbeat(None))]);
    }

    #[tokio::test]
    async fn test_malformed_frame_keeps_connection() {
        let (mut m, _c) = connected();

        let updates = m.on_transport_event(event(m.generation(), TransportEventKind::Text("not json".into())));

        assert_eq!(updates, vec![ConnectionUpdate::Inbound(InboundEvent::Unrecognized("not json".into()))]);
        assert!(m.is_connected());
    }

    #[tokio::test]
    async fn test_binary_frames_are_not_routed() {
        let (mut m, _c) = connected();

        let updates = m.on_transport_event(event(m.generation(), TransportEventKind::Binary(b"{\"mode\":\"heart\"}".to_vec())));

        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_with_reason_fails_with_that_reason() {
        let (mut m, _c) = connected();

        let updates = m.on_transport_event(event(
            m.generation(),
            TransportEventKind::Disconnected { reason: "Server going away".into(), code: 1001 },
        ));

        assert_eq!(
            updates[0],
            ConnectionUpdate::StateChanged(ConnectionState::Failed(SessionError::Transport(
                "Server going away".into()
            )))
        );
        assert_eq!(m.state(), &ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_reasonless_endings_map_to_cancelled() {
        for kind in [
            TransportEventKind::Disconnected { reason: String::new(), code: 1006 },
            TransportEventKind::Cancelled,
            TransportEventKind::Error(None),
        ] {
            let (mut m, _c) = connected();

            m.on_transport_event(event(m.generation(), kind.clone()));

            assert_eq!(m.last_failure(), Some(&SessionError::ConnectionCancelled), "{kind:?}");
        }
    }

    #[tokio::test]
    async fn test_transport_error_message_becomes_reason() {
        let (mut m, _c) = machine();
        m.connect(&address()).unwrap();

        m.on_transport_event(event(m.generation(), TransportEventKind::Error(Some("Connection refused".into()))));

        assert_eq!(m.last_failure(), Some(&SessionError::Transport("Connection refused".into())));
    }

    #[tokio::test]
    async fn test_failure_is_reported_only_once() {
        let (mut m, _c) = connected();
        let generation = m.generation();

        let first = m.on_transport_event(event(generation, TransportEventKind::Cancelled));
        let second = m.on_transport_event(event(generation, TransportEventKind::Error(Some("late".into()))));

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(m.last_failure(), Some(&SessionError::ConnectionCancelled));
    }

    #[tokio::test]
    async fn test_stale_generation_events_are_ignored() {
        let (mut m, _c) = machine();
        m.connect(&address()).unwrap();
        let old = m.generation();
        m.disconnect();
        m.connect(&address()).unwrap();

        let updates = m.on_transport_event(event(old, TransportEventKind::Connected));

        assert!(updates.is_empty());
        assert_eq!(m.state(), &ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn test_disconnect_when_connected_sends_quit_then_goes_idle() {
        let (mut m, connector) = connected();

        let updates = m.disconnect();

        assert_eq!(
            updates,
            vec![
                ConnectionUpdate::StateChanged(ConnectionState::Disconnecting),
                ConnectionUpdate::StateChanged(ConnectionState::Idle),
            ]
        );
        assert_eq!(connector.sent_modes(), vec!["quit"]);
        assert!(connector.transport_closed());
        assert!(!m.send(&OutboundCommand::Heartbeat));
    }

    #[tokio::test]
    async fn test_disconnect_while_connecting_sends_no_quit() {
        let (mut m, connector) = machine();
        m.connect(&address()).unwrap();

        m.disconnect();

        assert!(connector.sent_frames().is_empty());
        assert_eq!(m.state(), &ConnectionState::Idle);
        assert_eq!(m.last_failure(), None);
    }

    #[tokio::test]
    async fn test_disconnect_when_idle_is_a_no_op() {
        let (mut m, _c) = machine();

        assert!(m.disconnect().is_empty());
    }

    #[tokio::test]
    async fn test_reconnect_clears_last_failure() {
        let (mut m, _c) = machine();
        m.connect(&address()).unwrap();
        m.on_transport_event(event(m.generation(), TransportEventKind::Cancelled));

        m.connect(&address()).unwrap();

        assert_eq!(m.last_failure(), None);
    }

    #[test]
    fn test_next_tick_pends_without_armed_timer() {
        let (mut m, _c) = machine();

        let mut tick = task::spawn(m.next_tick());

        assert_pending!(tick.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timer_fires_once_per_second() {
        let (mut m, _c) = machine();
        m.connect(&address()).unwrap();
        let start = Instant::now();

        let tick = m.next_tick().await;

        assert_eq!(tick, TimerTick::ConnectAttempt);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ConnectionState::Connected.name(), "connected");
        assert_eq!(ConnectionState::Failed(SessionError::ConnectTimeout).name(), "failed");
        assert!(ConnectionState::Disconnecting.is_active());
        assert!(!ConnectionState::Idle.is_active());
    }
}
