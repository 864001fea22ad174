//! Session actor: the task that owns a [`ControlSession`].
//!
//! Callers never touch the session directly.  They hold a cloneable
//! [`SessionHandle`] and post [`SessionCommand`]s into an unbounded mailbox.
//! The actor task `select!`s over three inputs:
//!
//! 1. the mailbox,
//! 2. transport events reported by the connection task,
//! 3. whichever connection timer is currently armed.
//!
//! Because only this task mutates the session, no locks are needed and every
//! state transition is observed in a single, well-defined order.
//!
//! Requests that need an answer (`begin_session`, `wait_connected`,
//! `end_session`, `status`) carry a `oneshot` reply channel.

use std::sync::Arc;

use rc_core::{HardwareButton, ModifierFlags, Point, Size};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use super::connection::{ConnectionSettings, ConnectionState};
use super::control_session::{
    ButtonPhase, ControlSession, KeyPhase, ModifierEvent, PointerPhase, SessionObserver,
    SessionStatus,
};
use super::error::SessionError;
use super::transport::Connector;

type Reply<T> = oneshot::Sender<T>;

/// Messages accepted by the session actor.
#[derive(Debug)]
pub enum SessionCommand {
    Begin {
        address: String,
        reply: Reply<Result<(), SessionError>>,
    },
    /// Resolves once the current attempt is connected or has ended.
    WaitConnected {
        reply: Reply<Result<(), SessionError>>,
    },
    End {
        reply: Reply<()>,
    },
    Status {
        reply: Reply<SessionStatus>,
    },
    Pointer {
        phase: PointerPhase,
        local: Point,
        view: Size,
    },
    Key {
        phase: KeyPhase,
        code: u16,
        is_repeat: bool,
        flags: ModifierFlags,
    },
    Modifier(ModifierEvent),
    Home(ButtonPhase),
    Power(ButtonPhase),
    Press(HardwareButton),
    WriteClipboard(String),
    RequestClipboard,
    SendText(String),
    RequestSnapshot,
    SaveSnapshot,
    SetDeviceLabel(String),
}

/// Cloneable front door to a running session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    mailbox: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    fn post(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.mailbox.send(cmd).map_err(|_| SessionError::ActorStopped)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.post(build(tx))?;
        rx.await.map_err(|_| SessionError::ActorStopped)
    }

    /// Validates `address` and starts connecting.  Returns as soon as the
    /// attempt has started; use [`SessionHandle::wait_connected`] to await it.
    pub async fn begin_session(&self, address: &str) -> Result<(), SessionError> {
        let address = address.to_owned();
        self.request(|reply| SessionCommand::Begin { address, reply })
            .await?
    }

    /// Waits until the current attempt reaches `Connected` (`Ok`) or ends
    /// (`Err` with the failure reason).
    pub async fn wait_connected(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::WaitConnected { reply })
            .await?
    }

    /// Begins a session and waits for its outcome.
    pub async fn connect(&self, address: &str) -> Result<(), SessionError> {
        self.begin_session(address).await?;
        self.wait_connected().await
    }

    pub async fn end_session(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::End { reply }).await
    }

    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        self.request(|reply| SessionCommand::Status { reply }).await
    }

    pub fn pointer(&self, phase: PointerPhase, local: Point, view: Size) -> Result<(), SessionError> {
        self.post(SessionCommand::Pointer { phase, local, view })
    }

    pub fn key(
        &self,
        phase: KeyPhase,
        code: u16,
        is_repeat: bool,
        flags: ModifierFlags,
    ) -> Result<(), SessionError> {
        self.post(SessionCommand::Key { phase, code, is_repeat, flags })
    }

    pub fn modifier(&self, event: ModifierEvent) -> Result<(), SessionError> {
        self.post(SessionCommand::Modifier(event))
    }

    pub fn home_button(&self, phase: ButtonPhase) -> Result<(), SessionError> {
        self.post(SessionCommand::Home(phase))
    }

    pub fn power_button(&self, phase: ButtonPhase) -> Result<(), SessionError> {
        self.post(SessionCommand::Power(phase))
    }

    pub fn press_button(&self, button: HardwareButton) -> Result<(), SessionError> {
        self.post(SessionCommand::Press(button))
    }

    pub fn write_clipboard(&self, text: &str) -> Result<(), SessionError> {
        self.post(SessionCommand::WriteClipboard(text.to_owned()))
    }

    pub fn request_clipboard(&self) -> Result<(), SessionError> {
        self.post(SessionCommand::RequestClipboard)
    }

    pub fn send_text(&self, text: &str) -> Result<(), SessionError> {
        self.post(SessionCommand::SendText(text.to_owned()))
    }

    pub fn request_snapshot(&self) -> Result<(), SessionError> {
        self.post(SessionCommand::RequestSnapshot)
    }

    pub fn save_snapshot(&self) -> Result<(), SessionError> {
        self.post(SessionCommand::SaveSnapshot)
    }

    pub fn set_device_label(&self, label: &str) -> Result<(), SessionError> {
        self.post(SessionCommand::SetDeviceLabel(label.to_owned()))
    }
}

/// Spawns the actor task and returns its handle.
///
/// The task exits once every [`SessionHandle`] clone has been dropped.
pub fn spawn_session(
    connector: Arc<dyn Connector>,
    settings: ConnectionSettings,
    observer: Arc<dyn SessionObserver>,
) -> (SessionHandle, JoinHandle<()>) {
    let (mailbox, commands) = mpsc::unbounded_channel();
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("session", id = %session_id);

    let task = tokio::spawn(run_actor(connector, settings, observer, commands).instrument(span));
    (SessionHandle { mailbox }, task)
}

async fn run_actor(
    connector: Arc<dyn Connector>,
    settings: ConnectionSettings,
    observer: Arc<dyn SessionObserver>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) {
    let (mut session, mut transport_events) = ControlSession::new(connector, settings, observer);
    let mut waiters: Vec<Reply<Result<(), SessionError>>> = Vec::new();

    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else { break };
                handle_command(&mut session, cmd, &mut waiters);
            }
            Some(event) = transport_events.recv() => {
                session.on_transport_event(event);
            }
            tick = session.next_tick() => {
                session.on_tick(tick);
            }
        }
        resolve_waiters(&session, &mut waiters);
    }

    session.end_session();
    info!("session actor stopped");
}

fn handle_command(
    session: &mut ControlSession,
    cmd: SessionCommand,
    waiters: &mut Vec<Reply<Result<(), SessionError>>>,
) {
    match cmd {
        SessionCommand::Begin { address, reply } => {
            let _ = reply.send(session.begin_session(&address));
        }
        SessionCommand::WaitConnected { reply } => waiters.push(reply),
        SessionCommand::End { reply } => {
            session.end_session();
            let _ = reply.send(());
        }
        SessionCommand::Status { reply } => {
            let _ = reply.send(session.status());
        }
        SessionCommand::Pointer { phase, local, view } => {
            session.handle_pointer_event(phase, local, view)
        }
        SessionCommand::Key { phase, code, is_repeat, flags } => {
            session.handle_key_event(phase, code, is_repeat, flags)
        }
        SessionCommand::Modifier(event) => session.handle_modifier_event(event),
        SessionCommand::Home(phase) => session.handle_home_button(phase),
        SessionCommand::Power(phase) => session.handle_power_button(phase),
        SessionCommand::Press(button) => session.press_button(button),
        SessionCommand::WriteClipboard(text) => session.write_clipboard(&text),
        SessionCommand::RequestClipboard => session.request_clipboard(),
        SessionCommand::SendText(text) => session.send_text(&text),
        SessionCommand::RequestSnapshot => session.request_snapshot(),
        SessionCommand::SaveSnapshot => session.save_snapshot(),
        SessionCommand::SetDeviceLabel(label) => session.set_device_label(&label),
    }
}

/// Answers `wait_connected` callers once the attempt has an outcome.
fn resolve_waiters(session: &ControlSession, waiters: &mut Vec<Reply<Result<(), SessionError>>>) {
    if waiters.is_empty() {
        return;
    }
    let outcome = match session.state() {
        ConnectionState::Connected => Ok(()),
        ConnectionState::Idle | ConnectionState::Failed(_) => Err(session
            .last_failure()
            .cloned()
            .unwrap_or(SessionError::ConnectionCancelled)),
        ConnectionState::Connecting | ConnectionState::Disconnecting => return,
    };
    debug!(waiters = waiters.len(), ?outcome, "connection attempt settled");
    for waiter in waiters.drain(..) {
        let _ = waiter.send(outcome.clone());
    }
}
