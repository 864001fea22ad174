//! Remote-control client: headless driver entry point.
//!
//! Bootstraps a device (name, status, control-script spawn), opens the control
//! session, then forwards line commands read from stdin until `quit`, end of
//! input, or Ctrl+C.  See `infrastructure::console` for the command syntax.
//!
//! # Usage
//!
//! ```text
//! rc-client --address <HOST> [OPTIONS]
//!
//! Options:
//!   --address <HOST>    Device IPv4 address or hostname
//!   --config  <PATH>    Config file [default: platform config dir]
//!   --script  <PATH>    Control script to spawn when the daemon is not running
//!   --view    <WxH>     Size of the local view pointer coordinates refer to
//! ```
//!
//! | Variable             | Description                        |
//! |----------------------|------------------------------------|
//! | `RC_DEVICE_ADDRESS`  | Device address                     |
//! | `RC_CONFIG`          | Config file path                   |
//! | `RC_CONTROL_SCRIPT`  | Control script path                |
//! | `RUST_LOG`           | Log filter (overrides `log_level`) |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::Parser;
use rc_core::{HardwareButton, Size};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rc_client::application::bootstrap::bootstrap_session;
use rc_client::application::connection::ConnectionState;
use rc_client::application::control_session::{ButtonPhase, ModifierEvent, SessionObserver};
use rc_client::application::session_actor::{spawn_session, SessionHandle};
use rc_client::infrastructure::config::{load_config, load_config_from, ClientConfig};
use rc_client::infrastructure::console::{parse_line, ConsoleCommand, ConsoleError};
use rc_client::infrastructure::device_api::DeviceApi;
use rc_client::infrastructure::transport::WebSocketConnector;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote-control client for a device running the control daemon.
#[derive(Debug, Parser)]
#[command(name = "rc-client", about = "Drive a remote device from the command line", version)]
struct Cli {
    /// Device IPv4 address or hostname.
    #[arg(long, env = "RC_DEVICE_ADDRESS")]
    address: String,

    /// Config file to read instead of the platform default.
    #[arg(long, env = "RC_CONFIG")]
    config: Option<PathBuf>,

    /// Control script uploaded when the device daemon has to be spawned.
    #[arg(long, env = "RC_CONTROL_SCRIPT")]
    script: Option<PathBuf>,

    /// Size of the local view, as `WIDTHxHEIGHT`.
    #[arg(long, default_value = "390x844")]
    view: String,
}

/// Everything the driver needs, resolved from CLI and config.
struct RunConfig {
    address: String,
    config: ClientConfig,
    script: Option<Vec<u8>>,
    view: Size,
}

impl Cli {
    /// Loads the config file and script and parses the view size.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read or parsed, the script
    /// cannot be read, or `--view` is malformed.
    fn into_run_config(self) -> anyhow::Result<RunConfig> {
        let config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => load_config().context("loading platform config")?,
        };
        let script = self
            .script
            .as_ref()
            .map(|path| {
                std::fs::read(path)
                    .with_context(|| format!("reading control script {}", path.display()))
            })
            .transpose()?;
        let view = parse_view(&self.view)?;

        Ok(RunConfig {
            address: self.address,
            config,
            script,
            view,
        })
    }
}

fn parse_view(s: &str) -> anyhow::Result<Size> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("view must look like 390x844, got {s:?}"))?;
    let size = Size::new(
        w.trim().parse().with_context(|| format!("bad view width {w:?}"))?,
        h.trim().parse().with_context(|| format!("bad view height {h:?}"))?,
    );
    if !size.is_usable() {
        bail!("view size must be positive, got {s:?}");
    }
    Ok(size)
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs session events, prints clipboard text and saves snapshots.
struct ConsoleObserver {
    snapshot_dir: PathBuf,
}

fn snapshot_file_name(at: NaiveDateTime) -> String {
    at.format("screenshot_%Y-%m-%d-%H-%M-%S.png").to_string()
}

impl ConsoleObserver {
    fn save_snapshot(&self, png: &[u8]) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.snapshot_dir)
            .with_context(|| format!("creating {}", self.snapshot_dir.display()))?;
        let path = self
            .snapshot_dir
            .join(snapshot_file_name(chrono::Local::now().naive_local()));
        std::fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

impl SessionObserver for ConsoleObserver {
    fn connection_state_changed(&self, state: &ConnectionState) {
        match state {
            ConnectionState::Failed(reason) => error!("connection failed: {reason}"),
            other => info!(state = other.name(), "connection state"),
        }
    }

    fn clipboard_received(&self, text: &str) {
        println!("{text}");
    }

    fn snapshot_received(&self, png: &[u8]) {
        match self.save_snapshot(png) {
            Ok(path) => info!("snapshot saved to {}", path.display()),
            Err(e) => warn!("could not save snapshot: {e:#}"),
        }
    }

    fn device_label_updated(&self, label: &str) {
        info!(%label, "device");
    }
}

// ── Command dispatch ──────────────────────────────────────────────────────────

async fn dispatch(handle: &SessionHandle, cmd: ConsoleCommand, view: &mut Size) -> anyhow::Result<()> {
    match cmd {
        ConsoleCommand::Pointer(phase, point) => handle.pointer(phase, point, *view)?,
        ConsoleCommand::View(size) => *view = size,
        ConsoleCommand::Key { phase, code, is_repeat, flags } => {
            handle.key(phase, code, is_repeat, flags)?
        }
        ConsoleCommand::Flags { code, flags } => handle.modifier(ModifierEvent { key_code: code, flags })?,
        ConsoleCommand::Home => {
            handle.home_button(ButtonPhase::Down)?;
            handle.home_button(ButtonPhase::Up)?;
        }
        ConsoleCommand::Power => {
            handle.power_button(ButtonPhase::Down)?;
            handle.power_button(ButtonPhase::Up)?;
        }
        ConsoleCommand::Mute => handle.press_button(HardwareButton::Mute)?,
        ConsoleCommand::VolumeUp => handle.press_button(HardwareButton::VolumeIncrement)?,
        ConsoleCommand::VolumeDown => handle.press_button(HardwareButton::VolumeDecrement)?,
        ConsoleCommand::Snapshot => handle.request_snapshot()?,
        ConsoleCommand::SaveSnapshot => handle.save_snapshot()?,
        ConsoleCommand::ToggleKeyboard => handle.press_button(HardwareButton::ToggleKeyboard)?,
        ConsoleCommand::Text(text) => handle.send_text(&text)?,
        ConsoleCommand::ClipboardPush(text) => handle.write_clipboard(&text)?,
        ConsoleCommand::ClipboardPull => handle.request_clipboard()?,
        ConsoleCommand::Status => {
            let status = handle.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        // Handled by the read loop.
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let run = Cli::parse().into_run_config()?;

    // `RUST_LOG` wins; otherwise the config's `log_level`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&run.config.client.log_level)),
        )
        .init();

    let settings = run.config.connection_settings();
    let observer = Arc::new(ConsoleObserver {
        snapshot_dir: run.config.snapshot_dir(),
    });
    let (handle, actor) = spawn_session(Arc::new(WebSocketConnector::new()), settings, observer);

    let api = DeviceApi::new(
        run.config.device.api_port,
        Duration::from_millis(run.config.session.connect_timeout_ms),
    )?;

    info!(address = %run.address, "connecting");
    bootstrap_session(&handle, &api, &run.address, run.script.as_deref())
        .await
        .with_context(|| format!("could not connect to {}", run.address))?;
    info!("connected; reading commands from stdin");

    let mut view = run.view;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    error!("failed to listen for Ctrl+C signal: {e}");
                }
                info!("received Ctrl+C, ending session");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                match parse_line(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(cmd) => dispatch(&handle, cmd, &mut view).await?,
                    Err(ConsoleError::Empty) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    handle.end_session().await?;
    drop(handle);
    actor.await.context("session actor panicked")?;
    info!("session ended");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
