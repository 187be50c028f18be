mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod embed;
mod focus;
mod mpv;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use calm_engine::config::Config;
use calm_engine::Mode;

/// What the CalmCore broadcasts to the UI.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// The snapshot changed; receivers fetch it from the StateManager.
    StateUpdated,
    /// A WARN/ERROR line for the status bar.
    Log(String),
}

#[derive(Parser, Debug)]
#[command(name = "calmspace", version, about = "A calm ambient sound player for the terminal")]
struct Args {
    /// Config file (default: <config dir>/calmspace/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in this mode: embed (Water + Piano) or audio (Deep Calm)
    #[arg(long)]
    mode: Option<Mode>,

    /// mpv binary to use instead of the configured one
    #[arg(long)]
    mpv: Option<PathBuf>,
}

/// Forwards WARN and ERROR events to the broadcast channel.
struct BroadcastLayer {
    sender: broadcast::Sender<BroadcastMessage>,
}

impl<S> tracing_subscriber::Layer<S> for BroadcastLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = event.metadata().level();
        if !matches!(*level, tracing::Level::WARN | tracing::Level::ERROR) {
            return;
        }
        let mut message = format!("{} [{}] ", chrono::Local::now().format("%H:%M:%S"), level);
        event.record(&mut MessageVisitor(&mut message));
        // no receivers yet is fine
        let _ = self.sender.send(BroadcastMessage::Log(message));
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)?;
    if let Some(mpv) = args.mpv {
        config.mpv.binary = Some(mpv);
    }

    // Broadcast channel first so the log layer can use it
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<BroadcastMessage>(256);

    let data_dir = calm_engine::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("calmspace.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(BroadcastLayer {
            sender: broadcast_tx.clone(),
        })
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .init();

    eprintln!("calmspace log: {}", log_path.display());
    info!("calmspace starting, config {:?}", config_path);

    let mode = args.mode.unwrap_or(config.ui.default_mode);

    // ── Core (owns playback, timer, scene player) ────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<core::CoreEvent>(256);
    let calm_core = core::CalmCore::new(&config, mode, broadcast_tx.clone()).await?;
    let state_manager = calm_core.state_manager();
    let core_task = tokio::spawn(calm_core.run(event_rx));

    // ── UI ───────────────────────────────────────────────────────────────────
    let initial = state_manager.get_state().await;
    let app = app::App::new(
        initial,
        config.playback.volume_step,
        state_manager,
        event_tx.clone(),
    );
    let ui_result = app.run(broadcast_rx).await;

    // Stop the core even if the UI bailed out, so mpv is not left behind
    let _ = event_tx.send(core::CoreEvent::Shutdown).await;
    drop(event_tx);
    match core_task.await {
        Ok(Err(e)) => error!("core exited with error: {}", e),
        Err(e) => error!("core task failed: {}", e),
        Ok(Ok(())) => {}
    }

    info!("calmspace stopped");
    ui_result
}
