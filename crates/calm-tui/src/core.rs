//! CalmCore: single-owner event loop for all mutable state.
//!
//! The UI never touches the playback controller, the sleep timer or the
//! scene player directly; it sends `CoreEvent`s here.  Three inputs are
//! serialized through one `select!`:
//!
//! - client commands from the UI,
//! - Started/Stopped events from the media resource,
//! - a one-second tick that drives the sleep timer.
//!
//! After anything visible changes the core publishes a fresh `CalmState`
//! snapshot and broadcasts `StateUpdated`.

use std::path::Path;
use std::sync::Arc;

use calm_engine::catalog::{self, Catalog};
use calm_engine::config::{Config, ExpiryAction};
use calm_engine::protocol::{CalmState, Command, ResourceHealth};
use calm_engine::state::StateManager;
use calm_engine::{
    EmbedHost, MediaResource, Mode, ModeSelector, Notice, PlaybackController, Scene, SleepTimer,
    TickOutcome,
};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::embed::ExternalPlayer;
use crate::mpv::{MpvDriver, MpvResource};
use crate::BroadcastMessage;

/// All inputs into the CalmCore loop.
#[derive(Debug)]
pub enum CoreEvent {
    ClientCommand(Command),
    Shutdown,
}

/// Generic over the media resource and the embed host; the binary runs it
/// with mpv for both.
pub struct CalmCore<R: MediaResource, E: EmbedHost> {
    state_manager: Arc<StateManager>,
    playback: PlaybackController<R>,
    timer: SleepTimer,
    modes: ModeSelector,
    embed: E,
    scene: Scene,
    expiry_action: ExpiryAction,
    /// Core-level notice (scene player failures); playback keeps its own.
    notice: Option<Notice>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
    last_health: ResourceHealth,
    last_embed_mounted: bool,
}

impl CalmCore<MpvResource, ExternalPlayer> {
    pub async fn new(
        config: &Config,
        initial_mode: Mode,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
    ) -> anyhow::Result<Self> {
        let catalog = load_catalog(config);

        let mut driver = MpvDriver::new(config.mpv.binary.clone(), config.mpv.extra_args.clone());
        driver.last_volume = config.playback.default_volume.clamp(0.0, 1.0);
        let playback = PlaybackController::initialize(catalog, MpvResource::new(driver)).await?;
        let embed = ExternalPlayer::new(config.mpv.binary.clone(), config.mpv.embed_args.clone());

        Self::with_parts(config, initial_mode, playback, embed, broadcast_tx).await
    }
}

impl<R: MediaResource, E: EmbedHost> CalmCore<R, E> {
    pub async fn with_parts(
        config: &Config,
        initial_mode: Mode,
        mut playback: PlaybackController<R>,
        embed: E,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
    ) -> anyhow::Result<Self> {
        playback.set_volume(config.playback.default_volume).await?;

        let mut core = Self {
            state_manager: Arc::new(StateManager::new(CalmState::default())),
            playback,
            timer: SleepTimer::new(config.timer.presets_minutes.clone()),
            modes: ModeSelector::new(initial_mode),
            embed,
            scene: config.scene.to_scene(),
            expiry_action: config.playback.expiry_action,
            notice: None,
            broadcast_tx,
            last_health: ResourceHealth::Absent,
            last_embed_mounted: false,
        };
        let snapshot = core.snapshot();
        core.state_manager.publish(snapshot).await;
        info!(
            "CalmCore: ready, mode {:?}, {} tracks",
            initial_mode,
            core.playback.catalog().len()
        );
        Ok(core)
    }

    pub fn state_manager(&self) -> Arc<StateManager> {
        Arc::clone(&self.state_manager)
    }

    /// Returns when `Shutdown` arrives or the UI drops its sender.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<CoreEvent>) -> anyhow::Result<()> {
        info!("CalmCore: starting event loop");

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                evt = event_rx.recv() => match evt {
                    None => {
                        info!("CalmCore: event channel closed, shutting down");
                        break;
                    }
                    Some(CoreEvent::Shutdown) => {
                        info!("CalmCore: shutdown requested");
                        break;
                    }
                    Some(CoreEvent::ClientCommand(cmd)) => {
                        debug!("CalmCore: command {:?}", cmd);
                        // count whole seconds from the moment the timer was set
                        if restarts_ticker(&cmd) {
                            ticker.reset();
                        }
                        if let Err(e) = self.handle_command(cmd).await {
                            error!("CalmCore: command error: {}", e);
                        }
                        self.publish().await;
                    }
                },

                resource_evt = self.playback.next_event() => {
                    debug!("CalmCore: resource {:?}", resource_evt);
                    self.playback.apply_event(resource_evt).await;
                    self.publish().await;
                }

                _ = ticker.tick() => {
                    self.on_tick().await;
                }
            }
        }

        self.cleanup().await;
        Ok(())
    }

    async fn on_tick(&mut self) {
        let mut changed = false;
        match self.timer.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Running(_) => changed = true,
            TickOutcome::Expired => {
                self.playback.expire(self.expiry_action).await;
                changed = true;
            }
        }

        let health = self.resource_health();
        if health != self.last_health {
            self.last_health = health;
            changed = true;
        }
        let mounted = self.embed.is_mounted();
        if mounted != self.last_embed_mounted {
            self.last_embed_mounted = mounted;
            changed = true;
        }

        if changed {
            self.publish().await;
        }
    }

    // ── command handlers ──────────────────────────────────────────────────────

    async fn handle_command(&mut self, cmd: Command) -> anyhow::Result<()> {
        if is_native_audio_command(&cmd) && !self.modes.current().produces_native_audio() {
            warn!(
                "CalmCore: ignoring {:?} outside the audio mode ({:?})",
                cmd,
                self.modes.current()
            );
            return Ok(());
        }

        match cmd {
            Command::SwitchMode { mode } => {
                if let Some(t) = self
                    .modes
                    .switch_to(mode, &mut self.playback, &mut self.embed)
                    .await
                {
                    debug!(
                        "CalmCore: mode switch paused={} unmounted={}",
                        t.paused_playback, t.unmounted_embed
                    );
                }
            }
            Command::Play => self.playback.play().await?,
            Command::Pause => self.playback.pause().await,
            Command::TogglePause => self.playback.toggle().await?,
            Command::Stop => self.playback.stop().await,
            Command::Next => self.playback.next().await?,
            Command::Prev => self.playback.previous().await?,
            Command::SelectTrack { index } => self.playback.select_track(index).await?,
            Command::Volume { value } => {
                self.playback.set_volume(value).await?;
            }
            Command::StartTimer { minutes } => {
                self.timer.start(minutes)?;
                info!("CalmCore: sleep timer set for {} min", minutes);
            }
            Command::ClearTimer => {
                self.timer.clear();
                info!("CalmCore: sleep timer cleared");
            }
            Command::LaunchEmbed => {
                if let Err(e) = self.modes.launch_embed(&mut self.embed, &self.scene).await {
                    self.notice = Some(Notice {
                        message: format!("Could not open the scene player: {}", e),
                    });
                    return Err(e.into());
                }
            }
            Command::CloseEmbed => self.embed.unmount().await,
            Command::DismissNotice => {
                self.playback.dismiss_notice();
                self.notice = None;
            }
        }
        Ok(())
    }

    // ── state publication ─────────────────────────────────────────────────────

    fn resource_health(&self) -> ResourceHealth {
        self.playback
            .resource()
            .map(|r| r.health())
            .unwrap_or_default()
    }

    fn snapshot(&mut self) -> CalmState {
        let embed_mounted = self.embed.is_mounted();
        self.last_embed_mounted = embed_mounted;
        CalmState {
            rev: 0,
            tracks: self.playback.catalog().tracks().to_vec(),
            scene: Some(self.scene.clone()),
            mode: self.modes.current(),
            playback: self.playback.state().clone(),
            starting: self.playback.is_starting(),
            timer: self.timer.state(),
            timer_ends_at: self.timer.ends_at(chrono::Local::now()),
            timer_presets: self.timer.presets().to_vec(),
            notice: self.playback.notice().cloned().or_else(|| self.notice.clone()),
            embed_mounted,
            health: self.resource_health(),
        }
    }

    async fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.state_manager.publish(snapshot).await;
        let _ = self.broadcast_tx.send(BroadcastMessage::StateUpdated);
    }

    async fn cleanup(&mut self) {
        info!("CalmCore: cleanup, releasing mpv and closing the scene player");
        self.playback.teardown().await;
        self.embed.unmount().await;
    }
}

fn restarts_ticker(cmd: &Command) -> bool {
    matches!(cmd, Command::StartTimer { .. })
}

fn is_native_audio_command(cmd: &Command) -> bool {
    matches!(
        cmd,
        Command::Play
            | Command::TogglePause
            | Command::Next
            | Command::Prev
            | Command::SelectTrack { .. }
    )
}

// ── catalog loader ────────────────────────────────────────────────────────────

/// First usable source wins: the configured TOML file, the configured m3u,
/// a `catalog.toml` shipped beside the executable, then the built-in list.
pub fn load_catalog(config: &Config) -> Catalog {
    let toml_path = &config.catalog.tracks_file;
    if toml_path.exists() {
        match catalog::load_toml(toml_path) {
            Ok(c) => {
                info!("Loaded {} tracks from {}", c.len(), toml_path.display());
                return c;
            }
            Err(e) => warn!("Failed to load {}: {}", toml_path.display(), e),
        }
    }

    if let Some(m3u) = config.catalog.m3u_file.as_deref() {
        if let Some(c) = try_m3u(m3u) {
            return c;
        }
    }

    if let Some(beside) = calm_engine::platform::find_beside_exe(&["catalog.toml"]) {
        match catalog::load_toml(&beside) {
            Ok(c) => {
                info!("Loaded {} tracks from beside-exe {}", c.len(), beside.display());
                return c;
            }
            Err(e) => warn!("Failed to load beside-exe catalog: {}", e),
        }
    }

    info!("Using the built-in track list");
    Catalog::defaults()
}

fn try_m3u(path: &Path) -> Option<Catalog> {
    if !path.exists() {
        warn!("Configured m3u file {} does not exist", path.display());
        return None;
    }
    match catalog::load_m3u(path) {
        Ok(c) => {
            info!("Loaded {} tracks from m3u {}", c.len(), path.display());
            Some(c)
        }
        Err(e) => {
            warn!("Failed to load m3u {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use calm_engine::{
        EmbedError, Preload, ResourceError, ResourceEvent, Subscribers, SubscriptionId,
    };

    #[derive(Debug, Default)]
    struct Calls {
        plays: usize,
        pauses: usize,
        unloads: usize,
        playing: bool,
    }

    /// In-memory resource that starts as soon as it is asked to.
    struct InstantResource {
        calls: Arc<Mutex<Calls>>,
        subs: Subscribers,
    }

    #[async_trait]
    impl MediaResource for InstantResource {
        async fn set_preload(&mut self, _preload: Preload) -> Result<(), ResourceError> {
            Ok(())
        }

        async fn set_source(&mut self, _url: &str) -> Result<(), ResourceError> {
            Ok(())
        }

        async fn load(&mut self) -> Result<(), ResourceError> {
            Ok(())
        }

        async fn play(&mut self) -> Result<(), ResourceError> {
            {
                let mut calls = self.calls.lock().unwrap();
                calls.plays += 1;
                calls.playing = true;
            }
            self.subs.notify(ResourceEvent::Started);
            Ok(())
        }

        async fn pause(&mut self) {
            let was_playing = {
                let mut calls = self.calls.lock().unwrap();
                calls.pauses += 1;
                std::mem::replace(&mut calls.playing, false)
            };
            if was_playing {
                self.subs.notify(ResourceEvent::Stopped);
            }
        }

        async fn unload(&mut self) {
            let mut calls = self.calls.lock().unwrap();
            calls.unloads += 1;
            calls.playing = false;
        }

        fn is_paused(&self) -> bool {
            !self.calls.lock().unwrap().playing
        }

        async fn set_volume(&mut self, _volume: f32) {}

        fn subscribe(&mut self, tx: mpsc::Sender<ResourceEvent>) -> SubscriptionId {
            self.subs.add(tx)
        }

        fn unsubscribe(&mut self, id: SubscriptionId) {
            self.subs.remove(id);
        }

        async fn release(&mut self) {
            self.subs.clear();
        }
    }

    #[derive(Default)]
    struct SceneWindow {
        mounted: bool,
    }

    #[async_trait]
    impl EmbedHost for SceneWindow {
        async fn mount(&mut self, _scene: &Scene) -> Result<(), EmbedError> {
            self.mounted = true;
            Ok(())
        }

        async fn unmount(&mut self) {
            self.mounted = false;
        }

        fn is_mounted(&mut self) -> bool {
            self.mounted
        }
    }

    async fn test_core(
        config: &Config,
        mode: Mode,
    ) -> (CalmCore<InstantResource, SceneWindow>, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let resource = InstantResource {
            calls: Arc::clone(&calls),
            subs: Subscribers::new(),
        };
        let playback = PlaybackController::initialize(Catalog::defaults(), resource)
            .await
            .unwrap();
        let (tx, _) = broadcast::channel(16);
        let core = CalmCore::with_parts(config, mode, playback, SceneWindow::default(), tx)
            .await
            .unwrap();
        (core, calls)
    }

    #[tokio::test]
    async fn test_playback_commands_ignored_outside_audio() {
        let (mut core, calls) = test_core(&Config::default(), Mode::Embed).await;

        core.handle_command(Command::Play).await.unwrap();
        core.handle_command(Command::Next).await.unwrap();
        core.playback.pump().await;
        assert_eq!(calls.lock().unwrap().plays, 0);
        assert_eq!(core.playback.current_index(), 0);
        assert!(!core.playback.is_playing());

        core.handle_command(Command::SwitchMode { mode: Mode::Audio })
            .await
            .unwrap();
        core.handle_command(Command::Play).await.unwrap();
        core.playback.pump().await;
        assert_eq!(calls.lock().unwrap().plays, 1);
        assert!(core.playback.is_playing());
    }

    #[tokio::test]
    async fn test_timer_expiry_stops_playback_once() {
        let mut config = Config::default();
        config.playback.expiry_action = ExpiryAction::Stop;
        let (mut core, calls) = test_core(&config, Mode::Audio).await;

        core.handle_command(Command::Play).await.unwrap();
        core.playback.pump().await;
        core.handle_command(Command::StartTimer { minutes: 1 })
            .await
            .unwrap();

        for _ in 0..59 {
            core.on_tick().await;
        }
        assert!(core.playback.is_playing());
        core.on_tick().await;
        assert!(!core.playback.is_playing());
        assert_eq!(calls.lock().unwrap().unloads, 1);

        let snapshot = core.state_manager().get_state().await;
        assert_eq!(snapshot.timer.seconds_remaining, None);
        assert!(!snapshot.playback.is_playing);

        core.on_tick().await;
        assert_eq!(calls.lock().unwrap().unloads, 1);
    }

    #[tokio::test]
    async fn test_leaving_embed_closes_the_scene() {
        let (mut core, _calls) = test_core(&Config::default(), Mode::Embed).await;
        core.handle_command(Command::LaunchEmbed).await.unwrap();
        assert!(core.embed.is_mounted());

        core.handle_command(Command::SwitchMode { mode: Mode::Audio })
            .await
            .unwrap();
        assert!(!core.embed.is_mounted());
        assert!(!core.playback.is_playing());
    }

    #[test]
    fn test_only_starting_a_timer_restarts_the_ticker() {
        assert!(restarts_ticker(&Command::StartTimer { minutes: 15 }));
        assert!(!restarts_ticker(&Command::ClearTimer));
        assert!(!restarts_ticker(&Command::Play));
    }

    #[test]
    fn test_only_native_audio_commands_are_gated() {
        assert!(is_native_audio_command(&Command::Play));
        assert!(is_native_audio_command(&Command::SelectTrack { index: 0 }));
        assert!(!is_native_audio_command(&Command::Pause));
        assert!(!is_native_audio_command(&Command::Stop));
        assert!(!is_native_audio_command(&Command::Volume { value: 0.3 }));
        assert!(!is_native_audio_command(&Command::SwitchMode { mode: Mode::Audio }));
    }

    #[test]
    fn test_missing_sources_fall_back_to_defaults() {
        let mut config = Config::default();
        config.catalog.tracks_file = "/nonexistent/catalog.toml".into();
        config.catalog.m3u_file = Some("/nonexistent/list.m3u".into());
        let catalog = load_catalog(&config);
        assert_eq!(catalog.len(), Catalog::defaults().len());
    }
}
