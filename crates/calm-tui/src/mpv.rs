//! mpv-backed media resource.
//!
//! Architecture:
//!
//! ```text
//!   MpvResource::play()
//!         │  (first play only: spawn + connect)
//!         ▼
//!   MpvDriver::spawn_and_connect()
//!         ├── writer_task   ← MpvRequest via mpsc → socket
//!         └── reader_task   ← JSON lines from socket
//!                                ├── response (request_id) → oneshot reply
//!                                └── property-change       → event pump
//!                                                               │
//!                                              PlayObserver ◀───┘
//!                                                   │ Started / Stopped
//!                                                   ▼
//!                                              Subscribers
//! ```
//!
//! Nothing is spawned until the first `play()` when preload is off, so
//! starting the app never opens a stream connection.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use calm_engine::platform;
use calm_engine::protocol::ResourceHealth;
use calm_engine::{MediaResource, Preload, ResourceError, ResourceEvent, Subscribers, SubscriptionId};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

/// observe_property IDs.
pub const OBS_CORE_IDLE: u64 = 1;
pub const OBS_PAUSE: u64 = 2;

const IPC_TIMEOUT_SECS: u64 = 5;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct PendingRequest {
    req_id: u64,
    payload: String,
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// Unsolicited mpv message (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    pub fn as_property_change(&self) -> Option<(u64, &Value)> {
        if self.raw.get("event")?.as_str()? == "property-change" {
            let id = self.raw.get("id")?.as_u64()?;
            let data = self.raw.get("data").unwrap_or(&Value::Null);
            Some((id, data))
        } else {
            None
        }
    }

    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// mpv finished the file by itself (eof, error).  `stop` and `redirect`
    /// come from our own loadfile/stop and do not count.
    pub fn ends_source(&self) -> bool {
        if self.event_name() != Some("end-file") {
            return false;
        }
        !matches!(
            self.raw.get("reason").and_then(|v| v.as_str()),
            Some("stop") | Some("redirect")
        )
    }
}

// ── handle ────────────────────────────────────────────────────────────────────

/// Cloneable handle to the writer task.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(IPC_TIMEOUT_SECS), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    pub async fn load_stream(&self, url: &str) -> anyhow::Result<()> {
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url, "replace"])).await?;
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }

    pub async fn set_volume(&self, vol: f32) -> anyhow::Result<()> {
        self.send(json!(["set_property", "volume", volume_percent(vol)]))
            .await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    /// Must be called on every fresh connection.
    pub async fn observe_playback(&self) {
        for (id, name) in [(OBS_CORE_IDLE, "core-idle"), (OBS_PAUSE, "pause")] {
            match self.send(json!(["observe_property", id, name])).await {
                Ok(_) => debug!("mpv: observe_property id={} name={}", id, name),
                Err(e) => warn!("mpv: observe_property {} failed: {}", name, e),
            }
        }
    }
}

fn volume_percent(vol: f32) -> f64 {
    (f64::from(vol) * 100.0).clamp(0.0, 100.0)
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process.
pub struct MpvDriver {
    pub socket_name: String,
    binary: Option<PathBuf>,
    extra_args: Vec<String>,
    process: Option<tokio::process::Child>,
    pub last_volume: f32,
}

impl MpvDriver {
    pub fn new(binary: Option<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            socket_name: platform::mpv_socket_name(),
            binary,
            extra_args,
            process: None,
            last_volume: 0.5,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        let Some(child) = self.process.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                match status.code() {
                    Some(code) => warn!("mpv process exited with code: {}", code),
                    None => warn!("mpv process terminated by signal"),
                }
                false
            }
            Err(e) => {
                warn!("mpv process_alive check failed: {}", e);
                false
            }
        }
    }

    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
        #[cfg(unix)]
        {
            let _ = tokio::fs::remove_file(&self.socket_name).await;
        }
    }

    fn resolve_binary(&self) -> Option<PathBuf> {
        self.binary
            .clone()
            .filter(|p| p.exists())
            .or_else(platform::find_mpv_binary)
    }

    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let mpv_binary = self
            .resolve_binary()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;
        info!("mpv: spawning {}", mpv_binary.display());

        let stderr_path = platform::data_dir().join("mpv-stderr.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;

        let child = tokio::process::Command::new(&mpv_binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg(platform::mpv_socket_arg())
            .arg(format!("--volume={}", volume_percent(self.last_volume).round()))
            .args(&self.extra_args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(stderr_file)
            .kill_on_drop(true)
            .spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        let handle = self.connect(event_tx).await?;
        info!("mpv: connected to IPC socket");
        Ok(handle)
    }

    #[cfg(unix)]
    async fn connect(&mut self, event_tx: mpsc::Sender<MpvEvent>) -> anyhow::Result<MpvHandle> {
        let socket_path = PathBuf::from(&self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                if let Ok(stream) = tokio::net::UnixStream::connect(&socket_path).await {
                    return Ok(start_io_tasks(stream, event_tx));
                }
            }
            if !self.process_alive() {
                anyhow::bail!("mpv exited before its IPC socket appeared");
            }
        }
        anyhow::bail!("mpv IPC socket did not appear")
    }

    #[cfg(windows)]
    async fn connect(&mut self, event_tx: mpsc::Sender<MpvEvent>) -> anyhow::Result<MpvHandle> {
        use tokio::net::windows::named_pipe::ClientOptions;

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                return Ok(start_io_tasks(client, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<S>(stream: S, event_tx: mpsc::Sender<MpvEvent>) -> MpvHandle
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(write_half, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

async fn fail_pending(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: mpsc::Sender<MpvEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_pending(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let Some(tx) = pending.lock().await.remove(&req_id) else {
                        debug!("mpv reader: response for unknown req={}", req_id);
                        continue;
                    };
                    let result = match val["error"].as_str() {
                        Some("success") => Ok(val),
                        other => Err(anyhow::anyhow!(
                            "mpv error: {}",
                            other.unwrap_or("unknown error")
                        )),
                    };
                    let _ = tx.send(result);
                } else if event_tx.send(MpvEvent { raw: val }).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_pending(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // register first so the reader can match the reply
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: req={} {}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── event translation ─────────────────────────────────────────────────────────

/// Turns mpv's `core-idle` / `pause` observations into Started/Stopped.
///
/// Audio is flowing exactly when mpv is neither paused nor idle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayObserver {
    core_idle: Option<bool>,
    pause: bool,
    running: bool,
}

impl PlayObserver {
    pub fn observed_pause(&self) -> bool {
        self.pause
    }

    pub fn apply(&mut self, evt: &MpvEvent) -> Option<ResourceEvent> {
        if let Some((id, data)) = evt.as_property_change() {
            match id {
                OBS_CORE_IDLE => self.core_idle = data.as_bool(),
                OBS_PAUSE => self.pause = data.as_bool().unwrap_or(false),
                _ => return None,
            }
        } else {
            match evt.event_name() {
                Some("end-file") => {
                    let reason = evt.raw.get("reason").and_then(|v| v.as_str());
                    info!("mpv: end-file reason={}", reason.unwrap_or("unknown"));
                    self.core_idle = Some(true);
                }
                Some("start-file") => self.core_idle = Some(true),
                _ => return None,
            }
        }
        self.settle()
    }

    /// Connection lost: whatever was playing is gone.
    pub fn disconnect(&mut self) -> Option<ResourceEvent> {
        self.core_idle = None;
        self.settle()
    }

    fn settle(&mut self) -> Option<ResourceEvent> {
        let running = !self.pause && self.core_idle == Some(false);
        if running == self.running {
            return None;
        }
        self.running = running;
        Some(if running {
            ResourceEvent::Started
        } else {
            ResourceEvent::Stopped
        })
    }
}

// ── MediaResource implementation ──────────────────────────────────────────────

/// State shared between the resource and its event pump.
#[derive(Default)]
struct Shared {
    observer: PlayObserver,
    /// Our own view of the pause flag; play/pause set it, mpv can override it.
    paused: bool,
    /// The current source has been handed to mpv with loadfile.
    loaded: bool,
    health: ResourceHealth,
    subscribers: Subscribers,
}

pub struct MpvResource {
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    pump: Option<tokio::task::JoinHandle<()>>,
    shared: Arc<std::sync::Mutex<Shared>>,
    preload: Preload,
    source: Option<String>,
}

impl MpvResource {
    pub fn new(driver: MpvDriver) -> Self {
        let shared = Shared {
            paused: true,
            ..Default::default()
        };
        Self {
            driver,
            handle: None,
            pump: None,
            shared: Arc::new(std::sync::Mutex::new(shared)),
            preload: Preload::None,
            source: None,
        }
    }

    fn with_shared<T>(&self, f: impl FnOnce(&mut Shared) -> T) -> T {
        // a poisoned lock only means an event pump panicked; the data is still usable
        let mut guard = match self.shared.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    fn set_health(&self, health: ResourceHealth) {
        self.with_shared(|s| {
            if s.health != health {
                info!("mpv: health {:?} → {:?}", s.health, health);
                s.health = health;
            }
        });
    }

    async fn ensure_handle(&mut self) -> Result<MpvHandle, ResourceError> {
        if let Some(handle) = self.handle.as_ref() {
            if self.driver.process_alive() {
                return Ok(handle.clone());
            }
            warn!("mpv: process died, respawning");
            self.drop_connection();
        }

        self.set_health(ResourceHealth::Starting);
        let (event_tx, event_rx) = mpsc::channel::<MpvEvent>(64);
        let handle = match self.driver.spawn_and_connect(event_tx).await {
            Ok(h) => h,
            Err(e) => {
                self.set_health(ResourceHealth::Dead);
                return Err(ResourceError::Unavailable(e.to_string()));
            }
        };
        self.pump = Some(spawn_event_pump(event_rx, Arc::clone(&self.shared)));
        handle.observe_playback().await;
        self.set_health(ResourceHealth::Running);
        self.set_loaded(false);
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    fn set_loaded(&self, loaded: bool) {
        self.with_shared(|s| s.loaded = loaded);
    }

    fn drop_connection(&mut self) {
        self.handle = None;
        self.set_loaded(false);
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.with_shared(|s| {
            if let Some(evt) = s.observer.disconnect() {
                s.subscribers.notify(evt);
            }
        });
    }
}

fn spawn_event_pump(
    mut rx: mpsc::Receiver<MpvEvent>,
    shared: Arc<std::sync::Mutex<Shared>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(evt) = rx.recv().await {
            let Ok(mut s) = shared.lock() else { break };
            absorb_event(&mut s, &evt);
        }
        // reader task ended: the socket is gone
        if let Ok(mut s) = shared.lock() {
            warn!("mpv: IPC connection lost");
            s.health = ResourceHealth::Dead;
            s.paused = true;
            s.loaded = false;
            if let Some(evt) = s.observer.disconnect() {
                s.subscribers.notify(evt);
            }
        }
    })
}

fn absorb_event(s: &mut Shared, evt: &MpvEvent) {
    let translated = s.observer.apply(evt);
    if matches!(evt.as_property_change(), Some((OBS_PAUSE, _))) {
        s.paused = s.observer.observed_pause();
    }
    if evt.ends_source() {
        // mpv is idle now: the next play must loadfile again
        s.paused = true;
        s.loaded = false;
    }
    if let Some(event) = translated {
        debug!("mpv: {:?}", event);
        s.subscribers.notify(event);
    }
}

#[async_trait]
impl MediaResource for MpvResource {
    async fn set_preload(&mut self, preload: Preload) -> Result<(), ResourceError> {
        self.preload = preload;
        Ok(())
    }

    async fn set_source(&mut self, url: &str) -> Result<(), ResourceError> {
        self.source = Some(url.to_string());
        self.set_loaded(false);
        if self.preload == Preload::Auto {
            self.ensure_handle().await?;
        }
        Ok(())
    }

    async fn load(&mut self) -> Result<(), ResourceError> {
        // the next play() re-issues loadfile, which restarts the stream
        self.set_loaded(false);
        Ok(())
    }

    async fn play(&mut self) -> Result<(), ResourceError> {
        let url = self.source.clone().ok_or(ResourceError::NoSource)?;
        let handle = self.ensure_handle().await?;

        if !self.with_shared(|s| s.loaded) {
            handle
                .load_stream(&url)
                .await
                .map_err(|e| ResourceError::PlayRejected(e.to_string()))?;
            self.set_loaded(true);
        }
        handle
            .set_pause(false)
            .await
            .map_err(|e| ResourceError::PlayRejected(e.to_string()))?;
        self.with_shared(|s| s.paused = false);
        Ok(())
    }

    async fn pause(&mut self) {
        self.with_shared(|s| s.paused = true);
        if let Some(handle) = self.handle.as_ref() {
            if let Err(e) = handle.set_pause(true).await {
                warn!("mpv: pause failed: {}", e);
            }
        }
    }

    async fn unload(&mut self) {
        self.with_shared(|s| s.paused = true);
        if let Some(handle) = self.handle.as_ref() {
            if let Err(e) = handle.stop().await {
                warn!("mpv: stop failed: {}", e);
            }
        }
        self.source = None;
        self.set_loaded(false);
    }

    fn is_paused(&self) -> bool {
        self.with_shared(|s| s.paused)
    }

    fn health(&self) -> ResourceHealth {
        self.with_shared(|s| s.health.clone())
    }

    async fn set_volume(&mut self, volume: f32) {
        self.driver.last_volume = volume;
        if let Some(handle) = self.handle.as_ref() {
            if let Err(e) = handle.set_volume(volume).await {
                warn!("mpv: set volume failed: {}", e);
            }
        }
    }

    fn subscribe(&mut self, tx: mpsc::Sender<ResourceEvent>) -> SubscriptionId {
        self.with_shared(|s| s.subscribers.add(tx))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.with_shared(|s| s.subscribers.remove(id));
    }

    async fn release(&mut self) {
        info!("mpv: releasing");
        self.with_shared(|s| s.subscribers.clear());
        if let Some(handle) = self.handle.take() {
            let _ = handle.stop().await;
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.driver.kill().await;
        self.set_health(ResourceHealth::Absent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(id: u64, data: Value) -> MpvEvent {
        MpvEvent {
            raw: json!({ "event": "property-change", "id": id, "data": data }),
        }
    }

    fn named(name: &str) -> MpvEvent {
        MpvEvent {
            raw: json!({ "event": name, "reason": "eof" }),
        }
    }

    #[test]
    fn test_started_only_when_unpaused_and_busy() {
        let mut obs = PlayObserver::default();
        assert_eq!(obs.apply(&prop(OBS_PAUSE, json!(false))), None);
        assert_eq!(obs.apply(&prop(OBS_CORE_IDLE, json!(true))), None);
        assert_eq!(
            obs.apply(&prop(OBS_CORE_IDLE, json!(false))),
            Some(ResourceEvent::Started)
        );
        assert!(obs.running);
        // repeated value is not a transition
        assert_eq!(obs.apply(&prop(OBS_CORE_IDLE, json!(false))), None);
    }

    #[test]
    fn test_pause_and_end_file_stop() {
        let mut obs = PlayObserver::default();
        obs.apply(&prop(OBS_CORE_IDLE, json!(false)));
        assert!(obs.running);

        assert_eq!(
            obs.apply(&prop(OBS_PAUSE, json!(true))),
            Some(ResourceEvent::Stopped)
        );
        assert_eq!(
            obs.apply(&prop(OBS_PAUSE, json!(false))),
            Some(ResourceEvent::Started)
        );
        assert_eq!(obs.apply(&named("end-file")), Some(ResourceEvent::Stopped));
        assert_eq!(obs.apply(&named("file-loaded")), None);
    }

    fn end_file(reason: &str) -> MpvEvent {
        MpvEvent {
            raw: json!({ "event": "end-file", "reason": reason }),
        }
    }

    #[test]
    fn test_stream_ending_on_its_own_forces_reload() {
        let mut shared = Shared {
            paused: false,
            loaded: true,
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(4);
        shared.subscribers.add(tx);

        absorb_event(&mut shared, &prop(OBS_PAUSE, json!(false)));
        absorb_event(&mut shared, &prop(OBS_CORE_IDLE, json!(false)));
        assert_eq!(rx.try_recv().unwrap(), ResourceEvent::Started);

        absorb_event(&mut shared, &end_file("error"));
        assert_eq!(rx.try_recv().unwrap(), ResourceEvent::Stopped);
        // toggle must see a paused player, play must loadfile again
        assert!(shared.paused);
        assert!(!shared.loaded);
    }

    #[test]
    fn test_replacing_the_file_keeps_it_loaded() {
        let mut shared = Shared {
            paused: false,
            loaded: true,
            ..Default::default()
        };
        absorb_event(&mut shared, &end_file("stop"));
        assert!(!shared.paused);
        assert!(shared.loaded);
        assert!(end_file("eof").ends_source());
        assert!(!end_file("redirect").ends_source());
    }

    #[test]
    fn test_disconnect_stops_running_player() {
        let mut obs = PlayObserver::default();
        assert_eq!(obs.disconnect(), None);
        obs.apply(&prop(OBS_CORE_IDLE, json!(false)));
        assert_eq!(obs.disconnect(), Some(ResourceEvent::Stopped));
    }

    #[test]
    fn test_unknown_property_ignored() {
        let mut obs = PlayObserver::default();
        assert_eq!(obs.apply(&prop(42, json!("x"))), None);
        assert_eq!(obs, PlayObserver::default());
    }

    #[test]
    fn test_volume_percent_clamps() {
        assert_eq!(volume_percent(0.5), 50.0);
        assert_eq!(volume_percent(2.0), 100.0);
        assert_eq!(volume_percent(-1.0), 0.0);
    }

    #[tokio::test]
    async fn test_lazy_resource_spawns_nothing_until_play() {
        let driver = MpvDriver::new(None, Vec::new());
        let mut resource = MpvResource::new(driver);
        resource.set_preload(Preload::None).await.unwrap();
        resource.set_source("http://example.invalid/stream").await.unwrap();
        assert!(resource.handle.is_none());
        assert!(resource.is_paused());
        assert_eq!(resource.health(), ResourceHealth::Absent);
    }

    #[tokio::test]
    async fn test_play_without_source_is_refused() {
        let mut resource = MpvResource::new(MpvDriver::new(None, Vec::new()));
        assert!(matches!(resource.play().await, Err(ResourceError::NoSource)));
    }
}
