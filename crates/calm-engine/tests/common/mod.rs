//! Scripted stand-ins for the native media resource and the embed host.
//!
//! Both hand out a cloneable probe so a test can inspect (and poke) the fake
//! after it has been moved into the controller.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calm_engine::{
    Catalog, EmbedError, EmbedHost, MediaResource, PlaybackController, Preload, ResourceError,
    ResourceEvent, Scene, Subscribers, SubscriptionId, Track,
};
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct FakeLog {
    pub preload: Option<Preload>,
    pub source: Option<String>,
    pub paused: bool,
    pub position_secs: f64,
    pub volume: f32,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub load_calls: usize,
    pub unload_calls: usize,
    pub released: bool,
    /// Reject this many upcoming play requests.
    pub reject_plays: usize,
    /// When set, accepted plays do not emit `Started` by themselves.
    pub hold_started: bool,
    /// Every play fails as if the player binary were missing.
    pub unavailable: bool,
}

impl Default for FakeLog {
    fn default() -> Self {
        Self {
            preload: None,
            source: None,
            paused: true,
            position_secs: 0.0,
            volume: 1.0,
            play_calls: 0,
            pause_calls: 0,
            load_calls: 0,
            unload_calls: 0,
            released: false,
            reject_plays: 0,
            hold_started: false,
            unavailable: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeProbe {
    log: Arc<Mutex<FakeLog>>,
    subs: Arc<Mutex<Subscribers>>,
}

impl FakeProbe {
    pub fn with<T>(&self, f: impl FnOnce(&mut FakeLog) -> T) -> T {
        let mut log = self.log.lock().unwrap();
        f(&mut log)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subs.lock().unwrap().len()
    }

    /// Fire an event as if the resource did it on its own.
    pub fn emit(&self, event: ResourceEvent) {
        if event == ResourceEvent::Started {
            self.with(|l| l.paused = false);
        }
        self.subs.lock().unwrap().notify(event);
    }

    /// Pretend some audio has played.
    pub fn advance(&self, secs: f64) {
        self.with(|l| {
            if !l.paused {
                l.position_secs += secs;
            }
        });
    }
}

pub struct FakeResource {
    probe: FakeProbe,
}

impl FakeResource {
    pub fn new() -> (Self, FakeProbe) {
        let probe = FakeProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

#[async_trait]
impl MediaResource for FakeResource {
    async fn set_preload(&mut self, preload: Preload) -> Result<(), ResourceError> {
        self.probe.with(|l| l.preload = Some(preload));
        Ok(())
    }

    async fn set_source(&mut self, url: &str) -> Result<(), ResourceError> {
        self.probe.with(|l| l.source = Some(url.to_string()));
        Ok(())
    }

    async fn load(&mut self) -> Result<(), ResourceError> {
        self.probe.with(|l| {
            l.load_calls += 1;
            l.position_secs = 0.0;
        });
        Ok(())
    }

    async fn play(&mut self) -> Result<(), ResourceError> {
        let (rejected, hold) = self.probe.with(|l| {
            l.play_calls += 1;
            if l.source.is_none() {
                return (Some(ResourceError::NoSource), false);
            }
            if l.unavailable {
                return (
                    Some(ResourceError::Unavailable("mpv: not found".into())),
                    false,
                );
            }
            if l.reject_plays > 0 {
                l.reject_plays -= 1;
                return (
                    Some(ResourceError::PlayRejected("not allowed".into())),
                    false,
                );
            }
            (None, l.hold_started)
        });
        if let Some(err) = rejected {
            return Err(err);
        }
        if !hold {
            self.probe.emit(ResourceEvent::Started);
        }
        Ok(())
    }

    async fn pause(&mut self) {
        let was_playing = self.probe.with(|l| {
            l.pause_calls += 1;
            let was = !l.paused;
            l.paused = true;
            was
        });
        if was_playing {
            self.probe.subs.lock().unwrap().notify(ResourceEvent::Stopped);
        }
    }

    async fn unload(&mut self) {
        self.probe.with(|l| {
            l.unload_calls += 1;
            l.source = None;
            l.position_secs = 0.0;
        });
    }

    fn is_paused(&self) -> bool {
        self.probe.with(|l| l.paused)
    }

    async fn set_volume(&mut self, volume: f32) {
        self.probe.with(|l| l.volume = volume);
    }

    fn subscribe(&mut self, tx: mpsc::Sender<ResourceEvent>) -> SubscriptionId {
        self.probe.subs.lock().unwrap().add(tx)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.probe.subs.lock().unwrap().remove(id);
    }

    async fn release(&mut self) {
        self.probe.with(|l| l.released = true);
    }
}

#[derive(Debug, Default)]
pub struct FakeEmbed {
    pub mounted: Option<String>,
    pub mounts: usize,
    pub unmounts: usize,
}

#[async_trait]
impl EmbedHost for FakeEmbed {
    async fn mount(&mut self, scene: &Scene) -> Result<(), EmbedError> {
        self.mounts += 1;
        self.mounted = Some(scene.url().to_string());
        Ok(())
    }

    async fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            self.unmounts += 1;
        }
    }

    fn is_mounted(&mut self) -> bool {
        self.mounted.is_some()
    }
}

pub fn abc_catalog() -> Catalog {
    Catalog::new(vec![
        Track::stream("a", "A", "first", "1", "http://stream/a"),
        Track::stream("b", "B", "second", "2", "http://stream/b"),
        Track::stream("c", "C", "third", "3", "http://stream/c"),
    ])
    .unwrap()
}

pub async fn controller_with(catalog: Catalog) -> (PlaybackController<FakeResource>, FakeProbe) {
    let (resource, probe) = FakeResource::new();
    let controller = PlaybackController::initialize(catalog, resource)
        .await
        .unwrap();
    (controller, probe)
}
