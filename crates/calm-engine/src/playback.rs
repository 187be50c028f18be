//! Playback controller: the only thing allowed to drive the media resource.
//!
//! `is_playing` follows the resource's own `Started`/`Stopped` events; a play
//! request that was accepted but not yet confirmed leaves it false.  Pausing is
//! the exception: it is treated as immediate so mode switches and timer expiry
//! can rely on `is_playing == false` right after the call.
//!
//! Every pause or source change bumps `generation`.  A `Started` event only
//! counts when it belongs to a play request issued in the current generation;
//! anything older is a late success and gets paused again.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Track};
use crate::config::ExpiryAction;
use crate::error::{PlaybackError, ResourceError};
use crate::resource::{MediaResource, Preload, ResourceEvent, SubscriptionId};

const EVENT_QUEUE: usize = 32;

pub const REJECTED_NOTICE: &str = "Playback was blocked. Press play again to retry.";
pub const UNAVAILABLE_NOTICE: &str = "The audio player could not be started. Is mpv installed?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            volume: 1.0,
        }
    }
}

/// A dismissable message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn rejected() -> Self {
        Self {
            message: REJECTED_NOTICE.to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            message: UNAVAILABLE_NOTICE.to_string(),
        }
    }
}

pub struct PlaybackController<R: MediaResource> {
    catalog: Catalog,
    resource: Option<R>,
    subscription: Option<SubscriptionId>,
    events: Option<mpsc::Receiver<ResourceEvent>>,
    state: PlaybackState,
    notice: Option<Notice>,
    generation: u64,
    /// Generation of the last accepted play request, if still outstanding.
    requested: Option<u64>,
    /// Set by `stop()`: the source must be re-applied before playing again.
    unloaded: bool,
}

impl<R: MediaResource> PlaybackController<R> {
    pub async fn initialize(catalog: Catalog, mut resource: R) -> Result<Self, PlaybackError> {
        resource.set_preload(Preload::None).await?;
        resource.set_source(catalog.first().url()).await?;

        let (tx, rx) = mpsc::channel(EVENT_QUEUE);
        let subscription = resource.subscribe(tx);
        info!(
            "playback: initialized with {} tracks, source '{}'",
            catalog.len(),
            catalog.first().title
        );

        Ok(Self {
            catalog,
            resource: Some(resource),
            subscription: Some(subscription),
            events: Some(rx),
            state: PlaybackState::default(),
            notice: None,
            generation: 0,
            requested: None,
            unloaded: false,
        })
    }

    // ── queries ──────────────────────────────────────────────────────────────

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Accepted play request still waiting for `Started`.
    pub fn is_starting(&self) -> bool {
        self.requested == Some(self.generation) && !self.state.is_playing
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_track(&self) -> &Track {
        // current_index is only ever set after validation against the catalog
        self.catalog
            .get(self.state.current_index)
            .unwrap_or_else(|| self.catalog.first())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.resource.is_none()
    }

    pub fn resource(&self) -> Option<&R> {
        self.resource.as_ref()
    }

    // ── commands ─────────────────────────────────────────────────────────────

    pub async fn play(&mut self) -> Result<(), PlaybackError> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::Released)?;

        if self.unloaded {
            let url = self
                .catalog
                .get(self.state.current_index)
                .map(|t| t.url().to_string())
                .unwrap_or_else(|| self.catalog.first().url().to_string());
            resource.set_source(&url).await?;
            resource.load().await?;
            self.unloaded = false;
        }

        let generation = self.generation;
        match resource.play().await {
            Ok(()) => {
                debug!("playback: play request accepted (gen {})", generation);
                self.requested = Some(generation);
                Ok(())
            }
            Err(e @ ResourceError::Unavailable(_)) => {
                warn!("playback: media resource unavailable: {}", e);
                self.requested = None;
                self.notice = Some(Notice::unavailable());
                Err(e.into())
            }
            Err(e) => {
                warn!("playback: play request rejected: {}", e);
                self.requested = None;
                self.notice = Some(Notice::rejected());
                Err(PlaybackError::Rejected(e.to_string()))
            }
        }
    }

    /// Never fails.  A no-op once the controller has been torn down.
    pub async fn pause(&mut self) {
        self.generation += 1;
        self.requested = None;
        self.state.is_playing = false;
        if let Some(resource) = self.resource.as_mut() {
            resource.pause().await;
        }
    }

    /// Decides from the resource's own paused flag, not from `is_playing`.
    pub async fn toggle(&mut self) -> Result<(), PlaybackError> {
        let paused = self
            .resource
            .as_ref()
            .ok_or(PlaybackError::Released)?
            .is_paused();
        if paused {
            self.play().await
        } else {
            self.pause().await;
            Ok(())
        }
    }

    pub async fn select_track(&mut self, index: usize) -> Result<(), PlaybackError> {
        if self.resource.is_none() {
            return Err(PlaybackError::Released);
        }
        let url = match self.catalog.get(index) {
            Some(track) => track.url().to_string(),
            None => {
                return Err(PlaybackError::IndexOutOfRange {
                    index,
                    len: self.catalog.len(),
                })
            }
        };

        self.pause().await;
        self.state.current_index = index;
        info!(
            "playback: selecting track {} '{}'",
            index,
            self.current_track().title
        );
        if let Some(resource) = self.resource.as_mut() {
            resource.set_source(&url).await?;
            resource.load().await?;
        }
        self.unloaded = false;
        self.play().await
    }

    pub async fn next(&mut self) -> Result<(), PlaybackError> {
        let len = self.catalog.len();
        let index = (self.state.current_index + 1) % len;
        self.select_track(index).await
    }

    pub async fn previous(&mut self) -> Result<(), PlaybackError> {
        let len = self.catalog.len();
        let index = (self.state.current_index + len - 1) % len;
        self.select_track(index).await
    }

    /// Clamps to `[0, 1]` and returns the applied level.  NaN leaves the
    /// volume unchanged.
    pub async fn set_volume(&mut self, level: f32) -> Result<f32, PlaybackError> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::Released)?;
        if level.is_nan() {
            return Ok(self.state.volume);
        }
        let volume = level.clamp(0.0, 1.0);
        self.state.volume = volume;
        resource.set_volume(volume).await;
        Ok(volume)
    }

    /// Full stop: pause and drop the source so the stream connection closes.
    pub async fn stop(&mut self) {
        self.pause().await;
        if let Some(resource) = self.resource.as_mut() {
            resource.unload().await;
            self.unloaded = true;
        }
    }

    /// Sleep timer ran out.
    pub async fn expire(&mut self, action: ExpiryAction) {
        info!("playback: sleep timer expired, {:?}", action);
        match action {
            ExpiryAction::Pause => self.pause().await,
            ExpiryAction::Stop => self.stop().await,
        }
    }

    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    // ── resource events ──────────────────────────────────────────────────────

    /// Wait for the next resource event.  Never resolves after teardown.
    pub async fn next_event(&mut self) -> ResourceEvent {
        if let Some(rx) = self.events.as_mut() {
            if let Some(event) = rx.recv().await {
                return event;
            }
        }
        std::future::pending().await
    }

    /// Apply every event already queued.  Returns how many were applied.
    pub async fn pump(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(rx) = self.events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }
        let n = pending.len();
        for event in pending {
            self.apply_event(event).await;
        }
        n
    }

    /// Returns true when the visible state changed.
    pub async fn apply_event(&mut self, event: ResourceEvent) -> bool {
        if self.resource.is_none() {
            return false;
        }
        match event {
            ResourceEvent::Started => {
                if self.requested == Some(self.generation) {
                    let changed = !self.state.is_playing;
                    self.state.is_playing = true;
                    changed
                } else {
                    debug!("playback: late start for a superseded request, pausing again");
                    if let Some(resource) = self.resource.as_mut() {
                        resource.pause().await;
                    }
                    false
                }
            }
            ResourceEvent::Stopped => {
                let changed = self.state.is_playing;
                self.state.is_playing = false;
                changed
            }
        }
    }

    // ── teardown ─────────────────────────────────────────────────────────────

    /// Pause, drop the event subscription and release the resource.
    /// Safe to call more than once.
    pub async fn teardown(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.pause().await;
            if let Some(id) = self.subscription.take() {
                resource.unsubscribe(id);
            }
            resource.release().await;
            info!("playback: resource released");
        }
        self.events = None;
        self.requested = None;
        self.state.is_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = PlaybackState::default();
        assert_eq!(state.current_index, 0);
        assert!(!state.is_playing);
        assert_eq!(state.volume, 1.0);
    }

    #[test]
    fn test_rejected_notice_text() {
        let notice = Notice::rejected();
        assert!(notice.message.contains("retry"));
        assert_eq!(notice, Notice::rejected());
        assert_ne!(Notice::unavailable(), notice);
    }
}
