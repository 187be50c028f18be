//! Mode selector: which content panel is visible.
//!
//! The two panels must never produce overlapping sound.  Entering the embed
//! mode pauses native playback; leaving it unmounts the embed.  Entering the
//! audio mode never starts playback on its own.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embed::{EmbedHost, Scene};
use crate::error::EmbedError;
use crate::playback::PlaybackController;
use crate::resource::MediaResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Embedded video scene ("Water + Piano").
    #[default]
    Embed,
    /// Native audio streams ("Deep Calm").
    Audio,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Embed, Mode::Audio];

    pub fn label(self) -> &'static str {
        match self {
            Self::Embed => "🎋 Water + Piano",
            Self::Audio => "🌌 Deep Calm",
        }
    }

    pub fn produces_native_audio(self) -> bool {
        matches!(self, Self::Audio)
    }

    pub fn next(self) -> Self {
        match self {
            Self::Embed => Self::Audio,
            Self::Audio => Self::Embed,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "embed" | "scene" | "water-piano" => Ok(Self::Embed),
            "audio" | "deep-calm" | "streams" => Ok(Self::Audio),
            other => Err(format!("unknown mode '{}' (expected embed or audio)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: Mode,
    pub to: Mode,
    pub paused_playback: bool,
    pub unmounted_embed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    current: Mode,
}

impl ModeSelector {
    pub fn new(initial: Mode) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Returns `None` when `to` is already active.
    pub async fn switch_to<R, E>(
        &mut self,
        to: Mode,
        playback: &mut PlaybackController<R>,
        embed: &mut E,
    ) -> Option<ModeTransition>
    where
        R: MediaResource,
        E: EmbedHost + ?Sized,
    {
        let from = self.current;
        if from == to {
            return None;
        }

        let mut transition = ModeTransition {
            from,
            to,
            paused_playback: false,
            unmounted_embed: false,
        };

        if !to.produces_native_audio() {
            transition.paused_playback = playback.is_playing();
            playback.pause().await;
        }
        if from == Mode::Embed {
            transition.unmounted_embed = embed.is_mounted();
            embed.unmount().await;
        }

        self.current = to;
        info!("mode: {:?} → {:?}", from, to);
        Some(transition)
    }

    /// Start the scene's external player.  Only valid in the embed mode.
    pub async fn launch_embed<E>(&self, embed: &mut E, scene: &Scene) -> Result<(), EmbedError>
    where
        E: EmbedHost + ?Sized,
    {
        if self.current != Mode::Embed {
            return Err(EmbedError::WrongMode);
        }
        embed.mount(scene).await
    }
}
