use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::catalog::Track;
use crate::embed::Scene;
use crate::mode::Mode;
use crate::playback::{Notice, PlaybackState};
use crate::timer::TimerState;

/// Messages sent from the UI to the core loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    SwitchMode { mode: Mode },
    Play,
    Pause,
    TogglePause,
    Stop,
    Next,
    Prev,
    SelectTrack { index: usize },
    Volume { value: f32 },
    StartTimer { minutes: u32 },
    ClearTimer,
    LaunchEmbed,
    CloseEmbed,
    DismissNotice,
}

/// Health of the native media engine as observed by the core.
///
/// Transitions:
///   Absent -> Starting -> Running -> Dead -> Starting ...
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum ResourceHealth {
    /// Nothing spawned yet (preload is off, so this lasts until the first play).
    #[default]
    Absent,
    Starting,
    Running,
    Dead,
}

impl ResourceHealth {
    /// Short label for badges (≤5 chars).
    pub fn badge_label(&self) -> Option<&str> {
        match self {
            ResourceHealth::Absent | ResourceHealth::Running => None,
            ResourceHealth::Starting => Some("INIT"),
            ResourceHealth::Dead => Some("DEAD"),
        }
    }
}

/// Full snapshot published by the core.  `rev` is bumped on every change so
/// readers can skip redundant redraws.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalmState {
    #[serde(default)]
    pub rev: u64,
    pub tracks: Vec<Track>,
    pub scene: Option<Scene>,
    pub mode: Mode,
    pub playback: PlaybackState,
    /// A play request was accepted but the resource has not confirmed it yet.
    #[serde(default)]
    pub starting: bool,
    pub timer: TimerState,
    pub timer_ends_at: Option<DateTime<Local>>,
    pub timer_presets: Vec<u32>,
    pub notice: Option<Notice>,
    pub embed_mounted: bool,
    #[serde(default)]
    pub health: ResourceHealth,
}

impl CalmState {
    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.playback.current_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_shape() {
        let encoded = toml::to_string(&Command::SelectTrack { index: 2 }).unwrap();
        assert!(encoded.contains("cmd = \"SelectTrack\""));
        assert!(encoded.contains("index = 2"));
    }

    #[test]
    fn test_health_badges() {
        assert_eq!(ResourceHealth::Running.badge_label(), None);
        assert_eq!(ResourceHealth::Dead.badge_label(), Some("DEAD"));
    }

    #[test]
    fn test_current_track_lookup() {
        let state = CalmState {
            tracks: crate::catalog::Catalog::defaults().tracks().to_vec(),
            ..Default::default()
        };
        assert_eq!(state.current_track().unwrap().key, "drone-zone");
    }
}
