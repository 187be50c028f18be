use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::embed::Scene;
use super::mode::Mode;
use super::platform;
use super::timer::DEFAULT_PRESETS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Panel shown on startup.
    #[serde(default)]
    pub default_mode: Mode,
}

/// What the sleep timer does when it runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryAction {
    /// Pause the stream; pressing play resumes it.
    #[default]
    Pause,
    /// Pause and drop the stream connection.
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    /// Coarse volume step for the arrow keys.  Shift moves by 0.01.
    #[serde(default = "default_volume_step")]
    pub volume_step: f32,
    #[serde(default)]
    pub expiry_action: ExpiryAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_presets")]
    pub presets_minutes: Vec<u32>,
}

/// Playlist source.  A TOML file wins over an m3u file; with neither present
/// the built-in list is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Defaults to `$XDG_CONFIG_HOME/calmspace/catalog.toml`.
    #[serde(default = "default_tracks_file")]
    pub tracks_file: PathBuf,
    #[serde(default)]
    pub m3u_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_scene_title")]
    pub title: String,
    #[serde(default = "default_scene_subtitle")]
    pub subtitle: String,
    #[serde(default = "default_scene_icon")]
    pub icon: String,
    #[serde(default = "default_scene_url")]
    pub url: String,
    #[serde(default = "default_scene_note")]
    pub note: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MpvConfig {
    /// Explicit mpv path; otherwise `MPV_PATH`, beside the exe, then PATH.
    #[serde(default)]
    pub binary: Option<PathBuf>,
    /// Extra arguments for the audio (IPC-controlled) mpv instance.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Extra arguments for the scene player window.
    #[serde(default)]
    pub embed_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            volume_step: default_volume_step(),
            expiry_action: ExpiryAction::default(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            presets_minutes: default_presets(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            tracks_file: default_tracks_file(),
            m3u_file: None,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: default_scene_title(),
            subtitle: default_scene_subtitle(),
            icon: default_scene_icon(),
            url: default_scene_url(),
            note: default_scene_note(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl SceneConfig {
    pub fn to_scene(&self) -> Scene {
        Scene::new(
            self.title.clone(),
            self.subtitle.clone(),
            self.icon.clone(),
            self.url.clone(),
            self.note.clone(),
        )
    }
}

fn default_volume() -> f32 {
    0.5
}

fn default_volume_step() -> f32 {
    0.05
}

fn default_presets() -> Vec<u32> {
    DEFAULT_PRESETS.to_vec()
}

fn default_tracks_file() -> PathBuf {
    platform::config_dir().join("catalog.toml")
}

fn default_scene_title() -> String {
    Scene::default().track.title
}

fn default_scene_subtitle() -> String {
    Scene::default().track.subtitle
}

fn default_scene_icon() -> String {
    Scene::default().track.icon
}

fn default_scene_url() -> String {
    Scene::default().url().to_string()
}

fn default_scene_note() -> String {
    Scene::default().note
}

fn default_log_filter() -> String {
    "info,calm_tui=debug,calm_engine=debug".to_string()
}

impl Config {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
