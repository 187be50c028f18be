//! Track catalog: the fixed, ordered list of things the player can play.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::CatalogError;

/// Where a track's audio comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum TrackSource {
    /// Direct stream played by the native media resource.
    Stream(String),
    /// Third-party page handed to an external player we do not control.
    Embed(String),
}

impl TrackSource {
    pub fn url(&self) -> &str {
        match self {
            Self::Stream(url) | Self::Embed(url) => url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub icon: String,
    pub source: TrackSource,
}

impl Track {
    pub fn stream(
        key: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            icon: icon.into(),
            source: TrackSource::Stream(url.into()),
        }
    }

    pub fn url(&self) -> &str {
        self.source.url()
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.source, TrackSource::Stream(_))
    }
}

/// Ordered, immutable, non-empty list of stream tracks with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for track in &tracks {
            if !track.is_stream() {
                return Err(CatalogError::EmbedInPlaylist(track.key.clone()));
            }
            if !seen.insert(track.key.as_str()) {
                return Err(CatalogError::DuplicateKey(track.key.clone()));
            }
        }
        Ok(Self { tracks })
    }

    /// The built-in playlist used when no catalog file is configured.
    pub fn defaults() -> Self {
        Self {
            tracks: vec![
                Track::stream(
                    "drone-zone",
                    "Drone Zone",
                    "Deep ambient · very calm",
                    "🌌",
                    "https://ice5.somafm.com/dronezone-128-mp3",
                ),
                Track::stream(
                    "fluid",
                    "Fluid",
                    "Soft water + ambient",
                    "💧",
                    "https://ice5.somafm.com/fluid-128-mp3",
                ),
                Track::stream(
                    "deep-space-one",
                    "Deep Space One",
                    "Spacey drones · no beats",
                    "🪐",
                    "https://ice5.somafm.com/deepspaceone-128-mp3",
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false for a constructed catalog; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn first(&self) -> &Track {
        &self.tracks[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.key == key)
    }
}

// ── TOML loader ───────────────────────────────────────────────────────────────

/// Matches the `[[track]]` tables of a catalog file.  Kept apart from `Track`
/// so the file schema can stay flat (`url = ...`) while `Track` carries a
/// typed source.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    track: Vec<TomlTrack>,
}

#[derive(Debug, Deserialize)]
struct TomlTrack {
    #[serde(default)]
    key: String,
    title: String,
    url: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    icon: String,
}

pub fn parse_toml_str(content: &str) -> Result<Catalog, CatalogError> {
    let file: TomlCatalogFile = toml::from_str(content)?;
    let tracks = file
        .track
        .into_iter()
        .map(|t| {
            let key = if t.key.is_empty() {
                slugify(&t.title)
            } else {
                t.key
            };
            Track::stream(key, t.title, t.subtitle, t.icon, t.url)
        })
        .collect();
    Catalog::new(tracks)
}

pub fn load_toml(path: &Path) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_toml_str(&content)
}

// ── M3U loader ────────────────────────────────────────────────────────────────

pub fn parse_m3u_str(content: &str) -> Result<Catalog, CatalogError> {
    let mut tracks = Vec::new();
    let mut pending_title: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("#EXTINF:") {
            if let Some(comma_idx) = rest.find(',') {
                pending_title = Some(rest[comma_idx + 1..].trim().to_string());
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let url = line.to_string();
        let title = pending_title.take().unwrap_or_else(|| url.clone());
        let mut key = slugify(&title);
        // m3u lists often repeat a title for mirror URLs
        let mut n = 2;
        while tracks.iter().any(|t: &Track| t.key == key) {
            key = format!("{}-{}", slugify(&title), n);
            n += 1;
        }
        tracks.push(Track::stream(key, title, String::new(), "♪", url));
    }

    Catalog::new(tracks)
}

pub fn load_m3u(path: &Path) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_m3u_str(&content)
}

/// Lowercase ASCII slug: runs of anything non-alphanumeric become one '-'.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        "track".to_string()
    } else {
        out
    }
}
