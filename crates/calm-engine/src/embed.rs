//! Embed host: the opaque third-party player behind the scene mode.
//!
//! The core never sees whether an embed is making sound.  The only control it
//! has is mounting and unmounting; unmounting must tear the player down
//! completely, hiding it is not enough.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{Track, TrackSource};
use crate::error::EmbedError;

/// The content shown in the embed mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub track: Track,
    /// Hint shown under the scene ("press play inside the player").
    pub note: String,
}

impl Scene {
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
        url: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            track: Track {
                key: crate::catalog::slugify(&title),
                title,
                subtitle: subtitle.into(),
                icon: icon.into(),
                source: TrackSource::Embed(url.into()),
            },
            note: note.into(),
        }
    }

    pub fn url(&self) -> &str {
        self.track.url()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(
            "Water + Piano",
            "Soft water sounds + slow piano",
            "🎋",
            "https://www.youtube.com/watch?v=b8BfcX7RHxY",
            "Press play inside the player window. This mode is for calm, not for watching.",
        )
    }
}

#[async_trait]
pub trait EmbedHost: Send {
    /// Bring the embed up.  Replaces any existing mount.
    async fn mount(&mut self, scene: &Scene) -> Result<(), EmbedError>;

    /// Tear the embed down entirely.  No-op when nothing is mounted.
    async fn unmount(&mut self);

    fn is_mounted(&mut self) -> bool;
}
