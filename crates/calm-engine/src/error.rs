//! Error types for the engine crate.
//!
//! Only play failures are shown to the user, as a notice: `Rejected` asks for
//! a retry, an unavailable resource says so.  Everything else is logged and
//! otherwise degrades to "nothing audible".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,
    #[error("duplicate track key '{0}'")]
    DuplicateKey(String),
    #[error("track '{0}' is an embed and cannot be part of the audio playlist")]
    EmbedInPlaylist(String),
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures reported by a native media resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The host refused to start playback (the autoplay-rejection analogue).
    #[error("play request rejected: {0}")]
    PlayRejected(String),
    #[error("no source set")]
    NoSource,
    #[error("media resource unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("playback was blocked: {0}")]
    Rejected(String),
    #[error("track index {index} out of range (catalog has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("playback controller has been torn down")]
    Released,
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("sleep timer duration must be at least one minute")]
    ZeroDuration,
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embed player binary not found")]
    BinaryNotFound,
    #[error("failed to launch embed player: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("embeds can only be launched from the embed mode")]
    WrongMode,
}
