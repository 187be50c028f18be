//! Playback, sleep-timer and mode logic for the calmspace player.
//!
//! Nothing in here touches a real audio device: the controller drives an
//! abstract [`resource::MediaResource`] and the mode selector an abstract
//! [`embed::EmbedHost`].  The terminal front end supplies mpv-backed versions
//! of both.

pub mod catalog;
pub mod config;
pub mod embed;
pub mod error;
pub mod mode;
pub mod platform;
pub mod playback;
pub mod protocol;
pub mod resource;
pub mod state;
pub mod timer;

pub use catalog::{Catalog, Track, TrackSource};
pub use embed::{EmbedHost, Scene};
pub use error::{CatalogError, EmbedError, PlaybackError, ResourceError, TimerError};
pub use mode::{Mode, ModeSelector, ModeTransition};
pub use playback::{Notice, PlaybackController, PlaybackState};
pub use resource::{MediaResource, Preload, ResourceEvent, SubscriptionId, Subscribers};
pub use timer::{SleepTimer, TickOutcome, TimerState};
