//! Native media resource abstraction.
//!
//! A `MediaResource` is the one exclusively-owned handle to the host's
//! playback capability.  It reports its own play/pause transitions through
//! `ResourceEvent`s delivered to subscribers, so callers never have to guess
//! whether a play request actually took effect.
//!
//! ```text
//!   PlaybackController ──commands──▶ MediaResource ──ResourceEvent──▶ subscribers
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ResourceError;
use crate::protocol::ResourceHealth;

/// Transitions fired by the resource itself, not by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceEvent {
    Started,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Preload {
    /// Do not touch the network until playback is requested.
    #[default]
    None,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[async_trait]
pub trait MediaResource: Send {
    async fn set_preload(&mut self, preload: Preload) -> Result<(), ResourceError>;

    /// Replace the source.  Takes effect on the next `load()` / `play()`.
    async fn set_source(&mut self, url: &str) -> Result<(), ResourceError>;

    /// Reset the resource to the start of the current source.
    async fn load(&mut self) -> Result<(), ResourceError>;

    /// Request playback.  The request may be refused by the host; success here
    /// only means the request was accepted, `ResourceEvent::Started` confirms it.
    async fn play(&mut self) -> Result<(), ResourceError>;

    async fn pause(&mut self);

    /// Drop the loaded source entirely (connection closed, buffers freed).
    async fn unload(&mut self);

    /// The resource's own view of whether it is paused.
    fn is_paused(&self) -> bool;

    /// Liveness of whatever backs the resource.  In-process resources are
    /// always up.
    fn health(&self) -> ResourceHealth {
        ResourceHealth::Running
    }

    async fn set_volume(&mut self, volume: f32);

    fn subscribe(&mut self, tx: mpsc::Sender<ResourceEvent>) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Give up the underlying handle.  No events may be delivered afterwards.
    async fn release(&mut self);
}

/// Subscriber registry shared by resource implementations.
#[derive(Debug, Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, mpsc::Sender<ResourceEvent>)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: mpsc::Sender<ResourceEvent>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, tx));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) {
        self.entries.retain(|(sid, _)| *sid != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver to every live subscriber; closed channels are pruned.
    pub fn notify(&mut self, event: ResourceEvent) {
        self.entries.retain(|(_, tx)| match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("resource subscriber queue full, dropping {:?}", event);
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_add_remove_notify() {
        let mut subs = Subscribers::new();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        let id1 = subs.add(tx1);
        let _id2 = subs.add(tx2);
        assert_eq!(subs.len(), 2);

        subs.notify(ResourceEvent::Started);
        assert_eq!(rx1.try_recv().unwrap(), ResourceEvent::Started);
        assert_eq!(rx2.try_recv().unwrap(), ResourceEvent::Started);

        subs.remove(id1);
        subs.notify(ResourceEvent::Stopped);
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), ResourceEvent::Stopped);
    }

    #[test]
    fn test_closed_subscribers_are_pruned() {
        let mut subs = Subscribers::new();
        let (tx, rx) = mpsc::channel(1);
        subs.add(tx);
        drop(rx);
        subs.notify(ResourceEvent::Stopped);
        assert!(subs.is_empty());
    }
}
