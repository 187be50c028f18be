use crate::protocol::CalmState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared snapshot of the core's state.  The core loop is the only writer;
/// the UI reads a clone after every `StateUpdated` broadcast.
pub struct StateManager {
    state: Arc<RwLock<CalmState>>,
}

impl StateManager {
    pub fn new(initial: CalmState) -> Self {
        Self {
            state: Arc::new(RwLock::new(CalmState { rev: 1, ..initial })),
        }
    }

    pub async fn get_state(&self) -> CalmState {
        self.state.read().await.clone()
    }

    /// Replace everything except the revision counter, which is bumped.
    pub async fn publish(&self, snapshot: CalmState) {
        let mut state = self.state.write().await;
        let rev = state.rev + 1;
        *state = CalmState { rev, ..snapshot };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    #[tokio::test]
    async fn test_publish_bumps_rev() {
        let manager = StateManager::new(CalmState {
            mode: Mode::Audio,
            ..Default::default()
        });
        let state = manager.get_state().await;
        assert_eq!(state.rev, 1);
        assert_eq!(state.mode, Mode::Audio);

        manager
            .publish(CalmState {
                rev: 99,
                embed_mounted: true,
                ..Default::default()
            })
            .await;
        let state = manager.get_state().await;
        assert_eq!(state.rev, 2);
        assert!(state.embed_mounted);
        assert_eq!(state.mode, Mode::Embed);
    }
}
