//! FocusRing: keyboard focus cycling between the panels of the active mode.

use calm_engine::Mode;

use crate::action::ComponentId;

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    /// The panels that exist in `mode`, in tab order.
    pub fn for_mode(mode: Mode) -> Vec<ComponentId> {
        match mode {
            Mode::Audio => vec![
                ComponentId::TrackList,
                ComponentId::Transport,
                ComponentId::TimerPanel,
            ],
            Mode::Embed => vec![ComponentId::EmbedPanel, ComponentId::TimerPanel],
        }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();
        self.current = (self.current + len - 1) % len;
        self.current()
    }

    pub fn set(&mut self, id: ComponentId) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }

    /// Swap the ring contents, keeping the focused panel if it survives.
    pub fn set_items(&mut self, items: Vec<ComponentId>) {
        let old = self.current();
        self.items = items;
        self.current = old
            .and_then(|id| self.items.iter().position(|&x| x == id))
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut ring = FocusRing::new(FocusRing::for_mode(Mode::Audio));
        assert_eq!(ring.current(), Some(ComponentId::TrackList));
        assert_eq!(ring.prev(), Some(ComponentId::TimerPanel));
        assert_eq!(ring.next(), Some(ComponentId::TrackList));
        assert_eq!(ring.next(), Some(ComponentId::Transport));
    }

    #[test]
    fn test_mode_change_keeps_shared_panel_focused() {
        let mut ring = FocusRing::new(FocusRing::for_mode(Mode::Audio));
        ring.set(ComponentId::TimerPanel);
        ring.set_items(FocusRing::for_mode(Mode::Embed));
        assert!(ring.is_focused(ComponentId::TimerPanel));

        ring.set(ComponentId::EmbedPanel);
        ring.set_items(FocusRing::for_mode(Mode::Audio));
        assert_eq!(ring.current(), Some(ComponentId::TrackList));
    }

    #[test]
    fn test_empty_ring() {
        let mut ring = FocusRing::new(Vec::new());
        assert_eq!(ring.next(), None);
        assert_eq!(ring.prev(), None);
        assert!(!ring.is_focused(ComponentId::TrackList));
    }
}
