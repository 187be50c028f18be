//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this but never mutate it.  The App event loop is the only
//! writer.

use calm_engine::protocol::CalmState;
use calm_engine::{Mode, Track};

pub struct AppState {
    /// Latest snapshot published by the core.
    pub calm: CalmState,
    /// Coarse volume step for ←/→; Shift uses `FINE_VOLUME_STEP`.
    pub volume_step: f32,
    /// WARN/ERROR lines forwarded from the log layer, newest last.
    pub logs: Vec<String>,
    pub show_keys: bool,
}

pub const FINE_VOLUME_STEP: f32 = 0.01;
const MAX_LOGS: usize = 200;

impl AppState {
    pub fn new(calm: CalmState, volume_step: f32) -> Self {
        Self {
            calm,
            volume_step,
            logs: Vec::new(),
            show_keys: true,
        }
    }

    pub fn mode(&self) -> Mode {
        self.calm.mode
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.calm.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.calm.playback.is_playing
    }

    pub fn volume(&self) -> f32 {
        self.calm.playback.volume
    }

    /// Volume after nudging by `delta`, clamped and rounded to whole percent.
    pub fn nudged_volume(&self, delta: f32) -> f32 {
        ((self.volume() + delta).clamp(0.0, 1.0) * 100.0).round() / 100.0
    }

    pub fn push_log(&mut self, line: String) {
        self.logs.push(line);
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nudged_volume_clamps_and_rounds() {
        let mut state = AppState::new(CalmState::default(), 0.05);
        state.calm.playback.volume = 0.98;
        assert_eq!(state.nudged_volume(0.05), 1.0);
        state.calm.playback.volume = 0.5;
        assert_eq!(state.nudged_volume(-FINE_VOLUME_STEP), 0.49);
        state.calm.playback.volume = 0.02;
        assert_eq!(state.nudged_volume(-0.05), 0.0);
    }

    #[test]
    fn test_log_buffer_is_bounded() {
        let mut state = AppState::new(CalmState::default(), 0.05);
        for i in 0..(MAX_LOGS + 10) {
            state.push_log(format!("line {}", i));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.last_log(), Some(format!("line {}", MAX_LOGS + 9).as_str()));
    }
}
