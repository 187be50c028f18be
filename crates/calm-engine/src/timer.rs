//! Sleep timer: a one-shot countdown that stops playback when it runs out.
//!
//! ```text
//!   Idle ──start(m)──▶ Running ──tick──▶ Running
//!                        │  └──tick (would hit 0)──▶ Idle  [Expired]
//!                        └──clear──▶ Idle
//! ```
//!
//! The timer itself only counts; the owner drives `tick()` once per second
//! and performs the stop when `tick()` reports `Expired`.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const DEFAULT_PRESETS: [u32; 3] = [15, 30, 60];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    pub total_seconds: u32,
    /// `None` while idle.
    pub seconds_remaining: Option<u32>,
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        self.seconds_remaining.is_some()
    }

    /// `m:ss`, or `Off` when idle.
    pub fn display(&self) -> String {
        match self.seconds_remaining {
            Some(secs) => format_remaining(secs),
            None => "Off".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running(u32),
    Expired,
}

#[derive(Debug, Clone)]
pub struct SleepTimer {
    state: TimerState,
    presets: Vec<u32>,
}

impl SleepTimer {
    pub fn new(presets: Vec<u32>) -> Self {
        let mut presets: Vec<u32> = presets.into_iter().filter(|m| *m > 0).collect();
        presets.sort_unstable();
        presets.dedup();
        if presets.is_empty() {
            presets = DEFAULT_PRESETS.to_vec();
        }
        Self {
            state: TimerState::default(),
            presets,
        }
    }

    pub fn presets(&self) -> &[u32] {
        &self.presets
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        self.state.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn display(&self) -> String {
        self.state.display()
    }

    /// Restarts from scratch if a countdown is already running.
    pub fn start(&mut self, minutes: u32) -> Result<(), TimerError> {
        if minutes == 0 {
            return Err(TimerError::ZeroDuration);
        }
        let total = minutes.saturating_mul(60);
        self.state = TimerState {
            total_seconds: total,
            seconds_remaining: Some(total),
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.state = TimerState::default();
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.state.seconds_remaining {
            None => TickOutcome::Idle,
            Some(secs) if secs <= 1 => {
                self.clear();
                TickOutcome::Expired
            }
            Some(secs) => {
                let left = secs - 1;
                self.state.seconds_remaining = Some(left);
                TickOutcome::Running(left)
            }
        }
    }

    /// Wall-clock time at which the countdown runs out, if running.
    pub fn ends_at(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        self.state
            .seconds_remaining
            .map(|secs| now + Duration::seconds(i64::from(secs)))
    }
}

impl Default for SleepTimer {
    fn default() -> Self {
        Self::new(DEFAULT_PRESETS.to_vec())
    }
}

pub fn format_remaining(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
