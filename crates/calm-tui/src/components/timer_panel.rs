//! TimerPanel: sleep timer presets, Off, remaining time and end time.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_accent, style_muted, style_secondary, C_PLAYING},
    widgets::{
        button_row::{Button, ButtonRow},
        pane_chrome::{pane_chrome, Badge},
    },
};

pub struct TimerPanel {
    buttons: ButtonRow,
    /// Keyboard cursor over presets followed by `Off`.
    cursor: usize,
}

/// What `t` does: start the preset after the running one, or turn the timer
/// off after the longest preset.
pub fn next_preset_action(state: &AppState) -> Action {
    let presets = &state.calm.timer_presets;
    let running = state
        .calm
        .timer
        .is_running()
        .then_some(state.calm.timer.total_seconds);
    let next = match running {
        None => presets.first(),
        Some(total) => presets
            .iter()
            .position(|&m| m * 60 == total)
            .and_then(|i| presets.get(i + 1)),
    };
    match next {
        Some(&minutes) => Action::StartTimer(minutes),
        None => Action::ClearTimer,
    }
}

impl TimerPanel {
    pub fn new() -> Self {
        Self {
            buttons: ButtonRow::default(),
            cursor: 0,
        }
    }

    fn choices(state: &AppState) -> Vec<Action> {
        let mut out: Vec<Action> = state
            .calm
            .timer_presets
            .iter()
            .map(|&m| Action::StartTimer(m))
            .collect();
        out.push(Action::ClearTimer);
        out
    }
}

impl Component for TimerPanel {
    fn id(&self) -> ComponentId {
        ComponentId::TimerPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let choices = Self::choices(state);
        let last = choices.len().saturating_sub(1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.cursor = (self.cursor + 1).min(last),
            KeyCode::Enter => {
                return choices.get(self.cursor).cloned().into_iter().collect();
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        self.buttons.hit(event.column, event.row).into_iter().collect()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let timer = state.calm.timer;
        let remaining = timer.display();
        let badge = timer.is_running().then(|| Badge {
            text: remaining.as_str(),
            color: C_PLAYING,
        });
        let block = pane_chrome("sleep timer", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let running_total = timer.is_running().then_some(timer.total_seconds);
        let buttons = Self::choices(state)
            .into_iter()
            .enumerate()
            .map(|(i, action)| {
                let (label, active) = match action {
                    Action::StartTimer(m) => (format!("{}m", m), running_total == Some(m * 60)),
                    _ => ("Off".to_string(), !timer.is_running()),
                };
                let label = if focused && i == self.cursor {
                    format!("›{}", label)
                } else {
                    label
                };
                Button::new(label, active, action)
            })
            .collect();
        self.buttons.render(frame, rows[0], buttons);

        let status = match state.calm.timer_ends_at {
            Some(ends) if timer.is_running() => Line::from(vec![
                Span::styled("remaining ", style_secondary()),
                Span::styled(remaining.clone(), style_accent().add_modifier(Modifier::BOLD)),
                Span::styled(format!("  ends {}", ends.format("%H:%M")), style_muted()),
            ]),
            _ if timer.is_running() => Line::from(vec![
                Span::styled("remaining ", style_secondary()),
                Span::styled(remaining.clone(), style_accent()),
            ]),
            _ => Line::from(Span::styled(
                "Off. Playback continues until you pause it.",
                style_muted(),
            )),
        };
        frame.render_widget(Paragraph::new(status), rows[1]);
    }
}
