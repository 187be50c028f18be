//! Transport: prev / play / pause / next / stop buttons and the volume gauge.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, FINE_VOLUME_STEP},
    component::Component,
    theme::{style_accent, style_muted, style_secondary},
    widgets::{
        button_row::{Button, ButtonRow},
        pane_chrome::pane_chrome,
    },
};

const NOTE: &str = "Streams are live radio. Give them a moment to start.";

pub struct Transport {
    buttons: ButtonRow,
    /// Where the gauge bar was drawn, for click-to-set.
    gauge: Rect,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            buttons: ButtonRow::default(),
            gauge: Rect::default(),
        }
    }

    fn gauge_hit(&self, col: u16, row: u16) -> Option<f32> {
        let g = self.gauge;
        if g.width < 2 || row != g.y || col < g.x || col >= g.x + g.width {
            return None;
        }
        let t = (col - g.x) as f32 / (g.width - 1) as f32;
        Some((t * 100.0).round() / 100.0)
    }
}

/// The volume delta a key asks for, if any.  Shift only refines the arrows;
/// `+` already needs Shift on most layouts.
pub fn volume_delta(key: &KeyEvent, coarse: f32) -> Option<f32> {
    let arrow = if key.modifiers.contains(KeyModifiers::SHIFT) {
        FINE_VOLUME_STEP
    } else {
        coarse
    };
    match key.code {
        KeyCode::Left => Some(-arrow),
        KeyCode::Right => Some(arrow),
        KeyCode::Char('-') => Some(-coarse),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(coarse),
        _ => None,
    }
}

fn gauge_line(volume: f32, width: u16) -> Line<'static> {
    let width = width as usize;
    let filled = ((volume.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    Line::from(vec![
        Span::styled("█".repeat(filled), style_accent()),
        Span::styled("░".repeat(width - filled), style_muted()),
    ])
}

impl Component for Transport {
    fn id(&self) -> ComponentId {
        ComponentId::Transport
    }

    // ←/→ never reach here: volume keys are global.
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter => vec![Action::TogglePause],
            KeyCode::Up | KeyCode::Char('k') => vec![Action::Prev],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::Next],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(action) = self.buttons.hit(event.column, event.row) {
                    return vec![action];
                }
                if let Some(level) = self.gauge_hit(event.column, event.row) {
                    return vec![Action::Volume(level)];
                }
                vec![]
            }
            MouseEventKind::ScrollUp => {
                vec![Action::Volume(state.nudged_volume(state.volume_step))]
            }
            MouseEventKind::ScrollDown => {
                vec![Action::Volume(state.nudged_volume(-state.volume_step))]
            }
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("controls", focused, None);
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
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let playing = state.is_playing();
        self.buttons.render(
            frame,
            rows[0],
            vec![
                Button::new("⏮", false, Action::Prev),
                Button::new("▶ Play", playing, Action::Play),
                Button::new("⏸ Pause", !playing, Action::Pause),
                Button::new("⏭", false, Action::Next),
                Button::new("■", false, Action::Stop),
            ],
        );

        // "vol " + gauge + " 100%"
        let label_w = 4u16;
        let pct_w = 5u16;
        let gauge_w = rows[1].width.saturating_sub(label_w + pct_w);
        self.gauge = Rect {
            x: rows[1].x + label_w,
            y: rows[1].y,
            width: gauge_w,
            height: 1,
        };
        let mut spans = vec![Span::styled("vol ", style_secondary())];
        spans.extend(gauge_line(state.volume(), gauge_w).spans);
        spans.push(Span::styled(
            format!(" {:>3.0}%", state.volume() * 100.0),
            style_accent(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(NOTE, style_muted()))),
            rows[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calm_engine::protocol::CalmState;

    #[test]
    fn test_shift_arrows_step_finely() {
        let coarse = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        let fine = KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(volume_delta(&coarse, 0.05), Some(0.05));
        assert_eq!(volume_delta(&fine, 0.05), Some(-FINE_VOLUME_STEP));
        let plus = KeyEvent::new(KeyCode::Char('+'), KeyModifiers::SHIFT);
        assert_eq!(volume_delta(&plus, 0.05), Some(0.05));
        let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(volume_delta(&other, 0.05), None);
    }

    #[test]
    fn test_gauge_click_maps_to_level() {
        let mut transport = Transport::new();
        transport.gauge = Rect::new(10, 3, 101, 1);
        assert_eq!(transport.gauge_hit(10, 3), Some(0.0));
        assert_eq!(transport.gauge_hit(60, 3), Some(0.5));
        assert_eq!(transport.gauge_hit(110, 3), Some(1.0));
        assert_eq!(transport.gauge_hit(60, 4), None);
        assert_eq!(transport.gauge_hit(9, 3), None);
    }

    #[test]
    fn test_gauge_fill() {
        let line = gauge_line(0.5, 10);
        assert_eq!(line.spans[0].content, "█████");
        assert_eq!(line.spans[1].content, "░░░░░");
        assert_eq!(gauge_line(1.0, 4).spans[1].content, "");
    }

    #[test]
    fn test_enter_toggles() {
        let state = AppState::new(CalmState::default(), 0.05);
        let mut transport = Transport::new();
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(transport.handle_key(enter, &state), vec![Action::TogglePause]);
    }
}
