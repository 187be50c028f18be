//! Mode bar: one clickable button per mode.  Not focusable; keys 1/2 and `m`
//! are handled globally.

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, Frame};

use calm_engine::Mode;

use crate::{
    action::Action,
    app_state::AppState,
    widgets::button_row::{Button, ButtonRow},
};

#[derive(Default)]
pub struct ModeBar {
    buttons: ButtonRow,
}

impl ModeBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_mouse(&self, event: MouseEvent) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        self.buttons
            .hit(event.column, event.row)
            .into_iter()
            .collect()
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let inner = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(1),
            ..area
        };
        let buttons = Mode::ALL
            .iter()
            .enumerate()
            .map(|(i, &mode)| {
                Button::new(
                    format!("{} {}", i + 1, mode.label()),
                    state.mode() == mode,
                    Action::SwitchMode(mode),
                )
            })
            .collect();
        self.buttons.render(frame, inner, buttons);
    }
}
