//! EmbedPanel: the Water + Piano scene.  Opens and closes the external
//! player window; what happens inside it is up to the player.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, style_secondary, C_MUTED, C_PLAYING, C_PRIMARY},
    widgets::{
        button_row::{Button, ButtonRow},
        pane_chrome::{pane_chrome, Badge},
    },
};

pub struct EmbedPanel {
    buttons: ButtonRow,
}

impl EmbedPanel {
    pub fn new() -> Self {
        Self {
            buttons: ButtonRow::default(),
        }
    }
}

impl Component for EmbedPanel {
    fn id(&self) -> ComponentId {
        ComponentId::EmbedPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter if state.calm.embed_mounted => vec![Action::CloseEmbed],
            KeyCode::Enter => vec![Action::LaunchEmbed],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        self.buttons.hit(event.column, event.row).into_iter().collect()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let mounted = state.calm.embed_mounted;
        let badge = Badge {
            text: if mounted { "OPEN" } else { "CLOSED" },
            color: if mounted { C_PLAYING } else { C_MUTED },
        };
        let block = pane_chrome("scene", focused, Some(badge));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(scene) = state.calm.scene.as_ref() else {
            frame.render_widget(
                Paragraph::new(Span::styled(" no scene configured", style_muted())),
                inner,
            );
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title = vec![
            Line::from(vec![
                Span::raw(format!("{} ", scene.track.icon)),
                Span::styled(
                    scene.track.title.clone(),
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(scene.track.subtitle.clone(), style_secondary())),
        ];
        frame.render_widget(Paragraph::new(title), rows[0]);

        self.buttons.render(
            frame,
            rows[2],
            vec![
                Button::new("▶ Open player", mounted, Action::LaunchEmbed),
                Button::new("■ Close", false, Action::CloseEmbed),
            ],
        );

        frame.render_widget(
            Paragraph::new(Span::styled(scene.note.clone(), style_muted()))
                .wrap(Wrap { trim: true }),
            rows[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calm_engine::protocol::CalmState;
    use ratatui::crossterm::event::KeyModifiers;

    #[test]
    fn test_enter_opens_then_closes() {
        let mut state = AppState::new(CalmState::default(), 0.05);
        let mut panel = EmbedPanel::new();
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(panel.handle_key(enter, &state), vec![Action::LaunchEmbed]);
        state.calm.embed_mounted = true;
        assert_eq!(panel.handle_key(enter, &state), vec![Action::CloseEmbed]);
    }
}
