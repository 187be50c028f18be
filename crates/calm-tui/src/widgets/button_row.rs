//! A row of clickable pill buttons that remembers where each one landed.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Action;
use crate::theme::style_button;

pub struct Button {
    pub label: String,
    pub active: bool,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, active: bool, action: Action) -> Self {
        Self {
            label: label.into(),
            active,
            action,
        }
    }
}

#[derive(Default)]
pub struct ButtonRow {
    hits: Vec<(Rect, Action)>,
}

impl ButtonRow {
    /// Draw `buttons` left to right on the first line of `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, buttons: Vec<Button>) {
        self.hits.clear();
        if area.height == 0 {
            return;
        }
        let mut spans = Vec::with_capacity(buttons.len() * 2);
        let mut x = area.x;
        let right = area.x + area.width;
        for button in buttons {
            let text = format!(" {} ", button.label);
            let w = unicode_width::UnicodeWidthStr::width(text.as_str()) as u16;
            if x + w > right {
                break;
            }
            self.hits.push((
                Rect {
                    x,
                    y: area.y,
                    width: w,
                    height: 1,
                },
                button.action,
            ));
            spans.push(Span::styled(text, style_button(button.active)));
            spans.push(Span::raw(" "));
            x += w + 1;
        }
        let line_area = Rect { height: 1, ..area };
        frame.render_widget(Paragraph::new(Line::from(spans)), line_area);
    }

    pub fn hit(&self, col: u16, row: u16) -> Option<Action> {
        self.hits
            .iter()
            .find(|(r, _)| col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height)
            .map(|(_, a)| a.clone())
    }
}
