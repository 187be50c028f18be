//! TrackList: the Deep Calm playlist.
//!
//! The cursor is view state only; `Enter` or a click asks the core to switch
//! to the highlighted track.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, style_playing, style_selected, C_PRIMARY, C_STARTING},
    widgets::pane_chrome::pane_chrome,
};

pub struct TrackList {
    cursor: usize,
    /// First visible row, kept so the cursor stays on screen.
    offset: usize,
}

impl TrackList {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            offset: 0,
        }
    }

    /// Park the cursor on the playing track, e.g. after next/prev.
    pub fn follow(&mut self, index: usize) {
        self.cursor = index;
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }
}

impl Component for TrackList {
    fn id(&self) -> ComponentId {
        ComponentId::TrackList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let len = state.calm.tracks.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1, len),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1, len),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => self.cursor = len.saturating_sub(1),
            KeyCode::Enter if self.cursor < len => return vec![Action::SelectTrack(self.cursor)],
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let len = state.calm.tracks.len();
        match event.kind {
            MouseEventKind::ScrollUp => self.move_by(-1, len),
            MouseEventKind::ScrollDown => self.move_by(1, len),
            MouseEventKind::Down(MouseButton::Left) => {
                // rows start inside the border
                let top = area.y + 1;
                if event.row >= top && event.row < area.y + area.height.saturating_sub(1) {
                    let idx = self.offset + (event.row - top) as usize;
                    if idx < len {
                        self.cursor = idx;
                        return vec![Action::SelectTrack(idx)];
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        let len = state.calm.tracks.len();
        if len > 0 && self.cursor >= len {
            self.cursor = len - 1;
        }
        if let Action::SelectTrack(idx) = action {
            if *idx < len {
                self.cursor = *idx;
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("tracks", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = inner.height as usize;
        if rows == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        }

        let current = state.calm.playback.current_index;
        let width = inner.width as usize;
        let lines: Vec<Line> = state
            .calm
            .tracks
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(rows)
            .map(|(i, track)| {
                let marker = if i != current {
                    Span::raw("  ")
                } else if state.is_playing() {
                    Span::styled("▶ ", style_playing())
                } else if state.calm.starting {
                    Span::styled("… ", Style::default().fg(C_STARTING))
                } else {
                    Span::styled("· ", style_muted())
                };
                let head = format!("{} {}", track.icon, track.title);
                let head_w = UnicodeWidthStr::width(head.as_str()).min(width.saturating_sub(2));
                let head = truncate_to_width(&head, width.saturating_sub(2));
                let rest = width.saturating_sub(2 + head_w + 2);
                let sub = truncate_to_width(&track.subtitle, rest);

                let title_style = if i == current {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_PRIMARY)
                };
                let line = Line::from(vec![
                    marker,
                    Span::styled(head, title_style),
                    Span::raw("  "),
                    Span::styled(sub, style_muted()),
                ]);
                if i == self.cursor {
                    line.style(style_selected(focused))
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Cut `s` to at most `max` terminal columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
