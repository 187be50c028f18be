//! Bottom bars: last log line and the keybindings footer.

use calm_engine::Mode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_ACCENT, C_MUTED, C_PLAYING, C_SECONDARY, C_SEPARATOR};

pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, playing: bool) {
    let dot = if playing {
        Span::styled("●", Style::default().fg(C_PLAYING))
    } else {
        Span::styled("○", Style::default().fg(C_MUTED))
    };
    let line = Line::from(vec![
        dot,
        Span::raw(" "),
        Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Keys relevant to the current mode.
pub fn key_hints(mode: Mode) -> &'static str {
    match mode {
        Mode::Audio => {
            " 1/2 mode  Space play/pause  n/p track  s stop  ←→ vol (Shift fine)  t/T timer  x dismiss  Tab panes  K keys  ? help  q quit"
        }
        Mode::Embed => {
            " 1/2 mode  e open player  c close player  t/T timer  x dismiss  Tab panes  K keys  ? help  q quit"
        }
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: Mode) {
    let label = match mode {
        Mode::Audio => "AUDIO",
        Mode::Embed => "SCENE",
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(key_hints(mode), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
