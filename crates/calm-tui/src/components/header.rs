//! Header: 3-row top bar.
//!
//! Row 1: app title and tagline, health badge.
//! Row 2: now playing (track or scene) with its subtitle.
//! Row 3: playback state, volume, sleep timer and its end time.
//!
//! Not focusable.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use calm_engine::{protocol::ResourceHealth, Mode};

use crate::{
    app_state::AppState,
    theme::{
        style_accent, style_muted, style_secondary, C_ACCENT, C_BADGE_ERR, C_BADGE_PENDING,
        C_MUTED, C_PLAYING, C_PRIMARY, C_STARTING,
    },
};

const TAGLINE: &str = "slow down, let the sound carry you";

pub fn draw_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut title = vec![
        Span::styled(
            " 🌿 CalmSpace",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", TAGLINE), style_muted()),
    ];
    if let Some(badge) = state.calm.health.badge_label() {
        let color = match state.calm.health {
            ResourceHealth::Dead => C_BADGE_ERR,
            _ => C_BADGE_PENDING,
        };
        title.push(Span::styled(
            format!("  mpv {}", badge),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(title),
        now_playing_line(state),
        status_line(state),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn now_playing_line(state: &AppState) -> Line<'static> {
    let track = match state.mode() {
        Mode::Audio => state.current_track(),
        Mode::Embed => state.calm.scene.as_ref().map(|s| &s.track),
    };
    match track {
        Some(t) => Line::from(vec![
            Span::raw(format!(" {} ", t.icon)),
            Span::styled(
                t.title.clone(),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", t.subtitle), style_secondary()),
        ]),
        None => Line::from(Span::styled(" nothing selected", style_muted())),
    }
}

fn status_line(state: &AppState) -> Line<'static> {
    let (label, color) = match state.mode() {
        Mode::Embed if state.calm.embed_mounted => ("▶ scene open", C_PLAYING),
        Mode::Embed => ("scene closed", C_MUTED),
        Mode::Audio if state.is_playing() => ("▶ playing", C_PLAYING),
        Mode::Audio if state.calm.starting => ("… starting", C_STARTING),
        Mode::Audio => ("⏸ paused", C_MUTED),
    };

    let mut spans = vec![
        Span::styled(format!(" {}", label), Style::default().fg(color)),
        Span::styled("   vol ", style_muted()),
        Span::styled(
            format!("{:>3.0}%", state.volume() * 100.0),
            style_accent(),
        ),
        Span::styled("   sleep ", style_muted()),
        Span::styled(state.calm.timer.display(), style_accent()),
    ];
    if let Some(ends) = state.calm.timer_ends_at {
        spans.push(Span::styled(
            format!(" → {}", ends.format("%H:%M")),
            style_secondary(),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calm_engine::protocol::CalmState;
    use calm_engine::{Catalog, TimerState};

    fn audio_state() -> AppState {
        let calm = CalmState {
            tracks: Catalog::defaults().tracks().to_vec(),
            mode: Mode::Audio,
            ..Default::default()
        };
        AppState::new(calm, 0.05)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_status_line_shows_timer_and_volume() {
        let mut state = audio_state();
        state.calm.playback.volume = 0.4;
        state.calm.timer = TimerState {
            total_seconds: 900,
            seconds_remaining: Some(899),
        };
        let line = text(&status_line(&state));
        assert!(line.contains("⏸ paused"));
        assert!(line.contains(" 40%"));
        assert!(line.contains("14:59"));
    }

    #[test]
    fn test_starting_is_distinct_from_paused() {
        let mut state = audio_state();
        state.calm.starting = true;
        assert!(text(&status_line(&state)).contains("starting"));
        state.calm.playback.is_playing = true;
        assert!(text(&status_line(&state)).contains("playing"));
    }

    #[test]
    fn test_now_playing_follows_mode() {
        let mut state = audio_state();
        let first = state.calm.tracks[0].title.clone();
        assert!(text(&now_playing_line(&state)).contains(&first));

        state.calm.mode = Mode::Embed;
        state.calm.scene = Some(calm_engine::Scene::default());
        assert!(text(&now_playing_line(&state)).contains("Water + Piano"));
    }
}
