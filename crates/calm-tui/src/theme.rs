//! Colour palette and style helpers for the calmspace TUI.
//!
//! Deep navy background, soft sky accents, sage for "playing".

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(11, 16, 32);
pub const C_ACCENT: Color = Color::Rgb(125, 211, 252);
pub const C_PLAYING: Color = Color::Rgb(134, 197, 156);
pub const C_STARTING: Color = Color::Rgb(240, 200, 120);
pub const C_MUTED: Color = Color::Rgb(71, 85, 105);
pub const C_SEPARATOR: Color = Color::Rgb(30, 41, 59);
pub const C_SECONDARY: Color = Color::Rgb(148, 163, 184);
pub const C_PRIMARY: Color = Color::Rgb(226, 232, 240);
pub const C_SELECTION_BG: Color = Color::Rgb(22, 32, 56);
pub const C_BUTTON_BG: Color = Color::Rgb(20, 30, 52);
pub const C_BUTTON_ACTIVE_BG: Color = Color::Rgb(36, 64, 96);
pub const C_PANEL_BORDER: Color = Color::Rgb(30, 41, 59);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(96, 165, 250);
pub const C_TOAST_INFO: Color = Color::Rgb(125, 211, 252);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(134, 197, 156);
pub const C_TOAST_WARNING: Color = Color::Rgb(240, 200, 120);
pub const C_TOAST_ERROR: Color = Color::Rgb(248, 113, 113);
pub const C_BADGE_ERR: Color = Color::Rgb(248, 113, 113);
pub const C_BADGE_PENDING: Color = Color::Rgb(240, 200, 120);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_accent() -> Style {
    Style::default().fg(C_ACCENT)
}

pub fn style_playing() -> Style {
    Style::default().fg(C_PLAYING)
}

pub fn style_selected(focused: bool) -> Style {
    let style = Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY);
    if focused {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Clickable pill-style button; `active` marks the current choice.
pub fn style_button(active: bool) -> Style {
    if active {
        Style::default()
            .bg(C_BUTTON_ACTIVE_BG)
            .fg(C_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(C_BUTTON_BG).fg(C_SECONDARY)
    }
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
