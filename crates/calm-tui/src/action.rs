//! Action enum: all user-initiated intents and internal events.

use calm_engine::Mode;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    TrackList,
    Transport,
    TimerPanel,
    EmbedPanel,
    HelpOverlay,
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Mode ─────────────────────────────────────────────────────────────────
    SwitchMode(Mode),
    CycleMode,

    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    TogglePause,
    Stop,
    Next,
    Prev,
    SelectTrack(usize),
    Volume(f32),

    // ── Sleep timer ──────────────────────────────────────────────────────────
    StartTimer(u32),
    ClearTimer,

    // ── Scene player ─────────────────────────────────────────────────────────
    LaunchEmbed,
    CloseEmbed,

    // ── Notices ──────────────────────────────────────────────────────────────
    DismissNotice,

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
}
