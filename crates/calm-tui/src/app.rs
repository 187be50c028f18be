//! App: component-based terminal event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage`s in from background tasks:
//!   terminal input and core broadcasts.
//! - The loop draws, then awaits the next message.
//! - Components return `Vec<Action>`; App turns actions into `Command`s for
//!   the core.  State only changes when the core publishes a snapshot.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use calm_engine::protocol::{CalmState, Command, ResourceHealth};
use calm_engine::state::StateManager;
use calm_engine::Mode;

use crate::core::CoreEvent;
use crate::BroadcastMessage;
use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        embed_panel::EmbedPanel,
        header::draw_header,
        help_overlay::HelpOverlay,
        mode_bar::ModeBar,
        timer_panel::{next_preset_action, TimerPanel},
        track_list::TrackList,
        transport::{volume_delta, Transport},
    },
    focus::FocusRing,
    theme::C_BG,
    widgets::{
        status_bar::{draw_keys_bar, draw_log_bar, draw_separator},
        toast::ToastManager,
    },
};

/// Everything the loop reacts to.
pub enum AppMessage {
    Event(Event),
    StateUpdated(CalmState),
    Log(String),
}

pub struct App {
    state: AppState,
    state_manager: Arc<StateManager>,
    cmd_tx: mpsc::Sender<CoreEvent>,
    focus: FocusRing,
    mode_bar: ModeBar,
    track_list: TrackList,
    transport: Transport,
    timer_panel: TimerPanel,
    embed_panel: EmbedPanel,
    help_overlay: HelpOverlay,
    toasts: ToastManager,
    /// Where each pane was drawn last frame, for mouse routing.
    areas: HashMap<ComponentId, Rect>,
    mode_bar_area: Rect,
    should_quit: bool,
}

impl App {
    pub fn new(
        initial: CalmState,
        volume_step: f32,
        state_manager: Arc<StateManager>,
        cmd_tx: mpsc::Sender<CoreEvent>,
    ) -> Self {
        let focus = FocusRing::new(FocusRing::for_mode(initial.mode));
        let mut track_list = TrackList::new();
        track_list.follow(initial.playback.current_index);
        let mut toasts = ToastManager::new();
        toasts.set_notice(initial.notice.as_ref().map(|n| n.message.as_str()));
        Self {
            state: AppState::new(initial, volume_step),
            state_manager,
            cmd_tx,
            focus,
            mode_bar: ModeBar::new(),
            track_list,
            transport: Transport::new(),
            timer_panel: TimerPanel::new(),
            embed_panel: EmbedPanel::new(),
            help_overlay: HelpOverlay::new(),
            toasts,
            areas: HashMap::new(),
            mode_bar_area: Rect::default(),
            should_quit: false,
        }
    }

    pub async fn run(
        mut self,
        mut broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            while let Ok(ev) = event::read() {
                if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
        });

        // ── Background task: core broadcasts → AppMessage ─────────────────────
        let bc_tx = tx.clone();
        let bc_state_manager = Arc::clone(&self.state_manager);
        tokio::spawn(async move {
            loop {
                let msg = match broadcast_rx.recv().await {
                    Ok(BroadcastMessage::StateUpdated) => {
                        AppMessage::StateUpdated(bc_state_manager.get_state().await)
                    }
                    Ok(BroadcastMessage::Log(line)) => AppMessage::Log(line),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("broadcast receiver lagged by {} messages", n);
                        AppMessage::StateUpdated(bc_state_manager.get_state().await)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if bc_tx.send(msg).await.is_err() {
                    break;
                }
            }
        });

        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("calmspace UI running");
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg).await;
                    // drain what piled up so one frame covers it
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next).await;
                    }
                }
                _ = toast_tick.tick() => {
                    let had_toasts = !self.toasts.is_empty();
                    self.toasts.tick();
                    needs_redraw = had_toasts;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Returns whether a redraw is needed.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                self.handle_key(key).await;
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                self.handle_mouse(mouse).await;
                !matches!(mouse.kind, MouseEventKind::Moved)
            }
            AppMessage::Event(Event::Resize(w, h)) => {
                self.dispatch(Action::Resize(w, h)).await;
                true
            }
            AppMessage::Event(_) => false,
            AppMessage::StateUpdated(next) => {
                if next.rev == self.state.calm.rev {
                    return false;
                }
                let prev = std::mem::replace(&mut self.state.calm, next);
                self.on_state_changed(&prev);
                true
            }
            AppMessage::Log(line) => {
                self.state.push_log(line);
                true
            }
        }
    }

    /// Turn snapshot differences into toasts and view updates.
    fn on_state_changed(&mut self, prev: &CalmState) {
        let now = &self.state.calm;

        if now.mode != prev.mode {
            self.focus.set_items(FocusRing::for_mode(now.mode));
            self.toasts.info(now.mode.label());
        }
        if now.playback.current_index != prev.playback.current_index {
            self.track_list.follow(now.playback.current_index);
        }
        if now.health == ResourceHealth::Dead && prev.health != ResourceHealth::Dead {
            self.toasts
                .error("mpv went away. Press play to start it again");
        }
        if prev.embed_mounted && !now.embed_mounted && now.mode == Mode::Embed {
            self.toasts.warning("Scene player closed");
        }
        if timer_just_expired(prev, now) {
            self.toasts.success("Sleep timer ended. Sweet dreams.");
        }
        self.toasts
            .set_notice(now.notice.as_ref().map(|n| n.message.as_str()));
    }

    // ── Input ────────────────────────────────────────────────────────────────

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if self.help_overlay.visible {
            let actions = self.help_overlay.handle_key(key, &self.state);
            self.dispatch_all(actions).await;
            return;
        }

        if let Some(actions) = global_key(&key, &self.state, self.focus.current()) {
            self.dispatch_all(actions).await;
            return;
        }

        let actions = match self.focus.current() {
            Some(id) => self.route_key(id, key),
            None => vec![],
        };
        self.dispatch_all(actions).await;
    }

    fn route_key(&mut self, id: ComponentId, key: KeyEvent) -> Vec<Action> {
        let state = &self.state;
        match id {
            ComponentId::TrackList => self.track_list.handle_key(key, state),
            ComponentId::Transport => self.transport.handle_key(key, state),
            ComponentId::TimerPanel => self.timer_panel.handle_key(key, state),
            ComponentId::EmbedPanel => self.embed_panel.handle_key(key, state),
            ComponentId::HelpOverlay => self.help_overlay.handle_key(key, state),
        }
    }

    async fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = |r: &Rect| {
            mouse.column >= r.x
                && mouse.column < r.x + r.width
                && mouse.row >= r.y
                && mouse.row < r.y + r.height
        };

        if self.help_overlay.visible {
            if let MouseEventKind::Down(_) = mouse.kind {
                self.dispatch(Action::ToggleHelp).await;
            }
            return;
        }

        if hit(&self.mode_bar_area) {
            let actions = self.mode_bar.handle_mouse(mouse);
            self.dispatch_all(actions).await;
            return;
        }

        let target = FocusRing::for_mode(self.state.mode())
            .into_iter()
            .find_map(|id| self.areas.get(&id).filter(|r| hit(*r)).map(|r| (id, *r)));
        let Some((id, area)) = target else {
            return;
        };
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            self.focus.set(id);
        }
        let state = &self.state;
        let actions = match id {
            ComponentId::TrackList => self.track_list.handle_mouse(mouse, area, state),
            ComponentId::Transport => self.transport.handle_mouse(mouse, area, state),
            ComponentId::TimerPanel => self.timer_panel.handle_mouse(mouse, area, state),
            ComponentId::EmbedPanel => self.embed_panel.handle_mouse(mouse, area, state),
            ComponentId::HelpOverlay => vec![],
        };
        self.dispatch_all(actions).await;
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    async fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(action).await;
        }
    }

    async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let state = &self.state;
            queue.extend(self.track_list.on_action(&action, state));
            queue.extend(self.help_overlay.on_action(&action, state));

            if let Some(cmd) = command_for(&action, &self.state) {
                self.send_cmd(cmd).await;
            }

            match action {
                Action::FocusNext => {
                    self.focus.next();
                }
                Action::FocusPrev => {
                    self.focus.prev();
                }
                Action::ToggleKeys => self.state.show_keys = !self.state.show_keys,
                Action::Quit => {
                    self.should_quit = true;
                    let _ = self.cmd_tx.send(CoreEvent::Shutdown).await;
                }
                _ => {}
            }
        }
    }

    async fn send_cmd(&self, cmd: Command) {
        if self.cmd_tx.send(CoreEvent::ClientCommand(cmd)).await.is_err() {
            warn!("core is gone, command dropped");
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let keys_h = if self.state.show_keys { 1 } else { 0 };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(keys_h),
            ])
            .split(area);

        draw_header(frame, rows[0], &self.state);
        self.mode_bar_area = rows[1];
        self.mode_bar.draw(frame, rows[1], &self.state);
        draw_separator(frame, rows[2]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(rows[3]);

        self.areas.clear();
        let state = &self.state;
        match state.mode() {
            Mode::Audio => {
                let right = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(5), Constraint::Min(0)])
                    .split(body[1]);

                let focused = self.focus.is_focused(ComponentId::TrackList);
                self.track_list.draw(frame, body[0], focused, state);
                let focused = self.focus.is_focused(ComponentId::Transport);
                self.transport.draw(frame, right[0], focused, state);
                let focused = self.focus.is_focused(ComponentId::TimerPanel);
                self.timer_panel.draw(frame, right[1], focused, state);

                self.areas.insert(ComponentId::TrackList, body[0]);
                self.areas.insert(ComponentId::Transport, right[0]);
                self.areas.insert(ComponentId::TimerPanel, right[1]);
            }
            Mode::Embed => {
                let focused = self.focus.is_focused(ComponentId::EmbedPanel);
                self.embed_panel.draw(frame, body[0], focused, state);
                let focused = self.focus.is_focused(ComponentId::TimerPanel);
                self.timer_panel.draw(frame, body[1], focused, state);

                self.areas.insert(ComponentId::EmbedPanel, body[0]);
                self.areas.insert(ComponentId::TimerPanel, body[1]);
            }
        }

        draw_log_bar(frame, rows[4], state.last_log(), state.is_playing());
        if state.show_keys {
            draw_keys_bar(frame, rows[5], state.mode());
        }

        self.toasts.draw(frame, area);
        self.help_overlay.draw(frame, area, false, state);
    }
}

/// Keys that work regardless of focus.  `None` means the focused panel
/// gets the key.
pub fn global_key(
    key: &KeyEvent,
    state: &AppState,
    focused: Option<ComponentId>,
) -> Option<Vec<Action>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(vec![Action::Quit]),
            _ => None,
        };
    }

    let timer_owns_arrows = focused == Some(ComponentId::TimerPanel)
        && matches!(key.code, KeyCode::Left | KeyCode::Right);
    if !timer_owns_arrows {
        if let Some(delta) = volume_delta(key, state.volume_step) {
            return Some(vec![Action::Volume(state.nudged_volume(delta))]);
        }
    }

    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char('1') => Action::SwitchMode(Mode::Embed),
        KeyCode::Char('2') => Action::SwitchMode(Mode::Audio),
        KeyCode::Char('m') => Action::CycleMode,
        KeyCode::Char(' ') => match state.mode() {
            Mode::Audio => Action::TogglePause,
            Mode::Embed if state.calm.embed_mounted => Action::CloseEmbed,
            Mode::Embed => Action::LaunchEmbed,
        },
        KeyCode::Char('n') => Action::Next,
        KeyCode::Char('p') => Action::Prev,
        KeyCode::Char('s') => Action::Stop,
        KeyCode::Char('t') => next_preset_action(state),
        KeyCode::Char('T') => Action::ClearTimer,
        KeyCode::Char('e') => Action::LaunchEmbed,
        KeyCode::Char('c') => Action::CloseEmbed,
        KeyCode::Char('x') => Action::DismissNotice,
        KeyCode::Esc if state.calm.notice.is_some() => Action::DismissNotice,
        KeyCode::Char('K') => Action::ToggleKeys,
        _ => return None,
    };
    Some(vec![action])
}

/// The core command an action stands for, if any.
pub fn command_for(action: &Action, state: &AppState) -> Option<Command> {
    let cmd = match *action {
        Action::SwitchMode(mode) => Command::SwitchMode { mode },
        Action::CycleMode => Command::SwitchMode {
            mode: state.mode().next(),
        },
        Action::Play => Command::Play,
        Action::Pause => Command::Pause,
        Action::TogglePause => Command::TogglePause,
        Action::Stop => Command::Stop,
        Action::Next => Command::Next,
        Action::Prev => Command::Prev,
        Action::SelectTrack(index) => Command::SelectTrack { index },
        Action::Volume(value) => Command::Volume { value },
        Action::StartTimer(minutes) => Command::StartTimer { minutes },
        Action::ClearTimer => Command::ClearTimer,
        Action::LaunchEmbed => Command::LaunchEmbed,
        Action::CloseEmbed => Command::CloseEmbed,
        Action::DismissNotice => Command::DismissNotice,
        Action::FocusNext
        | Action::FocusPrev
        | Action::ToggleHelp
        | Action::ToggleKeys
        | Action::Quit
        | Action::Resize(..) => return None,
    };
    Some(cmd)
}

/// The countdown ran out on its own (not cleared from a higher value).
fn timer_just_expired(prev: &CalmState, now: &CalmState) -> bool {
    matches!(prev.timer.seconds_remaining, Some(s) if s <= 1) && !now.timer.is_running()
}
