//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns the components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws a frame when something changed, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the playback core flow out through the `CoreHandle`.

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
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use radio_model::protocol::{PlaybackState, Station, Volume};
use radio_model::state::StateManager;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{header, station_list::StationList, volume_slider::VolumeSlider},
    core::CoreHandle,
    BroadcastMessage,
};

/// Messages delivered into the App event loop from background tasks.
#[derive(Debug)]
pub enum AppMessage {
    /// A raw crossterm input event.
    Event(Event),
    /// A new snapshot from the StateManager.
    StateUpdated(PlaybackState),
}

/// Last-drawn pane rects, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    station_list: Rect,
    volume_slider: Rect,
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0
        && r.height > 0
        && col >= r.x
        && col < r.x + r.width
        && row >= r.y
        && row < r.y + r.height
}

pub struct App {
    state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    station_list: StationList,
    volume_slider: VolumeSlider,
    focus: ComponentId,

    // ── Session bookkeeping ───────────────────────────────────────────────────
    core: CoreHandle,
    state_manager: Arc<StateManager>,
    should_quit: bool,
    pane_areas: PaneAreas,
    /// Component that received the last left-button press; drags go there.
    drag_target: Option<ComponentId>,
}

impl App {
    pub fn new(
        stations: &'static [Station],
        initial: PlaybackState,
        volume_step: f32,
        core: CoreHandle,
        state_manager: Arc<StateManager>,
    ) -> Self {
        Self {
            state: AppState::new(stations, initial, volume_step),
            station_list: StationList::new(stations.len()),
            volume_slider: VolumeSlider::new(),
            focus: ComponentId::StationList,
            core,
            state_manager,
            should_quit: false,
            pane_areas: PaneAreas::default(),
            drag_target: None,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(
        mut self,
        broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, broadcast_rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        // Release the player before giving the terminal back.
        self.core.shutdown().await;
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard/mouse events ────────────────────────────
        // Polls so the thread notices the loop has gone and lets the runtime exit.
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            while !event_tx.is_closed() {
                match event::poll(Duration::from_millis(100)) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(_) => break,
                }
                match event::read() {
                    Ok(ev) => {
                        if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        // ── Background task: broadcast receiver (PlaybackCore → AppMessage) ───
        let bc_tx = tx.clone();
        let bc_state_manager = self.state_manager.clone();
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(BroadcastMessage::StateUpdated) => {
                        let state = bc_state_manager.get_state().await;
                        if bc_tx.send(AppMessage::StateUpdated(state)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // snapshots are whole states; the next one catches up
                        warn!("broadcast receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        drop(tx);

        // Pending-marker pulse and timeout check.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }

            if self.should_quit {
                break;
            }

            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        info!("input channels closed");
                        break;
                    };
                    needs_redraw = self.handle_message(msg).await;
                    // Drain whatever else is queued before redrawing.
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next).await;
                    }
                }

                _ = ui_tick.tick() => {
                    needs_redraw = self.state.tick() || self.state.station_hint.is_pending();
                }
            }
        }

        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    let actions = self.handle_key(key);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                    true
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    let redraw = !actions.is_empty()
                        || matches!(mouse.kind, MouseEventKind::ScrollUp | MouseEventKind::ScrollDown);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                    redraw
                }
                Event::Resize(_, _) => true,
                _ => false,
            },

            AppMessage::StateUpdated(snapshot) => {
                debug!("state rev {}: {:?}", snapshot.rev, snapshot.status);
                self.state.on_snapshot(snapshot);
                true
            }
        }
    }

    // ── Input routing ─────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys — always active regardless of focus
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return vec![Action::Quit],
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![Action::Quit];
            }
            KeyCode::Tab | KeyCode::BackTab => return vec![Action::FocusNext],
            KeyCode::Char('-') => return vec![Action::NudgeVolume(-self.state.volume_step)],
            KeyCode::Char('+') | KeyCode::Char('=') => {
                return vec![Action::NudgeVolume(self.state.volume_step)];
            }
            _ => {}
        }

        match self.focus {
            ComponentId::StationList => match key.code {
                // ←/→ adjust volume from the list too
                KeyCode::Left => vec![Action::NudgeVolume(-self.state.volume_step)],
                KeyCode::Right => vec![Action::NudgeVolume(self.state.volume_step)],
                _ => self.station_list.handle_key(key, &self.state),
            },
            ComponentId::VolumeSlider => self.volume_slider.handle_key(key, &self.state),
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let areas = self.pane_areas;
        let s = &self.state;
        let (col, row) = (event.column, event.row);

        let target = match event.kind {
            MouseEventKind::Drag(MouseButton::Left) => self.drag_target,
            MouseEventKind::Up(_) => {
                self.drag_target = None;
                return vec![];
            }
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let target = if hit(areas.station_list, col, row) {
                    Some(ComponentId::StationList)
                } else if hit(areas.volume_slider, col, row) {
                    Some(ComponentId::VolumeSlider)
                } else {
                    None
                };
                if matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
                    self.drag_target = target;
                }
                target
            }
            _ => None,
        };

        let Some(id) = target else {
            return vec![];
        };
        let mut actions = match id {
            ComponentId::StationList => self.station_list.handle_mouse(event, areas.station_list, s),
            ComponentId::VolumeSlider => {
                self.volume_slider
                    .handle_mouse(event, areas.volume_slider, s)
            }
        };
        // Focus follows the click
        if matches!(event.kind, MouseEventKind::Down(_)) && self.focus != id {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        debug!("dispatch: {:?}", action);
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::Tap(idx) => {
                let Some(station) = self.state.stations.get(idx) else {
                    return;
                };
                match self.core.select_station(station.url.clone()).await {
                    Ok(()) => self.state.tap_sent(&station.url),
                    Err(e) => debug!("tap on {} dropped: {}", station.name, e),
                }
            }
            Action::SetVolume(value) => self.send_volume(Volume::new(value)).await,
            Action::NudgeVolume(delta) => {
                let target = self.state.requested_volume.offset(delta);
                self.send_volume(target).await;
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPane(id) => self.focus = id,

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
        }
    }

    async fn send_volume(&mut self, volume: Volume) {
        if volume == self.state.requested_volume {
            return;
        }
        match self.core.set_volume(volume.get()).await {
            Ok(()) => self.state.volume_sent(volume),
            Err(e) => debug!("volume change dropped: {}", e),
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        // header | station list | volume slider
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        header::draw(frame, rows[0], &self.state);

        self.pane_areas = PaneAreas {
            station_list: rows[1],
            volume_slider: rows[2],
        };
        let panes: [(&mut dyn Component, Rect); 2] = [
            (&mut self.station_list, rows[1]),
            (&mut self.volume_slider, rows[2]),
        ];
        for (pane, area) in panes {
            let focused = pane.id() == self.focus;
            pane.draw(frame, area, focused, &self.state);
        }
    }
}
