//! VolumeSlider component — bottom pane bound to the stored volume.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Margin, Rect},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    widgets::{level_bar, pane_chrome::pane_chrome},
};

#[derive(Default)]
pub struct VolumeSlider;

impl VolumeSlider {
    pub fn new() -> Self {
        Self
    }
}

/// Area the bar is drawn into, given the pane area.
fn bar_area(area: Rect) -> Rect {
    area.inner(Margin::new(1, 1))
}

impl Component for VolumeSlider {
    fn id(&self) -> ComponentId {
        ComponentId::VolumeSlider
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let step = state.volume_step;
        match key.code {
            KeyCode::Left | KeyCode::Down | KeyCode::Char('h') => vec![Action::NudgeVolume(-step)],
            KeyCode::Right | KeyCode::Up | KeyCode::Char('l') => vec![Action::NudgeVolume(step)],
            KeyCode::Home => vec![Action::SetVolume(0.0)],
            KeyCode::End => vec![Action::SetVolume(1.0)],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                let level = level_bar::column_to_level(bar_area(area), event.column);
                vec![Action::SetVolume(level)]
            }
            MouseEventKind::ScrollUp => vec![Action::NudgeVolume(state.volume_step)],
            MouseEventKind::ScrollDown => vec![Action::NudgeVolume(-state.volume_step)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("volume", focused, None);
        frame.render_widget(block, area);
        let volume = state.playback.volume;
        level_bar::draw_level(frame, bar_area(area), volume.get(), volume.percent());
    }
}
