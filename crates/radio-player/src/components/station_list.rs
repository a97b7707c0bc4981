//! StationList component — the catalog, one row per station.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use radio_model::protocol::{PlaybackStatus, Station};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    intent::RenderHint,
    theme::{
        style_muted, C_ACCENT, C_MUTED, C_PAUSED, C_PENDING, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct StationList {
    list: ScrollableList,
}

impl StationList {
    pub fn new(len: usize) -> Self {
        Self {
            list: ScrollableList::new(len),
        }
    }

    fn tap_selected(&self) -> Vec<Action> {
        self.list
            .selected_index()
            .map(|idx| vec![Action::Tap(idx)])
            .unwrap_or_default()
    }
}

/// Build the row for `station`: status icon, name, and "Playing"/"Paused"
/// when it is the selected station.
pub fn station_row(station: &Station, is_cursor: bool, state: &AppState) -> Line<'static> {
    let playback = &state.playback;
    let label = playback.label_for(&station.url);

    let (base_icon, base_color): (&'static str, Color) = match label {
        Some(_) if playback.status == PlaybackStatus::Playing => ("▶", C_PLAYING),
        Some(_) => ("⏸", C_PAUSED),
        None => (" ", C_MUTED),
    };

    let (icon, icon_color) = match state.hint_for(&station.url) {
        RenderHint::Normal => (base_icon, base_color),
        RenderHint::PendingVisible => ("⋯", C_PENDING),
        RenderHint::PendingHidden => (" ", C_PENDING),
        RenderHint::TimedOut => ("?", C_ACCENT),
    };

    let name_color = match label {
        Some(_) if playback.status == PlaybackStatus::Playing => C_PLAYING,
        Some(_) => C_PAUSED,
        None if is_cursor => C_PRIMARY,
        None => C_SECONDARY,
    };
    let mut name_style = Style::default().fg(name_color);
    if label.is_some() || is_cursor {
        name_style = name_style.add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(icon, Style::default().fg(icon_color)),
        Span::raw("  "),
        Span::styled(station.name.clone(), name_style),
    ];
    if let Some(label) = label {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(label, Style::default().fg(base_color)));
    }
    Line::from(spans)
}

impl Component for StationList {
    fn id(&self) -> ComponentId {
        ComponentId::StationList
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter | KeyCode::Char(' ') => return self.tap_selected(),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                // rows between the top and bottom borders only
                let visible = area.height.saturating_sub(2);
                if event.row > area.y && event.row - area.y - 1 < visible {
                    let rel_row = (event.row - area.y - 1) as usize;
                    if let Some(idx) = self.list.handle_click(rel_row) {
                        return vec![Action::Tap(idx)];
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = state.playback.status.label().map(|text| Badge {
            text,
            color: if state.playback.is_playing {
                C_PLAYING
            } else {
                C_PAUSED
            },
        });
        let block = pane_chrome("stations", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no stations", style_muted())),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let cursor = self.list.selected_index();

        let items: Vec<ListItem> = self
            .list
            .visible_range(height)
            .filter_map(|idx| state.stations.get(idx).map(|s| (idx, s)))
            .map(|(idx, station)| {
                let is_cursor = cursor == Some(idx);
                let item = ListItem::new(station_row(station, is_cursor, state));
                if is_cursor && focused {
                    item.style(Style::default().bg(C_SELECTION_BG))
                } else {
                    item
                }
            })
            .collect();

        frame.render_widget(List::new(items), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_model::catalog::list_stations;
    use radio_model::protocol::{PlaybackState, Volume};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn row_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn state_with(current: Option<&str>, status: PlaybackStatus) -> AppState {
        let playback = PlaybackState {
            rev: 1,
            current_url: current.map(str::to_string),
            is_playing: status == PlaybackStatus::Playing,
            volume: Volume::MAX,
            status,
        };
        AppState::new(list_stations(), playback, 0.05)
    }

    #[test]
    fn test_only_selected_row_is_labelled() {
        let stations = list_stations();
        let state = state_with(Some(&stations[1].url), PlaybackStatus::Playing);

        let selected = row_text(&station_row(&stations[1], false, &state));
        assert!(selected.contains(&stations[1].name));
        assert!(selected.ends_with("Playing"));
        assert!(selected.contains('▶'));

        for (i, station) in stations.iter().enumerate() {
            if i == 1 {
                continue;
            }
            let text = row_text(&station_row(station, false, &state));
            assert!(!text.contains("Playing") && !text.contains("Paused"));
        }
    }

    #[test]
    fn test_paused_row_label() {
        let stations = list_stations();
        let state = state_with(Some(&stations[4].url), PlaybackStatus::Paused);
        let text = row_text(&station_row(&stations[4], true, &state));
        assert!(text.ends_with("Paused"));
        assert!(text.contains('⏸'));
    }

    #[test]
    fn test_pending_tap_marker() {
        let stations = list_stations();
        let mut state = state_with(None, PlaybackStatus::Idle);
        state.tap_sent(&stations[2].url);

        let text = row_text(&station_row(&stations[2], true, &state));
        // visible or hidden pulse frame, never a label yet
        assert!(text.contains('⋯') || text.starts_with("    "));
        assert!(!text.contains("Playing"));
        let other = row_text(&station_row(&stations[3], false, &state));
        assert!(!other.contains('⋯'));
    }

    #[test]
    fn test_enter_and_space_tap_cursor_row() {
        let state = state_with(None, PlaybackStatus::Idle);
        let mut list = StationList::new(state.stations.len());

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        list.handle_key(down, &state);
        list.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE), &state);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(list.handle_key(enter, &state), vec![Action::Tap(2)]);

        list.handle_key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE), &state);
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(list.handle_key(space, &state), vec![Action::Tap(1)]);
    }

    #[test]
    fn test_click_taps_row_under_pointer() {
        let state = state_with(None, PlaybackStatus::Idle);
        let mut list = StationList::new(state.stations.len());
        let area = Rect::new(0, 2, 40, 12);

        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        // border row hits nothing
        assert!(list.handle_mouse(click(2), area, &state).is_empty());
        assert_eq!(list.handle_mouse(click(3), area, &state), vec![Action::Tap(0)]);
        assert_eq!(list.handle_mouse(click(7), area, &state), vec![Action::Tap(4)]);
        assert_eq!(list.list.selected_index(), Some(4));
    }

    #[test]
    fn test_click_on_bottom_border_taps_nothing() {
        let state = state_with(None, PlaybackStatus::Idle);
        let mut list = StationList::new(state.stations.len());
        // four visible rows (3..=6), bottom border on row 7
        let area = Rect::new(0, 2, 40, 6);

        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(list.handle_mouse(click(6), area, &state), vec![Action::Tap(3)]);
        assert!(list.handle_mouse(click(7), area, &state).is_empty());
        assert_eq!(list.list.selected_index(), Some(3));

        // scrolled down, the border still maps to nothing
        list.list.select_last();
        list.list.ensure_visible(4);
        assert!(list.handle_mouse(click(7), area, &state).is_empty());
        assert_eq!(list.handle_mouse(click(3), area, &state), vec![Action::Tap(6)]);
    }
}
