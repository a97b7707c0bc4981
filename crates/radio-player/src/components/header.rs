//! Header — one-row title bar with the now-playing station.
//!
//! Not focusable; draws to a 1-row area.

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use radio_model::catalog::find_by_url;
use radio_model::protocol::PlaybackStatus;

use crate::app_state::AppState;
use crate::theme::{style_default, style_muted, style_paused, style_playing};

pub const TITLE: &str = "Select a Station";

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::styled(
        format!(" {}", TITLE),
        style_default().add_modifier(Modifier::BOLD),
    )];

    let now = state
        .playback
        .current_url
        .as_deref()
        .and_then(find_by_url)
        .map(|s| s.name.as_str());
    if let Some(name) = now {
        let style = match state.playback.status {
            PlaybackStatus::Playing => style_playing(),
            _ => style_paused(),
        };
        spans.push(Span::styled("  ·  ", style_muted()));
        spans.push(Span::styled(name, style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
