//! Smooth Unicode level bar for the volume slider.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_GAUGE_EMPTY, C_PLAYING, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Width reserved on the right for the " 100%" label.
pub const LABEL_WIDTH: u16 = 5;

/// Render `level` (0.0..=1.0) as a bar followed by a percent label.
pub fn draw_level(frame: &mut Frame, area: Rect, level: f32, percent: u16) {
    if area.width <= LABEL_WIDTH || area.height == 0 {
        return;
    }
    let bar_w = bar_width(area) as usize;

    let spans = vec![
        Span::styled(
            bar_string(level, bar_w),
            Style::default().fg(C_PLAYING).bg(C_GAUGE_EMPTY),
        ),
        Span::styled(format!("{:>4}%", percent), Style::default().fg(C_SECONDARY)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn bar_width(area: Rect) -> u16 {
    area.width.saturating_sub(LABEL_WIDTH)
}

/// 8 eighths per cell.
fn bar_string(level: f32, width: usize) -> String {
    let eighths = (level.clamp(0.0, 1.0) * width as f32 * 8.0).round() as usize;
    let full_blocks = (eighths / 8).min(width);
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

/// Map a terminal column inside `area` to a level.  The first bar cell is
/// 0.0 and the last is 1.0; columns in the label clamp to 1.0.
pub fn column_to_level(area: Rect, column: u16) -> f32 {
    let bar_w = bar_width(area);
    if bar_w <= 1 {
        return 1.0;
    }
    let offset = column.saturating_sub(area.x).min(bar_w - 1);
    offset as f32 / (bar_w - 1) as f32
}
