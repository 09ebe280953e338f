//! Volume slider: 16 stops drawn as a horizontal track.

use euphonium_proto::protocol::VOLUME_SLIDER_MAX;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
};

use crate::theme::{C_PRIMARY, C_SLIDER_EMPTY, C_SLIDER_FILL};

/// Track spans for `position` on a slider `width` cells wide.  Positions
/// outside 0..=15 are pinned to the ends for drawing only.
pub fn slider_line(position: i32, width: u16) -> Line<'static> {
    let width = width.max(2) as i32;
    let pos = position.clamp(0, VOLUME_SLIDER_MAX);
    let knob = pos * (width - 1) / VOLUME_SLIDER_MAX;

    let mut spans = Vec::with_capacity(3);
    if knob > 0 {
        spans.push(Span::styled(
            "━".repeat(knob as usize),
            Style::default().fg(C_SLIDER_FILL),
        ));
    }
    spans.push(Span::styled("●", Style::default().fg(C_PRIMARY)));
    let rest = width - knob - 1;
    if rest > 0 {
        spans.push(Span::styled(
            "─".repeat(rest as usize),
            Style::default().fg(C_SLIDER_EMPTY),
        ));
    }
    Line::from(spans)
}

/// Slider stop under column `column` of a track drawn in `area`.
pub fn position_at(area: Rect, column: u16) -> Option<i32> {
    if area.width < 2 || column < area.x || column >= area.x + area.width {
        return None;
    }
    let offset = (column - area.x) as i32;
    let span = area.width as i32 - 1;
    // Nearest stop to the clicked cell.
    Some((offset * VOLUME_SLIDER_MAX * 2 + span) / (span * 2))
}
