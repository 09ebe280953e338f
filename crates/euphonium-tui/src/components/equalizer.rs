//! Equalizer popover: the device's equalizer settings, shown read-only
//! above the playback bar's eq toggle.

use euphonium_proto::protocol::EqualizerSettings;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme::{C_ACCENT, C_MUTED, C_POPOVER_BG, C_PRIMARY, C_SECONDARY, C_SLIDER_EMPTY};

const POPOVER_WIDTH: u16 = 30;
const BAR_CELLS: usize = 12;

/// Lines of the popover body: one gauge per numeric band, then any other
/// member as plain `key: value`.
pub fn popover_lines(eq: &EqualizerSettings) -> Vec<Line<'static>> {
    let bands = eq.bands();
    let span = bands
        .iter()
        .map(|(_, v)| v.abs())
        .fold(1.0_f64, f64::max);

    let mut lines: Vec<Line> = bands
        .iter()
        .map(|(name, value)| {
            let half = BAR_CELLS / 2;
            let cells = ((value.abs() / span) * half as f64).round() as usize;
            let (left, right) = if *value < 0.0 {
                (cells.min(half), 0)
            } else {
                (0, cells.min(half))
            };
            Line::from(vec![
                Span::styled(format!(" {:<6}", name), Style::default().fg(C_SECONDARY)),
                Span::styled(" ".repeat(half - left), Style::default()),
                Span::styled("▮".repeat(left), Style::default().fg(C_ACCENT)),
                Span::styled("│", Style::default().fg(C_SLIDER_EMPTY)),
                Span::styled("▮".repeat(right), Style::default().fg(C_ACCENT)),
                Span::styled(" ".repeat(half - right), Style::default()),
                Span::styled(format!(" {:>5}", format_value(*value)), Style::default().fg(C_PRIMARY)),
            ])
        })
        .collect();

    for (key, value) in eq.0.iter().filter(|(_, v)| !v.is_number()) {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {}: ", key), Style::default().fg(C_SECONDARY)),
            Span::styled(text, Style::default().fg(C_PRIMARY)),
        ]));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            " no bands reported",
            Style::default().fg(C_MUTED),
        )));
    }
    lines
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:+}", v as i64)
    } else {
        format!("{:+.1}", v)
    }
}

/// Draw the popover hanging above `anchor`, kept inside `screen`.
pub fn draw_popover(frame: &mut Frame, anchor: Rect, screen: Rect, eq: &EqualizerSettings) {
    let lines = popover_lines(eq);
    let height = (lines.len() as u16 + 2).min(anchor.y.saturating_sub(screen.y));
    if height < 3 {
        return;
    }
    let width = POPOVER_WIDTH.min(screen.width);
    let max_x = screen.x + screen.width - width;
    let rect = Rect {
        x: anchor.x.min(max_x),
        y: anchor.y - height,
        width,
        height,
    };

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT))
        .title(Span::styled(
            " equalizer ",
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(C_POPOVER_BG));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
