//! Status line and key-hints footer.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::event_source::ConnectionState;
use crate::route::Route;
use crate::theme::{
    C_CONNECTING, C_ERROR, C_MODE_EDIT, C_MODE_FILTER, C_MODE_NORMAL, C_MUTED, C_PLAYING,
    C_SECONDARY,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    /// Typing into the station search box.
    Filter,
    /// Editing a plugin setting.
    Edit,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "SEARCH",
            Self::Edit => "EDIT",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Filter => C_MODE_FILTER,
            Self::Edit => C_MODE_EDIT,
        }
    }
}

pub fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Open => C_PLAYING,
        ConnectionState::Connecting => C_CONNECTING,
        ConnectionState::Closed => C_ERROR,
    }
}

/// `● live  http://device  /web/apps/webradio   <last log line>`
pub fn draw_status_line(
    frame: &mut Frame,
    area: Rect,
    connection: ConnectionState,
    device_url: &str,
    route: &Route,
    last_log: Option<&str>,
) {
    let dot = match connection {
        ConnectionState::Open => "●",
        _ => "○",
    };
    let spans = vec![
        Span::raw(" "),
        Span::styled(dot, Style::default().fg(connection_color(connection))),
        Span::styled(
            format!(" {} ", connection.label()),
            Style::default().fg(connection_color(connection)),
        ),
        Span::styled(device_url, Style::default().fg(C_MUTED)),
        Span::raw("  "),
        Span::styled(route.path(), Style::default().fg(C_SECONDARY)),
        Span::raw("   "),
        Span::styled(last_log.unwrap_or(""), Style::default().fg(C_MUTED)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints for the current mode and route.
pub fn key_hints(mode: InputMode, route: &Route) -> &'static str {
    match mode {
        InputMode::Filter => " type to search  Enter search  Esc clear/close  ↑↓ move",
        InputMode::Edit => " type value  Enter keep  Esc clear/cancel",
        InputMode::Normal => match route {
            Route::Home => {
                " ↑↓ select  Enter open  Tab panes  ←→ volume  e eq  r refresh  L logs  ? help  q quit"
            }
            Route::Plugin(_) => {
                " ↑↓ field  Enter edit  Space toggle  ←→ option  s save  Esc back  Tab panes  ? help  q quit"
            }
            Route::WebRadio => {
                " / search  ↑↓ select  Enter play  Esc back  Tab panes  L logs  ? help  q quit"
            }
        },
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, route: &Route) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(key_hints(mode, route), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
