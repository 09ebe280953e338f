//! PlaybackBar: the now-playing strip along the bottom of the panel.
//!
//! Rows:
//!   1. song title
//!   2. `artist • album • playback from <source>`
//!   3. cover art reference
//!
//! On a wide terminal a control cluster sits at the right: equalizer toggle,
//! volume slider and the transport icon.  On a compact terminal the cluster
//! is not drawn and the volume/equalizer keys are inert.
//!
//! Everything shown is read from the view-model's last snapshot; nothing is
//! predicted locally.

use euphonium_proto::protocol::{PlaybackState, PlaybackStatus, SongInfo, VOLUME_SLIDER_MAX};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Borders, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::equalizer,
    theme::{C_ACCENT, C_BAR_BG, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY},
    widgets::{pane_chrome::Pane, volume_slider},
};

/// Shown for any field the device has not told us yet.
pub const PLACEHOLDER: &str = "—";

/// Rows taken by the bar, border included.
pub const BAR_HEIGHT: u16 = 5;
const SLIDER_WIDTH: u16 = 16;
const EQ_LABEL: &str = " ≋ eq ";
const VOL_LABEL: &str = " vol ";
/// `" 15/15 "`
const COUNT_WIDTH: u16 = 7;
/// `"⏸ pause"`, the longer of the two transport labels.
const TRANSPORT_WIDTH: u16 = 7;
/// The control row: eq toggle, volume label, slider, count and transport.
const CONTROLS_WIDTH: u16 = 6 + 5 + SLIDER_WIDTH + COUNT_WIDTH + TRANSPORT_WIDTH + 1;

pub struct PlaybackBar {
    /// Last drawn slider track, for mouse hit-testing.
    slider_area: Rect,
    eq_toggle_area: Rect,
    /// Where the popover hangs from; the App draws it above everything.
    popover_anchor: Rect,
}

impl PlaybackBar {
    pub fn new() -> Self {
        Self {
            slider_area: Rect::default(),
            eq_toggle_area: Rect::default(),
            popover_anchor: Rect::default(),
        }
    }

    /// Draw the equalizer popover if it should be visible.  Called after
    /// every pane so it overlaps the content above the bar.
    pub fn draw_popover(&self, frame: &mut Frame, state: &AppState) {
        if state.is_compact() || self.popover_anchor.width == 0 {
            return;
        }
        if let Some(eq) = state.playback.visible_equalizer() {
            let screen = frame.area();
            equalizer::draw_popover(frame, self.popover_anchor, screen, eq);
        }
    }

    /// Slider stop of the reported volume, held to the slider's range.
    fn current_position(state: &AppState) -> i32 {
        state
            .playback
            .state()
            .map(PlaybackState::slider_position)
            .unwrap_or(0)
            .clamp(0, VOLUME_SLIDER_MAX)
    }
}

impl Default for PlaybackBar {
    fn default() -> Self {
        Self::new()
    }
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

pub fn title_line(song: Option<&SongInfo>) -> String {
    or_placeholder(song.map(|s| s.song_name.as_str()).unwrap_or("")).to_string()
}

pub fn subtitle_line(song: Option<&SongInfo>) -> String {
    format!(
        "{} • {} • playback from {}",
        or_placeholder(song.map_or("", |s| s.artist_name.as_str())),
        or_placeholder(song.map_or("", |s| s.album_name.as_str())),
        or_placeholder(song.map_or("", |s| s.source_name.as_str())),
    )
}

pub fn art_line(song: Option<&SongInfo>) -> String {
    format!("art {}", or_placeholder(song.map(|s| s.icon.as_str()).unwrap_or("")))
}

fn transport_glyph(status: &PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "⏸",
        _ => "▶",
    }
}

impl Component for PlaybackBar {
    fn id(&self) -> ComponentId {
        ComponentId::PlaybackBar
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if let KeyCode::Char('r') = key.code {
            return vec![Action::RefetchPlayback];
        }
        if state.is_compact() {
            return vec![];
        }
        let pos = Self::current_position(state);
        match key.code {
            KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => {
                vec![Action::SetVolume((pos - 1).max(0))]
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') => {
                vec![Action::SetVolume((pos + 1).min(VOLUME_SLIDER_MAX))]
            }
            KeyCode::Home => vec![Action::SetVolume(0)],
            KeyCode::End => vec![Action::SetVolume(VOLUME_SLIDER_MAX)],
            KeyCode::Char('e') => vec![Action::ToggleEqualizer],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        if state.is_compact() {
            return vec![];
        }
        let MouseEventKind::Down(_) = event.kind else {
            return vec![];
        };
        let inside = |r: Rect| {
            r.width > 0
                && event.column >= r.x
                && event.column < r.x + r.width
                && event.row >= r.y
                && event.row < r.y + r.height
        };
        if inside(self.eq_toggle_area) {
            return vec![Action::ToggleEqualizer];
        }
        if inside(self.slider_area) {
            if let Some(pos) = volume_slider::position_at(self.slider_area, event.column) {
                return vec![Action::SetVolume(pos)];
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.slider_area = Rect::default();
        self.eq_toggle_area = Rect::default();
        self.popover_anchor = Rect::default();
        if area.height == 0 {
            return;
        }

        let block = Pane::new("now playing")
            .slot('3')
            .focused(focused)
            .borders(Borders::TOP)
            .block()
            .style(Style::default().bg(C_BAR_BG));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let snapshot = state.playback.state();
        let song = snapshot.map(|s| &s.song);
        let compact = state.is_compact();

        let (info_area, controls_area) = if compact || inner.width < CONTROLS_WIDTH + 20 {
            (inner, None)
        } else {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(CONTROLS_WIDTH)])
                .split(inner);
            (cols[0], Some(cols[1]))
        };

        let info = vec![
            Line::from(Span::styled(
                format!(" {}", title_line(song)),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(" {}", subtitle_line(song)),
                Style::default().fg(C_SECONDARY),
            )),
            Line::from(Span::styled(
                format!(" {}", art_line(song)),
                Style::default().fg(C_MUTED),
            )),
        ];
        frame.render_widget(Paragraph::new(info), info_area);

        // Wide only from here: the control cluster.
        let Some(controls) = controls_area else {
            return;
        };

        let position = Self::current_position(state);
        let status = snapshot.map(|s| s.status.clone()).unwrap_or_default();
        let eq_style = if state.playback.eq_open() {
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        let transport_style = if status == PlaybackStatus::Playing {
            Style::default().fg(C_PLAYING)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        // " ≋ eq  vol ━━━━━━━●──────── 7/15  ⏸ pause"
        let mut spans = vec![
            Span::styled(EQ_LABEL, eq_style),
            Span::styled(VOL_LABEL, Style::default().fg(C_SECONDARY)),
        ];
        spans.extend(volume_slider::slider_line(position, SLIDER_WIDTH).spans);
        spans.push(Span::styled(
            format!(" {:>2}/{} ", position, VOLUME_SLIDER_MAX),
            Style::default().fg(C_MUTED),
        ));
        spans.push(Span::styled(
            format!("{} {}", transport_glyph(&status), status.transport_icon()),
            transport_style,
        ));

        let row = Rect {
            height: 1,
            y: controls.y + controls.height.saturating_sub(1) / 2,
            ..controls
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), row);

        let eq_w = EQ_LABEL.chars().count() as u16;
        let vol_w = VOL_LABEL.chars().count() as u16;
        self.eq_toggle_area = Rect {
            width: eq_w.min(row.width),
            ..row
        };
        self.slider_area = Rect {
            x: row.x + eq_w + vol_w,
            width: SLIDER_WIDTH.min(row.width.saturating_sub(eq_w + vol_w)),
            ..row
        };
        self.popover_anchor = Rect {
            x: row.x,
            y: area.y,
            width: eq_w,
            height: 1,
        };
    }
}
