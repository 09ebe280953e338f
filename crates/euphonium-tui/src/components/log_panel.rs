//! LogPanel component: tail of panel.log, toggled with `L`.
//!
//! The App refreshes `AppState::log_lines` with `read_log_tail`; the panel
//! only scrolls and formats.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_CONNECTING, C_ERROR, C_MUTED, C_SECONDARY},
    widgets::pane_chrome::Pane,
};

/// Bytes read from the end of the log file per refresh.
const TAIL_BYTES: u64 = 64 * 1024;

/// Last `max` lines of the file at `path`.  A missing file reads as empty.
pub fn read_log_tail(path: &Path, max: usize) -> Vec<String> {
    let Ok(mut file) = std::fs::File::open(path) else {
        return Vec::new();
    };
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    let start = len.saturating_sub(TAIL_BYTES);
    if file.seek(SeekFrom::Start(start)).is_err() {
        return Vec::new();
    }
    let mut bytes = Vec::new();
    if file.read_to_end(&mut bytes).is_err() {
        return Vec::new();
    }
    let text = String::from_utf8_lossy(&bytes);
    let mut lines: Vec<&str> = text.lines().collect();
    if start > 0 && !lines.is_empty() {
        // First line is cut mid-way.
        lines.remove(0);
    }
    let skip = lines.len().saturating_sub(max);
    lines
        .into_iter()
        .skip(skip)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub struct LogPanel {
    pub visible: bool,
    /// Lines scrolled up from the newest entry.
    scroll_back: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            visible: false,
            scroll_back: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        self.scroll_back = 0;
    }

    fn scroll_up(&mut self, n: usize, total: usize) {
        self.scroll_back = (self.scroll_back + n).min(total.saturating_sub(1));
    }

    fn scroll_down(&mut self, n: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(n);
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        let total = state.log_lines.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1, total),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10, total),
            KeyCode::PageDown => self.scroll_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll_up(total, total),
            KeyCode::End | KeyCode::Char('G') => self.scroll_back = 0,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_up(1, state.log_lines.len()),
            MouseEventKind::ScrollDown => self.scroll_down(1),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleLogs = action {
            self.toggle();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if !self.visible || area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);
        let block = Pane::new("log")
            .focused(focused)
            .borders(Borders::TOP)
            .block();
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let logs = &state.log_lines;
        if logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  no log entries yet ({})", state.log_path.display()),
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.scroll_back = self.scroll_back.min(logs.len().saturating_sub(1));
        let end = logs.len() - self.scroll_back;
        let start = end.saturating_sub(height);
        let lines: Vec<Line> = logs[start..end]
            .iter()
            .map(|raw| {
                let color = match level_of(raw) {
                    Some("ERROR") => C_ERROR,
                    Some("WARN") => C_CONNECTING,
                    _ => C_MUTED,
                };
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(compact_log_line(raw), Style::default().fg(color)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).style(Style::default().fg(C_SECONDARY)), inner);
    }
}

// ── Log line formatting ───────────────────────────────────────────────────────

const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

fn level_of(raw: &str) -> Option<&'static str> {
    raw.split_whitespace()
        .take(2)
        .find_map(|tok| LEVELS.iter().copied().find(|l| *l == tok))
}

/// `2026-10-19T08:15:02.123Z  WARN euphonium::playback: msg` becomes
/// `08:15:02 WARN msg` (time in local zone; date kept when not today).
pub fn compact_log_line(raw: &str) -> String {
    let mut rest = raw.trim();
    let mut head: Vec<String> = Vec::new();

    if let Some((tok, rem)) = rest.split_once(char::is_whitespace) {
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(tok) {
            let local = ts.with_timezone(&chrono::Local);
            let fmt = if local.date_naive() == chrono::Local::now().date_naive() {
                "%H:%M:%S"
            } else {
                "%m-%d %H:%M"
            };
            head.push(local.format(fmt).to_string());
            rest = rem.trim_start();
        }
    }

    if let Some((tok, rem)) = rest.split_once(char::is_whitespace) {
        if LEVELS.contains(&tok) {
            head.push(tok.to_string());
            rest = rem.trim_start();
        }
    }

    if let Some((target, msg)) = rest.split_once(": ") {
        if target.contains("::") || target.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            rest = msg;
        }
    }

    if head.is_empty() {
        rest.to_string()
    } else {
        format!("{} {}", head.join(" "), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_compact_strips_target() {
        assert_eq!(
            compact_log_line(" WARN euphonium::playback: ignoring playback event"),
            "WARN ignoring playback event"
        );
        assert_eq!(compact_log_line("plain text"), "plain text");
    }

    #[test]
    fn test_compact_shortens_timestamp() {
        let now = chrono::Local::now().to_rfc3339();
        let line = compact_log_line(&format!("{} INFO euphonium::app: started", now));
        assert!(line.ends_with("INFO started"), "{}", line);
        assert_eq!(line.split(' ').next().map(str::len), Some(8));
    }

    #[test]
    fn test_level_detection() {
        assert_eq!(level_of("2026-10-19T08:00:00Z ERROR x: y"), Some("ERROR"));
        assert_eq!(level_of("INFO x"), Some("INFO"));
        assert_eq!(level_of("nothing here"), None);
    }

    #[test]
    fn test_read_tail() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..20 {
            writeln!(file, "line {}", i).unwrap();
        }
        let tail = read_log_tail(file.path(), 3);
        assert_eq!(tail, vec!["line 17", "line 18", "line 19"]);
        assert!(read_log_tail(Path::new("/nonexistent/panel.log"), 3).is_empty());
    }
}
