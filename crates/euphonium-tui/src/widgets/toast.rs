//! Toasts: transient messages stacked in the top-right corner.
//!
//! Volume failures, save results and search errors end up here; nothing in
//! the panel blocks on them.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Severity::Info => "·",
            Severity::Success => "✓",
            Severity::Warning => "!",
            Severity::Error => "✗",
        }
    }

    fn color(self) -> ratatui::style::Color {
        match self {
            Severity::Info => C_TOAST_INFO,
            Severity::Success => C_TOAST_SUCCESS,
            Severity::Warning => C_TOAST_WARNING,
            Severity::Error => C_TOAST_ERROR,
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

/// A toast that stays up (animating) until resolved, e.g. "searching…".
struct Spinner {
    message: String,
    frame: usize,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
const MAX_VISIBLE: usize = 4;

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinner: Option<Spinner>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let message = message.into();
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > MAX_VISIBLE * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(5));
    }

    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some(Spinner {
            message: message.into(),
            frame: 0,
        });
    }

    pub fn dismiss_spinner(&mut self) {
        self.spinner = None;
    }

    pub fn has_spinner(&self) -> bool {
        self.spinner.is_some()
    }

    /// Drop expired toasts and advance the spinner.  Returns `true` when
    /// something on screen changed.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires > now);
        if let Some(s) = self.spinner.as_mut() {
            s.frame = (s.frame + 1) % SPINNER_FRAMES.len();
            return true;
        }
        before != self.toasts.len()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() || area.height < 2 {
            return;
        }
        let max_width = (area.width / 2).clamp(24, 60).min(area.width);
        let mut rows: Vec<(String, Style)> = Vec::new();

        if let Some(s) = &self.spinner {
            rows.push((
                format!(" {} {} ", SPINNER_FRAMES[s.frame], s.message),
                Style::default().fg(C_TOAST_INFO).add_modifier(Modifier::BOLD),
            ));
        }
        for toast in self.toasts.iter().rev().take(MAX_VISIBLE) {
            rows.push((
                format!(" {} {} ", toast.severity.icon(), toast.message),
                Style::default()
                    .fg(toast.severity.color())
                    .add_modifier(Modifier::BOLD),
            ));
        }

        for (i, (text, style)) in rows.into_iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let w = (text.width() as u16).min(max_width);
            let rect = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), rect);
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}
