//! Pane chrome: border, title, focus slot and status badge of a panel.
//!
//! ```ignore
//! let block = Pane::new("web radio")
//!     .slot('2')
//!     .focused(focused)
//!     .badge(Some(Badge::busy("SEARCHING")))
//!     .block();
//! ```

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

use crate::theme::{
    style_focused_border, style_unfocused_border, C_ACCENT, C_CONNECTING, C_ERROR, C_MUTED,
    C_NUMBER_HINT, C_PLAYING, C_PRIMARY,
};

/// Short status shown top-right in the border ("LOADING", "SAVED", "12").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge<'a> {
    pub text: &'a str,
    tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    /// A request is in flight.
    Busy,
    Error,
    Done,
    /// Local changes not yet sent.
    Pending,
    Quiet,
}

impl<'a> Badge<'a> {
    pub fn busy(text: &'a str) -> Self {
        Self { text, tone: Tone::Busy }
    }

    pub fn error(text: &'a str) -> Self {
        Self { text, tone: Tone::Error }
    }

    pub fn done(text: &'a str) -> Self {
        Self { text, tone: Tone::Done }
    }

    pub fn pending(text: &'a str) -> Self {
        Self { text, tone: Tone::Pending }
    }

    pub fn quiet(text: &'a str) -> Self {
        Self { text, tone: Tone::Quiet }
    }

    pub fn color(&self) -> Color {
        match self.tone {
            Tone::Busy => C_CONNECTING,
            Tone::Error => C_ERROR,
            Tone::Done => C_PLAYING,
            Tone::Pending => C_ACCENT,
            Tone::Quiet => C_MUTED,
        }
    }
}

pub struct Pane<'a> {
    title: &'a str,
    slot: Option<char>,
    focused: bool,
    badge: Option<Badge<'a>>,
    borders: Borders,
}

impl<'a> Pane<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            slot: None,
            focused: false,
            badge: None,
            borders: Borders::ALL,
        }
    }

    /// Number key that focuses this pane.
    pub fn slot(mut self, key: char) -> Self {
        self.slot = Some(key);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn badge(mut self, badge: Option<Badge<'a>>) -> Self {
        self.badge = badge;
        self
    }

    /// Panes stacked against another one draw only the shared edge.
    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    pub fn block(self) -> Block<'a> {
        let (border_style, border_type, title_style) = if self.focused {
            (
                style_focused_border(),
                BorderType::Thick,
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                style_unfocused_border(),
                BorderType::Plain,
                Style::default().fg(C_MUTED),
            )
        };

        let mut title = Vec::with_capacity(3);
        if let Some(key) = self.slot {
            title.push(Span::styled(
                format!("{} ", key),
                Style::default().fg(C_NUMBER_HINT),
            ));
        }
        title.push(Span::styled(self.title, title_style));
        title.push(Span::raw(" "));

        let mut block = Block::default()
            .borders(self.borders)
            .border_type(border_type)
            .border_style(border_style)
            .title(Line::from(title));

        if let Some(badge) = self.badge {
            block = block.title_top(
                Line::from(Span::styled(
                    format!(" {} ", badge.text),
                    Style::default()
                        .fg(badge.color())
                        .add_modifier(Modifier::BOLD),
                ))
                .right_aligned(),
            );
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_title_slot_and_badge_are_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        terminal
            .draw(|f| {
                let block = Pane::new("web radio")
                    .slot('2')
                    .badge(Some(Badge::busy("SEARCHING")))
                    .block();
                f.render_widget(block, f.area());
            })
            .unwrap();
        let top = buffer_text(terminal.backend().buffer());
        let top = top.lines().next().unwrap_or_default().to_string();
        assert!(top.contains("2 web radio"), "{}", top);
        assert!(top.contains("SEARCHING"), "{}", top);
    }

    #[test]
    fn test_badge_tones() {
        assert_eq!(Badge::error("ERR").color(), C_ERROR);
        assert_eq!(Badge::done("SAVED").color(), C_PLAYING);
        assert_ne!(Badge::busy("x").color(), Badge::quiet("x").color());
    }
}
