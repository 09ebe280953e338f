//! TextInput: single-line tui-input field used for the station search box
//! and for editing plugin settings in place.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED};

pub enum InputAction {
    Changed(String),
    /// Enter pressed; carries the final text.
    Submitted(String),
    Cancelled,
}

pub struct TextInput {
    input: Input,
    active: bool,
    prompt: &'static str,
    placeholder: String,
}

impl TextInput {
    pub fn new(prompt: &'static str, placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            prompt,
            placeholder: placeholder.into(),
        }
    }

    /// Start editing, optionally seeded with `value`.
    pub fn activate_with(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
        self.active = true;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Esc with text clears it; Esc on an empty field closes it.
    /// Enter closes the field and hands back its text.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input.reset();
                    InputAction::Changed(String::new())
                } else {
                    self.deactivate();
                    InputAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.deactivate();
                InputAction::Submitted(self.input.value().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                InputAction::Changed(self.input.value().to_string())
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let prefix_w = self.prompt.chars().count() + 1;
        let scroll = self
            .input
            .visual_scroll((area.width as usize).saturating_sub(prefix_w + 1));
        let value = self.input.value();
        let body = if value.is_empty() && !self.active {
            Span::styled(
                format!("{} {}", self.prompt, self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(
                format!("{} {}", self.prompt, visible),
                Style::default().fg(C_INPUT_FG),
            )
        };

        frame.render_widget(
            Paragraph::new(Line::from(body)).style(Style::default().bg(C_INPUT_BG)),
            area,
        );

        if self.active {
            let cursor = (self.input.visual_cursor().saturating_sub(scroll) + prefix_w) as u16;
            let x = (area.x + cursor).min(area.x + area.width - 1);
            frame.set_cursor_position((x, area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_submit() {
        let mut input = TextInput::new("/", "search");
        input.activate();
        for c in "fip".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(input.text(), "fip");
        match input.handle_key(key(KeyCode::Enter)) {
            InputAction::Submitted(text) => assert_eq!(text, "fip"),
            _ => panic!("expected submit"),
        }
        assert!(!input.is_active());
    }

    #[test]
    fn test_escape_clears_then_cancels() {
        let mut input = TextInput::new(">", "");
        input.activate_with("320");
        assert!(matches!(
            input.handle_key(key(KeyCode::Esc)),
            InputAction::Changed(ref t) if t.is_empty()
        ));
        assert!(input.is_active());
        assert!(matches!(input.handle_key(key(KeyCode::Esc)), InputAction::Cancelled));
        assert!(!input.is_active());
    }
}
