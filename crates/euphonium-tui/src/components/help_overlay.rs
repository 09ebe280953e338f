//! HelpOverlay component: centered popup listing the panel's keys.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PANEL_BORDER, C_POPOVER_BG, C_PRIMARY, C_SECONDARY},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "playback bar",
        &[
            ("← / →  or  - / +", "volume one step down / up"),
            ("home / end", "volume off / full"),
            ("e", "equalizer popover"),
            ("r", "refresh playback state"),
        ],
    ),
    (
        "navigation",
        &[
            ("↑ / ↓  or  j / k", "move selection"),
            ("enter", "open / edit / play"),
            ("tab / shift-tab", "focus next / previous pane"),
            ("1 / 2 / 3", "sidebar / content / playback bar"),
            ("esc / backspace", "back"),
            ("R", "reload plugin list"),
        ],
    ),
    (
        "plugin settings",
        &[
            ("space", "toggle checkbox"),
            ("← / →", "cycle option"),
            ("s", "save"),
        ],
    ),
    (
        "web radio",
        &[
            ("/", "search the directory"),
            ("f", "filter results"),
        ],
    ),
    (
        "panel",
        &[
            ("K / L", "keys bar / log panel"),
            ("?", "this help"),
            ("q / ctrl-c", "quit"),
        ],
    ),
];

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    fn lines() -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            " keyboard shortcuts",
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ))];
        for (title, rows) in SECTIONS {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" {}", title),
                Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
            )));
            lines.extend(rows.iter().map(|(key, desc)| help_row(key, desc)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " press ? or esc to close",
            Style::default().fg(C_MUTED),
        )));
        lines
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    /// Swallows every key while open.
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.toggle();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }
        let lines = Self::lines();
        let popup = centered_rect(56, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_PANEL_BORDER))
                    .style(Style::default().bg(C_POPOVER_BG)),
            ),
            popup,
        );
    }
}

fn help_row(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<20}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::DeviceClass;
    use crate::test_support::{app_state, buffer_text};
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::Terminal;

    #[test]
    fn test_toggle_and_close_keys() {
        let state = app_state(DeviceClass::Wide);
        let mut help = HelpOverlay::new();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert!(help.handle_key(esc, &state).is_empty());
        help.on_action(&Action::ToggleHelp, &state);
        assert!(help.visible);
        assert!(matches!(&help.handle_key(esc, &state)[..], [Action::ToggleHelp]));
    }

    #[test]
    fn test_renders_centered_when_visible() {
        let state = app_state(DeviceClass::Wide);
        let mut help = HelpOverlay::new();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|f| help.draw(f, f.area(), false, &state))
            .unwrap();
        assert!(!buffer_text(terminal.backend().buffer()).contains("keyboard shortcuts"));

        help.toggle();
        terminal
            .draw(|f| help.draw(f, f.area(), false, &state))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("keyboard shortcuts"));
        assert!(text.contains("equalizer popover"));
    }
}
