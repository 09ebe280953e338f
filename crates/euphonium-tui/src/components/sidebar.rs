//! Sidebar component: plugins and apps reported by the device.
//!
//! Always visible at the left of a wide terminal.  On a compact terminal it
//! is the content of the `/web` route instead.

use euphonium_proto::protocol::{PluginKind, PluginSummary};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, PluginList},
    component::Component,
    route::Route,
    theme::{C_ACCENT, C_ERROR, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::pane_chrome::{Badge, Pane},
};

/// One drawn row: a section header or an entry index.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Row {
    Header(PluginKind),
    Entry(usize),
}

pub struct Sidebar {
    selected: usize,
    scroll_offset: usize,
    /// Rows of the last draw, for mouse hit-testing.
    drawn: Vec<Row>,
    inner: Rect,
}

/// Plugins first, then apps, in the order the device listed them.
pub fn ordered_entries(plugins: &PluginList) -> Vec<&PluginSummary> {
    plugins
        .of_kind(PluginKind::Plugin)
        .chain(plugins.of_kind(PluginKind::App))
        .collect()
}

pub fn route_for(entry: &PluginSummary) -> Route {
    match entry.kind {
        PluginKind::Plugin => Route::Plugin(entry.name.clone()),
        PluginKind::App => Route::for_app(&entry.name),
    }
}

fn header_label(kind: PluginKind) -> &'static str {
    match kind {
        PluginKind::Plugin => "PLUGINS",
        PluginKind::App => "APPS",
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            drawn: Vec::new(),
            inner: Rect::default(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry<'a>(&self, state: &'a AppState) -> Option<&'a PluginSummary> {
        ordered_entries(&state.plugins).get(self.selected).copied()
    }

    fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn rows(entries: &[&PluginSummary]) -> Vec<Row> {
        let mut rows = Vec::with_capacity(entries.len() + 2);
        let mut last_kind = None;
        for (i, entry) in entries.iter().enumerate() {
            if last_kind != Some(entry.kind) {
                rows.push(Row::Header(entry.kind));
                last_kind = Some(entry.kind);
            }
            rows.push(Row::Entry(i));
        }
        rows
    }

    fn open_selected(&self, state: &AppState) -> Vec<Action> {
        match self.selected_entry(state) {
            Some(entry) => vec![Action::Navigate(route_for(entry))],
            None => vec![],
        }
    }
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Sidebar {
    fn id(&self) -> ComponentId {
        ComponentId::Sidebar
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let len = ordered_entries(&state.plugins).len();
        self.clamp(len);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected = len.saturating_sub(1),
            KeyCode::Enter | KeyCode::Right => return self.open_selected(state),
            KeyCode::Char('R') => return vec![Action::ReloadPlugins],
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.selected = self.selected.saturating_sub(1);
            }
            MouseEventKind::ScrollDown => {
                let len = ordered_entries(&state.plugins).len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if event.row < self.inner.y || event.row >= self.inner.y + self.inner.height {
                    return vec![];
                }
                let row = self.scroll_offset + (event.row - self.inner.y) as usize;
                if let Some(Row::Entry(i)) = self.drawn.get(row) {
                    self.selected = *i;
                    return self.open_selected(state);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        // Keep the highlight on whatever the router landed on.
        if let Action::Navigate(route) = action {
            if let Some(i) = ordered_entries(&state.plugins)
                .iter()
                .position(|e| &route_for(e) == route && *route != Route::Home)
            {
                self.selected = i;
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = match &state.plugins {
            PluginList::Loading => Some(Badge::busy("LOADING")),
            PluginList::Failed(_) => Some(Badge::error("ERR")),
            PluginList::Loaded(_) => None,
        };
        let block = Pane::new("euphonium")
            .slot('1')
            .focused(focused)
            .badge(badge)
            .block();
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.inner = inner;
        self.drawn.clear();

        match &state.plugins {
            PluginList::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled("  loading plugins…", Style::default().fg(C_MUTED))),
                    inner,
                );
                return;
            }
            PluginList::Failed(e) => {
                let lines = vec![
                    Line::from(Span::styled("  plugins unavailable", Style::default().fg(C_ERROR))),
                    Line::from(Span::styled(format!("  {}", e), Style::default().fg(C_MUTED))),
                    Line::from(Span::styled("  R to retry", Style::default().fg(C_MUTED))),
                ];
                frame.render_widget(Paragraph::new(lines), inner);
                return;
            }
            PluginList::Loaded(_) => {}
        }

        let entries = ordered_entries(&state.plugins);
        if entries.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no plugins reported", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }
        self.clamp(entries.len());
        self.drawn = Self::rows(&entries);

        let height = inner.height as usize;
        let selected_row = self
            .drawn
            .iter()
            .position(|r| *r == Row::Entry(self.selected))
            .unwrap_or(0);
        if selected_row < self.scroll_offset {
            // Show the section header along with its first entry.
            self.scroll_offset = selected_row.saturating_sub(1);
        } else if height > 0 && selected_row >= self.scroll_offset + height {
            self.scroll_offset = selected_row + 1 - height;
        }

        let current = state.route();
        let lines: Vec<Line> = self
            .drawn
            .iter()
            .skip(self.scroll_offset)
            .take(height)
            .map(|row| match row {
                Row::Header(kind) => Line::from(Span::styled(
                    format!(" {}", header_label(*kind)),
                    Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
                )),
                Row::Entry(i) => {
                    let entry = entries[*i];
                    let is_selected = *i == self.selected;
                    let is_current = &route_for(entry) == current && *current != Route::Home;
                    let marker = if is_current { "▸ " } else { "  " };
                    let name_style = if is_current {
                        Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
                    } else if is_selected {
                        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(C_SECONDARY)
                    };
                    let line = Line::from(vec![
                        Span::styled(format!(" {}", marker), Style::default().fg(C_PLAYING)),
                        Span::styled(entry.label().to_string(), name_style),
                    ]);
                    if is_selected && focused {
                        line.style(Style::default().bg(C_SELECTION_BG))
                    } else {
                        line
                    }
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::DeviceClass;
    use crate::test_support::{app_state, buffer_text};
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn summary(name: &str, display: &str, kind: PluginKind) -> PluginSummary {
        PluginSummary {
            name: name.into(),
            display_name: display.into(),
            kind,
        }
    }

    fn loaded_state() -> AppState {
        let mut state = app_state(DeviceClass::Wide);
        state.plugins = PluginList::Loaded(vec![
            summary("webradio", "Web Radio", PluginKind::App),
            summary("cspot", "Spotify", PluginKind::Plugin),
            summary("bluetooth", "Bluetooth", PluginKind::Plugin),
        ]);
        state
    }

    fn render(sidebar: &mut Sidebar, state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(26, 10)).unwrap();
        terminal
            .draw(|f| sidebar.draw(f, f.area(), true, state))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_plugins_listed_before_apps() {
        let state = loaded_state();
        let names: Vec<_> = ordered_entries(&state.plugins)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["cspot", "bluetooth", "webradio"]);
    }

    #[test]
    fn test_enter_navigates_to_entry_route() {
        let state = loaded_state();
        let mut sidebar = Sidebar::new();
        let actions = sidebar.handle_key(key(KeyCode::Enter), &state);
        assert!(matches!(&actions[..], [Action::Navigate(Route::Plugin(n))] if n == "cspot"));

        sidebar.handle_key(key(KeyCode::Down), &state);
        sidebar.handle_key(key(KeyCode::Down), &state);
        sidebar.handle_key(key(KeyCode::Down), &state);
        assert_eq!(sidebar.selected(), 2);
        let actions = sidebar.handle_key(key(KeyCode::Enter), &state);
        assert!(matches!(&actions[..], [Action::Navigate(Route::WebRadio)]));
    }

    #[test]
    fn test_reload_key() {
        let state = loaded_state();
        let mut sidebar = Sidebar::new();
        let actions = sidebar.handle_key(key(KeyCode::Char('R')), &state);
        assert!(matches!(&actions[..], [Action::ReloadPlugins]));
    }

    #[test]
    fn test_sections_rendered_with_headers() {
        let state = loaded_state();
        let mut sidebar = Sidebar::new();
        let text = render(&mut sidebar, &state);
        let plugins = text.find("PLUGINS").expect("plugins header");
        let spotify = text.find("Spotify").expect("spotify entry");
        let apps = text.find("APPS").expect("apps header");
        let radio = text.find("Web Radio").expect("radio entry");
        assert!(plugins < spotify && spotify < apps && apps < radio);
    }

    #[test]
    fn test_loading_and_failed_states() {
        let mut state = app_state(DeviceClass::Wide);
        let mut sidebar = Sidebar::new();
        assert!(render(&mut sidebar, &state).contains("loading plugins"));
        state.plugins = PluginList::Failed("connection refused".into());
        let text = render(&mut sidebar, &state);
        assert!(text.contains("plugins unavailable"));
        assert!(text.contains("connection refused"));
        assert!(sidebar.handle_key(key(KeyCode::Enter), &state).is_empty());
    }

    #[test]
    fn test_click_opens_entry() {
        let state = loaded_state();
        let mut sidebar = Sidebar::new();
        render(&mut sidebar, &state);
        // Border row 0, PLUGINS row 1, Spotify 2, Bluetooth 3, APPS 4, Web Radio 5.
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        let actions = sidebar.handle_mouse(click, Rect::new(0, 0, 26, 10), &state);
        assert!(matches!(&actions[..], [Action::Navigate(Route::WebRadio)]));
        assert_eq!(sidebar.selected(), 2);

        let header = MouseEvent { row: 4, ..click };
        assert!(sidebar
            .handle_mouse(header, Rect::new(0, 0, 26, 10), &state)
            .is_empty());
    }
}
