//! WebRadio component: the radio browser app (`/web/apps/webradio`).
//!
//! `/` searches the radio directory, `f` filters the results locally and
//! Enter hands the selected station to the device.

use euphonium_proto::protocol::{RadioStation, WebRadioCommand};
use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        C_ERROR, C_LOCATION, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG, C_TAG,
    },
    widgets::{
        pane_chrome::{Badge, Pane},
        scrollable_list::ScrollableList,
        text_input::{InputAction, TextInput},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching(String),
    Done(String),
    Failed { query: String, error: String },
}

pub struct WebRadio {
    pub list: ScrollableList<RadioStation>,
    search: TextInput,
    filter: TextInput,
    search_state: SearchState,
    /// Name of the last station sent to the device.
    playing: Option<String>,
    list_area: Rect,
    count_label: String,
}

fn station_matches(station: &RadioStation, q: &str) -> bool {
    if q.trim().is_empty() {
        return true;
    }
    let text = format!(
        "{} {} {}",
        station.name.to_lowercase(),
        station.country.to_lowercase(),
        station.tags.to_lowercase()
    );
    q.to_lowercase()
        .split_whitespace()
        .all(|term| text.contains(term))
}

impl WebRadio {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(station_matches),
            search: TextInput::new("/", "search the radio directory…"),
            filter: TextInput::new("filter:", "name, country, tags…"),
            search_state: SearchState::Idle,
            playing: None,
            list_area: Rect::default(),
            count_label: String::new(),
        }
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search_state
    }

    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    /// Install search results.  A result for a query other than the one
    /// in flight is dropped.
    pub fn on_results(&mut self, query: &str, result: Result<Vec<RadioStation>, String>) -> bool {
        if self.search_state != SearchState::Searching(query.to_string()) {
            return false;
        }
        match result {
            Ok(stations) => {
                self.list.set_items(stations);
                self.list.set_filter(self.filter.text());
                self.search_state = SearchState::Done(query.to_string());
            }
            Err(error) => {
                self.search_state = SearchState::Failed {
                    query: query.to_string(),
                    error,
                };
            }
        }
        true
    }

    fn play_selected(&mut self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(station) => {
                self.playing = Some(station.name.clone());
                vec![Action::PlayStation(WebRadioCommand::from(station))]
            }
            None => vec![],
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Up => {
                self.list.select_up(1);
                return vec![];
            }
            KeyCode::Down => {
                self.list.select_down(1);
                return vec![];
            }
            _ => {}
        }
        match self.search.handle_key(key) {
            InputAction::Submitted(query) => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    return vec![Action::CloseInput];
                }
                self.search_state = SearchState::Searching(query.clone());
                vec![Action::CloseInput, Action::SearchStations(query)]
            }
            InputAction::Cancelled => vec![Action::CloseInput],
            InputAction::Changed(_) => vec![],
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match self.filter.handle_key(key) {
            InputAction::Changed(q) => {
                self.list.set_filter(&q);
                vec![]
            }
            InputAction::Submitted(_) => vec![Action::CloseInput],
            InputAction::Cancelled => {
                self.list.set_filter("");
                vec![Action::CloseInput]
            }
        }
    }

    fn station_line(&self, station: &RadioStation, is_selected: bool, focused: bool) -> Line<'static> {
        let is_playing = self.playing.as_deref() == Some(station.name.as_str());
        let name_style = if is_playing {
            Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        let mut spans = vec![
            Span::styled(if is_playing { " ▶ " } else { "   " }, Style::default().fg(C_PLAYING)),
            Span::styled(station.name.trim().to_string(), name_style),
        ];
        if !station.country.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(station.country.clone(), Style::default().fg(C_LOCATION)));
        }
        let format = match (station.codec.is_empty(), station.bitrate) {
            (true, 0) => String::new(),
            (false, 0) => station.codec.to_lowercase(),
            (true, kbps) => format!("{} kbps", kbps),
            (false, kbps) => format!("{} {} kbps", station.codec.to_lowercase(), kbps),
        };
        if !format.is_empty() {
            spans.push(Span::styled(format!("  {}", format), Style::default().fg(C_MUTED)));
        }
        if is_selected {
            for (i, tag) in station.tag_list().take(4).enumerate() {
                spans.push(Span::styled(
                    if i == 0 { "  " } else { " · " },
                    Style::default().fg(C_MUTED),
                ));
                spans.push(Span::styled(tag.to_string(), Style::default().fg(C_TAG)));
            }
        }
        let line = Line::from(spans);
        if is_selected && focused {
            line.style(Style::default().bg(C_SELECTION_BG))
        } else {
            line
        }
    }
}

impl Default for WebRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for WebRadio {
    fn id(&self) -> ComponentId {
        ComponentId::Content
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.search.is_active() {
            return self.handle_search_key(key);
        }
        if self.filter.is_active() {
            return self.handle_filter_key(key);
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Char('/') => {
                self.search.activate();
                return vec![Action::OpenInput];
            }
            KeyCode::Char('f') => {
                self.filter.activate();
                return vec![Action::OpenInput];
            }
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.play_selected(),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let area = self.list_area;
                if event.row < area.y || event.row >= area.y + area.height {
                    return vec![];
                }
                let row = (event.row - area.y) as usize;
                let before = self.list.selected();
                if self.list.handle_click(row) && self.list.selected() == before {
                    // Second click on the same row plays it.
                    return self.play_selected();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn captures_input(&self) -> bool {
        self.search.is_active() || self.filter.is_active()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let badge = match &self.search_state {
            SearchState::Searching(_) => Some(Badge::busy("SEARCHING")),
            SearchState::Failed { .. } => Some(Badge::error("ERR")),
            SearchState::Done(_) => {
                self.count_label = if self.list.filter().is_empty() {
                    format!("{}", self.list.total_len())
                } else {
                    format!("{}/{}", self.list.len(), self.list.total_len())
                };
                Some(Badge::quiet(&self.count_label))
            }
            SearchState::Idle => None,
        };
        let block = Pane::new("web radio")
            .slot('2')
            .focused(focused)
            .badge(badge)
            .block();
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 2 {
            return;
        }

        let search_area = Rect { height: 1, ..inner };
        self.search.draw(frame, search_area);

        let show_filter = self.filter.is_active() || !self.list.filter().is_empty();
        let list_height = inner.height - 1 - u16::from(show_filter);
        let list_area = Rect {
            y: inner.y + 1,
            height: list_height,
            ..inner
        };
        self.list_area = list_area;

        let message = match &self.search_state {
            SearchState::Idle => Some(("  press / to search stations by name".to_string(), C_MUTED)),
            SearchState::Searching(q) if self.list.total_len() == 0 => {
                Some((format!("  searching for {:?}…", q), C_MUTED))
            }
            SearchState::Failed { query, error } => {
                Some((format!("  search for {:?} failed: {}", query, error), C_ERROR))
            }
            SearchState::Done(q) if self.list.total_len() == 0 => {
                Some((format!("  no stations found for {:?}", q), C_MUTED))
            }
            _ if self.list.is_empty() => Some(("  no stations match filter".to_string(), C_MUTED)),
            _ => None,
        };

        if let Some((text, color)) = message {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(color))),
                list_area,
            );
        } else {
            let height = list_area.height as usize;
            self.list.ensure_visible(height);
            let selected = self.list.selected();
            let lines: Vec<Line> = self
                .list
                .visible_items(height)
                .into_iter()
                .map(|(pos, station)| self.station_line(station, pos == selected, focused))
                .collect();
            frame.render_widget(Paragraph::new(lines), list_area);
        }

        if show_filter {
            let filter_area = Rect {
                y: inner.y + inner.height - 1,
                height: 1,
                ..inner
            };
            self.filter.draw(frame, filter_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::DeviceClass;
    use crate::test_support::{app_state, buffer_text};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn station(name: &str, country: &str, tags: &str) -> RadioStation {
        RadioStation {
            name: name.into(),
            url_resolved: format!("http://streams.example/{}", name.to_lowercase()),
            country: country.into(),
            codec: "MP3".into(),
            bitrate: 128,
            tags: tags.into(),
            ..Default::default()
        }
    }

    fn searched(radio: &mut WebRadio, state: &AppState, query: &str) -> Vec<Action> {
        radio.handle_key(key(KeyCode::Char('/')), state);
        // The box keeps the previous query for editing.
        radio.search.clear();
        for c in query.chars() {
            radio.handle_key(key(KeyCode::Char(c)), state);
        }
        radio.handle_key(key(KeyCode::Enter), state)
    }

    fn results() -> Vec<RadioStation> {
        vec![
            station("FIP", "France", "jazz,eclectic"),
            station("FIP Rock", "France", "rock"),
            station("KEXP", "United States", "indie,rock"),
        ]
    }

    #[test]
    fn test_submit_search() {
        let state = app_state(DeviceClass::Wide);
        let mut radio = WebRadio::new();
        let actions = searched(&mut radio, &state, "fip");
        assert!(matches!(&actions[..], [Action::CloseInput, Action::SearchStations(q)] if q == "fip"));
        assert_eq!(radio.search_state(), &SearchState::Searching("fip".into()));
        assert!(!radio.captures_input());
    }

    #[test]
    fn test_blank_search_is_not_sent() {
        let state = app_state(DeviceClass::Wide);
        let mut radio = WebRadio::new();
        let actions = searched(&mut radio, &state, "  ");
        assert!(matches!(&actions[..], [Action::CloseInput]));
        assert_eq!(radio.search_state(), &SearchState::Idle);
    }

    #[test]
    fn test_results_for_old_query_dropped() {
        let state = app_state(DeviceClass::Wide);
        let mut radio = WebRadio::new();
        searched(&mut radio, &state, "fip");
        assert!(!radio.on_results("kexp", Ok(results())));
        assert!(radio.list.is_empty());
        assert!(radio.on_results("fip", Ok(results())));
        assert_eq!(radio.list.len(), 3);
    }

    #[test]
    fn test_enter_plays_selected_station() {
        let state = app_state(DeviceClass::Wide);
        let mut radio = WebRadio::new();
        searched(&mut radio, &state, "fip");
        radio.on_results("fip", Ok(results()));
        radio.handle_key(key(KeyCode::Down), &state);
        let actions = radio.handle_key(key(KeyCode::Enter), &state);
        match &actions[..] {
            [Action::PlayStation(cmd)] => {
                assert_eq!(cmd.station_name, "FIP Rock");
                assert_eq!(cmd.station_url, "http://streams.example/fip rock");
                assert_eq!(cmd.codec, "mp3");
            }
            other => panic!("unexpected actions {:?}", other),
        }
        assert_eq!(radio.playing(), Some("FIP Rock"));
    }

    #[test]
    fn test_local_filter_over_country_and_tags() {
        let state = app_state(DeviceClass::Wide);
        let mut radio = WebRadio::new();
        searched(&mut radio, &state, "a");
        radio.on_results("a", Ok(results()));
        radio.handle_key(key(KeyCode::Char('f')), &state);
        assert!(radio.captures_input());
        for c in "rock".chars() {
            radio.handle_key(key(KeyCode::Char(c)), &state);
        }
        assert_eq!(radio.list.len(), 2);
        for c in " states".chars() {
            radio.handle_key(key(KeyCode::Char(c)), &state);
        }
        assert_eq!(radio.list.len(), 1);
        assert_eq!(radio.list.selected_item().map(|s| s.name.as_str()), Some("KEXP"));
        radio.handle_key(key(KeyCode::Esc), &state);
        radio.handle_key(key(KeyCode::Esc), &state);
        assert_eq!(radio.list.len(), 3);
        assert!(!radio.captures_input());
    }

    #[test]
    fn test_renders_states() {
        let state = app_state(DeviceClass::Wide);
        let mut radio = WebRadio::new();
        let mut terminal = Terminal::new(TestBackend::new(70, 8)).unwrap();
        let mut render = |radio: &mut WebRadio| {
            terminal
                .draw(|f| radio.draw(f, f.area(), true, &state))
                .unwrap();
            buffer_text(terminal.backend().buffer())
        };
        assert!(render(&mut radio).contains("press / to search"));

        searched(&mut radio, &state, "fip");
        radio.on_results("fip", Err("HTTP 502".into()));
        assert!(render(&mut radio).contains("failed: HTTP 502"));

        searched(&mut radio, &state, "fip");
        radio.on_results("fip", Ok(results()));
        let text = render(&mut radio);
        assert!(text.contains("KEXP"));
        assert!(text.contains("mp3 128 kbps"));
        assert!(text.contains("eclectic"), "tags of the selected row are shown");
    }
}
