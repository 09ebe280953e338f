//! Home component: landing page of `/web` on a wide terminal.

use euphonium_proto::protocol::PluginKind;
use ratatui::crossterm::event::KeyEvent;
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
    theme::{C_ACCENT, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::{pane_chrome::Pane, status_bar::connection_color},
};

pub struct Home;

impl Component for Home {
    fn id(&self) -> ComponentId {
        ComponentId::Content
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = Pane::new("home").slot('2').focused(focused).block();
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let plugin_summary = match &state.plugins {
            PluginList::Loading => "loading plugins…".to_string(),
            PluginList::Failed(e) => format!("plugin list unavailable: {}", e),
            PluginList::Loaded(_) => format!(
                "{} plugins, {} apps",
                state.plugins.of_kind(PluginKind::Plugin).count(),
                state.plugins.of_kind(PluginKind::App).count()
            ),
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  euphonium",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  device   ", Style::default().fg(C_MUTED)),
                Span::styled(state.device_url.clone(), Style::default().fg(C_PRIMARY)),
            ]),
            Line::from(vec![
                Span::styled("  events   ", Style::default().fg(C_MUTED)),
                Span::styled(
                    state.connection.label(),
                    Style::default().fg(connection_color(state.connection)),
                ),
            ]),
            Line::from(vec![
                Span::styled("  plugins  ", Style::default().fg(C_MUTED)),
                Span::styled(plugin_summary, Style::default().fg(C_SECONDARY)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  pick a plugin or app in the sidebar; ? lists every key",
                Style::default().fg(C_MUTED),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::DeviceClass;
    use crate::event_source::ConnectionState;
    use crate::test_support::{app_state, buffer_text};
    use euphonium_proto::protocol::PluginSummary;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_shows_device_and_connection() {
        let mut state = app_state(DeviceClass::Wide);
        state.connection = ConnectionState::Open;
        state.plugins = PluginList::Loaded(vec![PluginSummary {
            name: "cspot".into(),
            display_name: "Spotify".into(),
            kind: PluginKind::Plugin,
        }]);
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|f| Home.draw(f, f.area(), false, &state))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("http://euphonium.local"));
        assert!(text.contains("live"));
        assert!(text.contains("1 plugins, 0 apps"));
    }
}
