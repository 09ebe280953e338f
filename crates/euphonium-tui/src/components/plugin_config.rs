//! PluginConfig component: settings page of one plugin (`/web/plugin/:name`).
//!
//! The App fetches and saves; this component keeps the working copy of the
//! fields and turns keys into edits.

use euphonium_proto::protocol::{ConfigField, FieldKind, PluginConfiguration};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        C_ACCENT, C_ERROR, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG, C_TAG,
    },
    widgets::{
        pane_chrome::{Badge, Pane},
        text_input::{InputAction, TextInput},
    },
};

const LABEL_WIDTH: usize = 22;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading(String),
    Loaded(PluginConfiguration),
    Failed { name: String, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SaveState {
    Clean,
    Modified,
    Saving,
    Saved,
}

pub struct PluginConfig {
    load: LoadState,
    save: SaveState,
    selected: usize,
    editor: TextInput,
    message: Option<(String, bool)>,
    inner: Rect,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self {
            load: LoadState::Idle,
            save: SaveState::Clean,
            selected: 0,
            editor: TextInput::new("›", ""),
            message: None,
            inner: Rect::default(),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Name of the plugin shown (or being fetched).
    pub fn plugin_name(&self) -> Option<&str> {
        match &self.load {
            LoadState::Idle => None,
            LoadState::Loading(name) => Some(name),
            LoadState::Loaded(config) => Some(&config.name),
            LoadState::Failed { name, .. } => Some(name),
        }
    }

    pub fn configuration(&self) -> Option<&PluginConfiguration> {
        match &self.load {
            LoadState::Loaded(config) => Some(config),
            _ => None,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.save == SaveState::Modified
    }

    pub fn begin_loading(&mut self, name: &str) {
        self.load = LoadState::Loading(name.to_string());
        self.save = SaveState::Clean;
        self.selected = 0;
        self.message = None;
        self.editor.deactivate();
    }

    /// Install a fetched configuration.  Results for a plugin other than
    /// the one being loaded are dropped.
    pub fn on_loaded(&mut self, name: &str, result: Result<PluginConfiguration, String>) -> bool {
        if self.load != LoadState::Loading(name.to_string()) {
            return false;
        }
        self.load = match result {
            Ok(config) => LoadState::Loaded(config),
            Err(error) => LoadState::Failed {
                name: name.to_string(),
                error,
            },
        };
        true
    }

    pub fn on_saved(&mut self, name: &str, result: Result<(), String>) -> bool {
        if self.plugin_name() != Some(name) || self.save != SaveState::Saving {
            return false;
        }
        match result {
            Ok(()) => {
                self.save = SaveState::Saved;
                self.message = None;
            }
            Err(e) => {
                self.save = SaveState::Modified;
                self.message = Some((format!("save failed: {}", e), true));
            }
        }
        true
    }

    fn field_mut(&mut self) -> Option<&mut ConfigField> {
        match &mut self.load {
            LoadState::Loaded(config) => config.fields.get_mut(self.selected),
            _ => None,
        }
    }

    fn field_count(&self) -> usize {
        self.configuration().map_or(0, |c| c.fields.len())
    }

    fn mark_modified(&mut self) {
        self.save = SaveState::Modified;
        self.message = None;
    }

    fn edit_selected(&mut self) {
        let Some(field) = self.field_mut() else {
            return;
        };
        match field.kind {
            FieldKind::Text | FieldKind::Number => {
                let value = field.display_value();
                self.editor.activate_with(&value);
            }
            FieldKind::Checkbox => {
                field.toggle();
                self.mark_modified();
            }
            FieldKind::Select { .. } => {
                field.cycle(true);
                self.mark_modified();
            }
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match self.editor.handle_key(key) {
            InputAction::Submitted(text) => {
                let Some(field) = self.field_mut() else {
                    return;
                };
                let label = field.label().to_string();
                if field.set_from_text(&text) {
                    self.mark_modified();
                } else {
                    self.message = Some((format!("{}: {:?} is not a number", label, text), true));
                }
            }
            InputAction::Changed(_) | InputAction::Cancelled => {}
        }
    }

    fn badge(&self) -> Option<Badge<'static>> {
        match (&self.load, self.save) {
            (LoadState::Loading(_), _) => Some(Badge::busy("LOADING")),
            (LoadState::Failed { .. }, _) => Some(Badge::error("ERR")),
            (_, SaveState::Saving) => Some(Badge::busy("SAVING")),
            (_, SaveState::Saved) => Some(Badge::done("SAVED")),
            (_, SaveState::Modified) => Some(Badge::pending("MODIFIED")),
            _ => None,
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn value_spans(field: &ConfigField) -> Vec<Span<'static>> {
    match &field.kind {
        FieldKind::Checkbox => {
            let on = field.value.as_bool().unwrap_or(false);
            vec![Span::styled(
                if on { "[x]" } else { "[ ]" },
                Style::default().fg(if on { C_PLAYING } else { C_MUTED }),
            )]
        }
        FieldKind::Select { .. } => vec![
            Span::styled("‹ ", Style::default().fg(C_MUTED)),
            Span::styled(field.display_value(), Style::default().fg(C_TAG)),
            Span::styled(" ›", Style::default().fg(C_MUTED)),
        ],
        FieldKind::Text | FieldKind::Number => {
            let value = field.display_value();
            if value.is_empty() {
                vec![Span::styled("(empty)", Style::default().fg(C_MUTED))]
            } else {
                vec![Span::styled(value, Style::default().fg(C_PRIMARY))]
            }
        }
    }
}

fn padded_label(label: &str) -> String {
    let width = label.width();
    if width >= LABEL_WIDTH {
        let mut out: String = label.chars().take(LABEL_WIDTH - 1).collect();
        out.push('…');
        out
    } else {
        format!("{}{}", label, " ".repeat(LABEL_WIDTH - width))
    }
}

impl Component for PluginConfig {
    fn id(&self) -> ComponentId {
        ComponentId::Content
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.editor.is_active() {
            self.handle_editor_key(key);
            return vec![];
        }
        if let KeyCode::Char('r') = key.code {
            return match self.plugin_name() {
                Some(name) => vec![Action::LoadPluginConfig(name.to_string())],
                None => vec![],
            };
        }

        let count = self.field_count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.edit_selected(),
            KeyCode::Char(' ') => {
                if self.field_mut().is_some_and(|f| f.toggle()) {
                    self.mark_modified();
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.field_mut().is_some_and(|f| f.cycle(false)) {
                    self.mark_modified();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.field_mut().is_some_and(|f| f.cycle(true)) {
                    self.mark_modified();
                }
            }
            KeyCode::Char('s') => {
                if let Some(config) = self.configuration().cloned() {
                    self.save = SaveState::Saving;
                    self.message = None;
                    return vec![Action::SavePluginConfig(config)];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if self.editor.is_active() {
            return vec![];
        }
        if let MouseEventKind::Down(MouseButton::Left) = event.kind {
            if event.row >= self.inner.y {
                let row = (event.row - self.inner.y) as usize;
                if row < self.field_count() {
                    if self.selected == row {
                        self.edit_selected();
                    }
                    self.selected = row;
                }
            }
        }
        vec![]
    }

    fn captures_input(&self) -> bool {
        self.editor.is_active()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let title = match &self.load {
            LoadState::Loaded(config) if !config.display_name.is_empty() => {
                config.display_name.clone()
            }
            _ => self.plugin_name().unwrap_or("plugin").to_string(),
        };
        let block = Pane::new(&title)
            .slot('2')
            .focused(focused)
            .badge(self.badge())
            .block();
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.inner = inner;
        if inner.height == 0 {
            return;
        }

        let config = match &self.load {
            LoadState::Idle => return,
            LoadState::Loading(name) => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("  loading {} settings…", name),
                        Style::default().fg(C_MUTED),
                    )),
                    inner,
                );
                return;
            }
            LoadState::Failed { error, .. } => {
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            "  could not load settings",
                            Style::default().fg(C_ERROR),
                        )),
                        Line::from(Span::styled(format!("  {}", error), Style::default().fg(C_MUTED))),
                        Line::from(Span::styled("  r to retry", Style::default().fg(C_MUTED))),
                    ]),
                    inner,
                );
                return;
            }
            LoadState::Loaded(config) => config,
        };

        if config.fields.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  this plugin has no settings",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let list_height = inner.height.saturating_sub(1) as usize;
        let offset = (self.selected + 1).saturating_sub(list_height.max(1));
        let mut lines: Vec<Line> = config
            .fields
            .iter()
            .enumerate()
            .skip(offset)
            .take(list_height.max(1))
            .map(|(i, field)| {
                let is_selected = i == self.selected;
                let label_style = if is_selected {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                let mut spans = vec![
                    Span::styled(if is_selected { " ▸ " } else { "   " }, Style::default().fg(C_ACCENT)),
                    Span::styled(padded_label(field.label()), label_style),
                ];
                if !(is_selected && self.editor.is_active()) {
                    spans.extend(value_spans(field));
                }
                let line = Line::from(spans);
                if is_selected && focused {
                    line.style(Style::default().bg(C_SELECTION_BG))
                } else {
                    line
                }
            })
            .collect();

        if let Some((message, is_error)) = &self.message {
            lines.push(Line::from(Span::styled(
                format!("  {}", message),
                Style::default().fg(if *is_error { C_ERROR } else { C_MUTED }),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);

        if self.editor.is_active() {
            let row = self.selected - offset;
            let x_offset = (3 + LABEL_WIDTH) as u16;
            let editor_area = Rect {
                x: inner.x + x_offset.min(inner.width),
                y: inner.y + row as u16,
                width: inner.width.saturating_sub(x_offset),
                height: 1,
            };
            self.editor.draw(frame, editor_area);
        }
    }
}
