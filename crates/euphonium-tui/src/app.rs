//! App: component-based event loop of the control panel.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - Background tasks (terminal input, HTTP requests) post `AppMessage`s into
//!   one `tokio::mpsc` channel; the playback view-model has its own channel
//!   of `PlaybackUpdate`s.  The loop is the only writer of `AppState`.
//! - Components return `Vec<Action>`; App dispatches each Action and performs
//!   the I/O it asks for on spawned tasks.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use euphonium_proto::protocol::{
    PluginConfiguration, PluginSummary, RadioStation, WebRadioCommand,
};
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    action::{Action, ComponentId},
    api::ApiClient,
    app_state::{AppState, DeviceClass, PluginList},
    component::Component,
    components::{
        help_overlay::HelpOverlay,
        home::Home,
        log_panel::{self, LogPanel},
        playback_bar::{PlaybackBar, BAR_HEIGHT},
        plugin_config::PluginConfig,
        sidebar::Sidebar,
        web_radio::WebRadio,
    },
    event_source::EventSource,
    playback::{Applied, PlaybackUpdate, PlaybackViewModel},
    radio_directory::RadioDirectory,
    route::{Route, Router},
    shell::Shell,
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

const SIDEBAR_WIDTH: u16 = 26;
const LOG_PANEL_HEIGHT: u16 = 10;
const LOG_TAIL_LINES: usize = 500;

// ── Internal event bus ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    PluginsLoaded(Result<Vec<PluginSummary>, String>),
    PluginConfigLoaded {
        name: String,
        result: Result<PluginConfiguration, String>,
    },
    PluginSaved {
        name: String,
        result: Result<(), String>,
    },
    StationsFound {
        query: String,
        result: Result<Vec<RadioStation>, String>,
    },
    StationPlayed {
        name: String,
        result: Result<(), String>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    sidebar: Rect,
    content: Rect,
    playback_bar: Rect,
    log_panel: Rect,
}

/// Everything `App::new` needs from the outside world.
pub struct AppContext {
    pub api: ApiClient,
    pub radio: RadioDirectory,
    pub events: EventSource,
    pub start_route: Route,
    pub log_path: PathBuf,
    pub compact_width: u16,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Remotes ───────────────────────────────────────────────────────────────
    api: ApiClient,
    radio: RadioDirectory,
    events: EventSource,

    // ── Components ────────────────────────────────────────────────────────────
    sidebar: Sidebar,
    home: Home,
    plugin_config: PluginConfig,
    web_radio: WebRadio,
    playback_bar: PlaybackBar,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,

    // ── Layout ────────────────────────────────────────────────────────────────
    shell: Shell,
    /// Last-drawn layout rects: used for mouse hit-testing.
    pane_areas: PaneAreas,
    toast: ToastManager,

    // ── Channels ──────────────────────────────────────────────────────────────
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    playback_rx: Option<mpsc::Receiver<PlaybackUpdate>>,

    should_quit: bool,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let (playback_tx, playback_rx) = mpsc::channel::<PlaybackUpdate>(256);

        let class = DeviceClass::Wide;
        let state = AppState {
            device_url: ctx.api.service().base_url.clone(),
            connection: ctx.events.current_state(),
            playback: PlaybackViewModel::new(playback_tx),
            plugins: PluginList::Loading,
            device_class: class,
            compact_width: ctx.compact_width,
            router: Router::new(ctx.start_route.clone()),
            input_mode: InputMode::Normal,
            log_path: ctx.log_path,
            log_lines: Vec::new(),
        };

        Self {
            shell: Shell::new(&ctx.start_route, class),
            state,
            api: ctx.api,
            radio: ctx.radio,
            events: ctx.events,
            sidebar: Sidebar::new(),
            home: Home,
            plugin_config: PluginConfig::new(),
            web_radio: WebRadio::new(),
            playback_bar: PlaybackBar::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            pane_areas: PaneAreas::default(),
            toast: ToastManager::new(),
            tx,
            rx: Some(rx),
            playback_rx: Some(playback_rx),
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let (Some(mut rx), Some(mut playback_rx)) = (self.rx.take(), self.playback_rx.take())
        else {
            anyhow::bail!("App::run called twice");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        let size = terminal.size()?;
        debug!("run(): terminal created, size={:?}", size);
        self.on_resize(size.width);

        self.start();

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        let mut connection = self.events.state();

        // Toast expiry + spinner animation and component ticks.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // panel.log tail for the status line and the log panel.
        let mut log_refresh = tokio::time::interval(Duration::from_secs(2));
        log_refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    let mut redraw = self.handle_message(msg);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        redraw |= self.handle_message(next);
                    }
                    needs_redraw = redraw;
                }

                Some(update) = playback_rx.recv() => {
                    needs_redraw = self.on_playback_update(update);
                }

                Ok(()) = connection.changed() => {
                    let next = *connection.borrow_and_update();
                    if next != self.state.connection {
                        info!("event stream {}", next.label());
                        self.state.connection = next;
                        needs_redraw = true;
                    }
                }

                _ = ui_tick.tick() => {
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.sidebar.tick(s));
                        all.extend(self.plugin_config.tick(s));
                        all.extend(self.web_radio.tick(s));
                        all.extend(self.playback_bar.tick(s));
                        all
                    };
                    needs_redraw = !tick_actions.is_empty();
                    for action in tick_actions {
                        self.dispatch(action);
                    }
                    needs_redraw |= self.toast.tick();
                }

                _ = log_refresh.tick() => {
                    self.reload_log();
                    needs_redraw = true;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.state.playback.unmount();
        self.events.close();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("panel closed");
        Ok(())
    }

    /// Mount the playback view-model and kick off the first requests.
    pub fn start(&mut self) {
        info!("panel starting on {} ({})", self.state.device_url, self.state.route());
        self.state.playback.mount(&self.api, &self.events);
        self.apply_action(Action::ReloadPlugins);
        if let Route::Plugin(name) = self.state.route().clone() {
            self.apply_action(Action::LoadPluginConfig(name));
        }
        self.reload_log();
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Returns `true` when the screen needs a redraw.
    pub fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a);
                    }
                    self.sync_input_mode();
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    if actions.is_empty() && !matches!(mouse.kind, MouseEventKind::Down(_)) {
                        return false;
                    }
                    for a in actions {
                        self.dispatch(a);
                    }
                }
                Event::Resize(w, h) => self.dispatch(Action::Resize(w, h)),
                _ => return false,
            },

            AppMessage::PluginsLoaded(result) => match result {
                Ok(list) => {
                    debug!("{} plugins reported", list.len());
                    self.state.plugins = PluginList::Loaded(list);
                }
                Err(e) => {
                    warn!("plugin list failed: {}", e);
                    self.toast.error(format!("plugin list: {}", e));
                    self.state.plugins = PluginList::Failed(e);
                }
            },

            AppMessage::PluginConfigLoaded { name, result } => {
                if let Err(e) = &result {
                    warn!("settings of {} failed to load: {}", name, e);
                }
                return self.plugin_config.on_loaded(&name, result);
            }

            AppMessage::PluginSaved { name, result } => {
                match &result {
                    Ok(()) => {
                        info!("settings of {} saved", name);
                        self.toast.success(format!("{} settings saved", name));
                    }
                    Err(e) => {
                        warn!("saving settings of {} failed: {}", name, e);
                        self.toast.error(format!("saving {} failed", name));
                    }
                }
                self.plugin_config.on_saved(&name, result);
            }

            AppMessage::StationsFound { query, result } => {
                self.toast.dismiss_spinner();
                if let Err(e) = &result {
                    warn!("station search {:?} failed: {}", query, e);
                }
                self.web_radio.on_results(&query, result);
            }

            AppMessage::StationPlayed { name, result } => match result {
                Ok(()) => self.toast.success(format!("playing {}", name)),
                Err(e) => {
                    warn!("playing {} failed: {}", name, e);
                    self.toast.error(format!("could not play {}: {}", name, e));
                }
            },
        }
        true
    }

    /// Fold a view-model update in; returns `true` when the screen changed.
    pub fn on_playback_update(&mut self, update: PlaybackUpdate) -> bool {
        match self.state.playback.apply(update) {
            Applied::Replaced => true,
            Applied::FetchFailed(e) => {
                self.toast.warning(format!("playback state unavailable: {}", e));
                true
            }
            Applied::VolumeFailed(message) => {
                self.toast.warning(message);
                true
            }
            Applied::Rejected | Applied::Stale => false,
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn content_captures_input(&self) -> bool {
        match self.state.route() {
            Route::Plugin(_) => self.plugin_config.captures_input(),
            Route::WebRadio => self.web_radio.captures_input(),
            Route::Home => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible; any other key closes it.
        if self.shell.show_help {
            let actions = self.help_overlay.handle_key(key, &self.state);
            if !actions.is_empty() {
                return actions;
            }
            return vec![Action::ToggleHelp];
        }

        let capturing = self.shell.focused() == Some(ComponentId::Content)
            && self.content_captures_input();
        if !capturing && key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('L') => return vec![Action::ToggleLogs],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                KeyCode::Tab => return vec![Action::FocusNext],
                KeyCode::BackTab => return vec![Action::FocusPrev],
                KeyCode::Char('1') => return vec![Action::FocusPane(ComponentId::Sidebar)],
                KeyCode::Char('2') => return vec![Action::FocusPane(ComponentId::Content)],
                KeyCode::Char('3') => return vec![Action::FocusPane(ComponentId::PlaybackBar)],
                KeyCode::Esc | KeyCode::Backspace => return vec![Action::Back],
                _ => {}
            }
        }

        // Dispatch to the focused component
        let s = &self.state;
        match self.shell.focused() {
            Some(ComponentId::Sidebar) => self.sidebar.handle_key(key, s),
            Some(ComponentId::Content) => match s.route() {
                Route::Home => self.home.handle_key(key, s),
                Route::Plugin(_) => self.plugin_config.handle_key(key, s),
                Route::WebRadio => self.web_radio.handle_key(key, s),
            },
            Some(ComponentId::PlaybackBar) => self.playback_bar.handle_key(key, s),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, s),
            Some(ComponentId::HelpOverlay) | None => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.shell.show_help {
            return vec![];
        }
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click {
            return vec![];
        }

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        let (col, row) = (event.column, event.row);
        let s = &self.state;
        let (id, mut actions) = if hit(areas.playback_bar, col, row) {
            (
                ComponentId::PlaybackBar,
                self.playback_bar.handle_mouse(event, areas.playback_bar, s),
            )
        } else if hit(areas.sidebar, col, row) {
            (
                ComponentId::Sidebar,
                self.sidebar.handle_mouse(event, areas.sidebar, s),
            )
        } else if hit(areas.content, col, row) {
            let actions = match s.route() {
                Route::Home => self.home.handle_mouse(event, areas.content, s),
                Route::Plugin(_) => self.plugin_config.handle_mouse(event, areas.content, s),
                Route::WebRadio => self.web_radio.handle_mouse(event, areas.content, s),
            };
            (ComponentId::Content, actions)
        } else if hit(areas.log_panel, col, row) {
            (
                ComponentId::LogPanel,
                self.log_panel.handle_mouse(event, areas.log_panel, s),
            )
        } else {
            return vec![];
        };

        // Focus follows the click.
        if matches!(event.kind, MouseEventKind::Down(_)) && self.shell.focused() != Some(id) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    pub fn dispatch(&mut self, action: Action) {
        // Components see every action first (route highlight, overlay toggles).
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.sidebar.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        if !matches!(action, Action::Noop) {
            debug!("apply_action: {:?}", action);
        }
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::SetVolume(slider) => {
                if self.state.is_compact() {
                    return;
                }
                self.state.playback.set_volume(&self.api, slider);
            }
            Action::ToggleEqualizer => {
                if self.state.is_compact() {
                    return;
                }
                let open = self.state.playback.toggle_equalizer_panel();
                let has_eq = self
                    .state
                    .playback
                    .state()
                    .is_some_and(|s| s.eq.is_some());
                if open && !has_eq {
                    self.toast.info("device reports no equalizer");
                }
            }
            Action::RefetchPlayback => {
                if self.state.playback.refetch(&self.api) {
                    self.toast.info("refreshing playback state");
                }
            }

            // ── Routing ───────────────────────────────────────────────────────
            Action::Navigate(route) => {
                if self.state.router.navigate(route) {
                    self.on_route_changed();
                }
            }
            Action::Back => {
                if self.state.router.back() {
                    self.on_route_changed();
                }
            }

            // ── Focus ─────────────────────────────────────────────────────────
            Action::FocusNext => {
                self.shell.focus_next();
            }
            Action::FocusPrev => {
                self.shell.focus_prev();
            }
            Action::FocusPane(id) => {
                self.shell.focus_set(id);
            }
            Action::OpenInput => {
                self.shell.focus_set(ComponentId::Content);
            }
            Action::CloseInput => {}

            // ── Plugins ───────────────────────────────────────────────────────
            Action::ReloadPlugins => {
                self.state.plugins = PluginList::Loading;
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.plugins().await.map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::PluginsLoaded(result)).await;
                });
            }
            Action::LoadPluginConfig(name) => {
                self.plugin_config.begin_loading(&name);
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api
                        .plugin_configuration(&name)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::PluginConfigLoaded { name, result }).await;
                });
            }
            Action::SavePluginConfig(config) => {
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api
                        .save_plugin_configuration(&config)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx
                        .send(AppMessage::PluginSaved {
                            name: config.name,
                            result,
                        })
                        .await;
                });
            }

            // ── Web radio ─────────────────────────────────────────────────────
            Action::SearchStations(query) => {
                self.toast.spinner(format!("searching {:?}", query));
                let radio = self.radio.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = radio.search(&query).await.map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::StationsFound { query, result }).await;
                });
            }
            Action::PlayStation(command) => self.play_station(command),

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleLogs => {
                self.shell.toggle_log_panel();
                if self.shell.show_log_panel {
                    self.reload_log();
                }
                self.rebuild_focus_ring();
            }
            Action::ToggleHelp => self.shell.toggle_help(),
            Action::ToggleKeys => self.shell.toggle_keys_bar(),

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
            Action::Resize(w, _h) => self.on_resize(w),
            Action::Noop => {}
        }
    }

    fn play_station(&mut self, command: WebRadioCommand) {
        info!("play {:?} ({})", command.station_name, command.station_url);
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.play_web_radio(&command).await.map_err(|e| e.to_string());
            let _ = tx
                .send(AppMessage::StationPlayed {
                    name: command.station_name,
                    result,
                })
                .await;
        });
    }

    fn on_route_changed(&mut self) {
        let route = self.state.route().clone();
        debug!("route -> {}", route);
        self.rebuild_focus_ring();
        match &route {
            Route::Home => {
                self.shell.focus_set(ComponentId::Sidebar);
            }
            Route::Plugin(name) => {
                self.shell.focus_set(ComponentId::Content);
                self.apply_action(Action::LoadPluginConfig(name.clone()));
            }
            Route::WebRadio => {
                self.shell.focus_set(ComponentId::Content);
            }
        }
    }

    fn on_resize(&mut self, width: u16) {
        if self.state.update_device_class(width) {
            info!("layout is now {:?} ({} columns)", self.state.device_class, width);
            self.rebuild_focus_ring();
        }
    }

    fn rebuild_focus_ring(&mut self) {
        self.shell
            .rebuild_focus_ring(self.state.router.current(), self.state.device_class);
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if !self.content_captures_input() {
            InputMode::Normal
        } else if *self.state.route() == Route::WebRadio {
            InputMode::Filter
        } else {
            InputMode::Edit
        };
    }

    fn reload_log(&mut self) {
        self.state.log_lines = log_panel::read_log_tail(&self.state.log_path, LOG_TAIL_LINES);
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // ── Outer layout: body | (log) | playback bar | status | (keys) ───────
        let log_h = if self.shell.show_log_panel { LOG_PANEL_HEIGHT } else { 0 };
        let keys_h = u16::from(self.shell.show_keys_bar);
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(log_h),
                Constraint::Length(BAR_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(keys_h),
            ])
            .split(area);
        let (body, log_area, bar_area, status_area, keys_area) =
            (outer[0], outer[1], outer[2], outer[3], outer[4]);

        self.draw_body(frame, body);

        if self.shell.show_log_panel {
            let focused = self.shell.focused() == Some(ComponentId::LogPanel);
            self.log_panel.draw(frame, log_area, focused, &self.state);
            self.pane_areas.log_panel = log_area;
        } else {
            self.pane_areas.log_panel = Rect::default();
        }

        let bar_focused = self.shell.focused() == Some(ComponentId::PlaybackBar);
        self.playback_bar
            .draw(frame, bar_area, bar_focused, &self.state);
        self.pane_areas.playback_bar = bar_area;

        let last_log = self
            .state
            .log_lines
            .last()
            .map(|l| log_panel::compact_log_line(l));
        status_bar::draw_status_line(
            frame,
            status_area,
            self.state.connection,
            &self.state.device_url,
            self.state.route(),
            last_log.as_deref(),
        );
        if self.shell.show_keys_bar {
            status_bar::draw_keys_bar(frame, keys_area, self.state.input_mode, self.state.route());
        }

        // ── Overlays ──────────────────────────────────────────────────────────
        self.playback_bar.draw_popover(frame, &self.state);
        if self.shell.show_help {
            self.help_overlay.draw(frame, area, false, &self.state);
        }
        self.toast.draw(frame, area);
    }

    fn draw_body(&mut self, frame: &mut Frame, body: Rect) {
        let route = self.state.route().clone();
        let focused = self.shell.focused();

        let (sidebar_area, content_area) = if !self.state.is_compact() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .split(body);
            (cols[0], cols[1])
        } else if Shell::sidebar_column(&route, self.state.device_class) {
            (body, Rect::default())
        } else {
            (Rect::default(), body)
        };

        self.pane_areas.sidebar = sidebar_area;
        self.pane_areas.content = content_area;

        if sidebar_area.width > 0 {
            self.sidebar.draw(
                frame,
                sidebar_area,
                focused == Some(ComponentId::Sidebar),
                &self.state,
            );
        }
        if content_area.width > 0 {
            let content_focused = focused == Some(ComponentId::Content);
            let s = &self.state;
            match route {
                Route::Home => self.home.draw(frame, content_area, content_focused, s),
                Route::Plugin(_) => self.plugin_config.draw(frame, content_area, content_focused, s),
                Route::WebRadio => self.web_radio.draw(frame, content_area, content_focused, s),
            }
        }
    }
}

#[cfg(test)]
impl App {
    /// Wait for the next playback update and fold it in.
    pub(crate) async fn pump_playback(&mut self) -> bool {
        let rx = self.playback_rx.as_mut().expect("playback channel");
        let update = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("playback update in time")
            .expect("playback channel open");
        self.on_playback_update(update)
    }

    /// Wait for the next background message and handle it.
    pub(crate) async fn pump_message(&mut self) -> bool {
        let rx = self.rx.as_mut().expect("app channel");
        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("app message in time")
            .expect("app channel open");
        self.handle_message(msg)
    }

    pub(crate) fn press(&mut self, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        self.handle_message(AppMessage::Event(Event::Key(key)));
    }

    pub(crate) fn focused(&self) -> Option<ComponentId> {
        self.shell.focused()
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn toasts(&self) -> Vec<String> {
        self.toast.messages().map(str::to_string).collect()
    }

    pub(crate) fn render(&mut self, width: u16, height: u16) -> String {
        use ratatui::backend::TestBackend;
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
        terminal.draw(|f| self.draw(f)).expect("draw");
        crate::test_support::buffer_text(terminal.backend().buffer())
    }
}
