//! Shell: which panes are on screen for the current route and device
//! class, plus the panel-wide toggles (log panel, help, keys bar).
//!
//! The focus ring is rebuilt whenever the route or the device class
//! changes:
//! - wide: sidebar, content (not on `/web`), playback bar
//! - compact `/web`: sidebar (drawn as the content), playback bar
//! - compact elsewhere: content, playback bar
//!
//! plus the log panel while it is open.

use crate::action::ComponentId;
use crate::app_state::DeviceClass;
use crate::focus::FocusRing;
use crate::route::Route;

pub struct Shell {
    pub show_log_panel: bool,
    pub show_help: bool,
    pub show_keys_bar: bool,
    pub focus: FocusRing,
}

impl Shell {
    pub fn new(route: &Route, class: DeviceClass) -> Self {
        let mut shell = Self {
            show_log_panel: false,
            show_help: false,
            show_keys_bar: true,
            focus: FocusRing::default(),
        };
        shell.rebuild_focus_ring(route, class);
        // Land on the content when a deep link opened something.
        if *route != Route::Home {
            shell.focus.set(ComponentId::Content);
        }
        shell
    }

    pub fn panes(route: &Route, class: DeviceClass) -> Vec<ComponentId> {
        let home = *route == Route::Home;
        match (class, home) {
            (_, true) => vec![ComponentId::Sidebar, ComponentId::PlaybackBar],
            (DeviceClass::Wide, false) => vec![
                ComponentId::Sidebar,
                ComponentId::Content,
                ComponentId::PlaybackBar,
            ],
            (DeviceClass::Compact, false) => vec![ComponentId::Content, ComponentId::PlaybackBar],
        }
    }

    /// The log panel joins the ring while it is open.
    pub fn rebuild_focus_ring(&mut self, route: &Route, class: DeviceClass) {
        let mut items = Self::panes(route, class);
        if self.show_log_panel {
            items.push(ComponentId::LogPanel);
        }
        self.focus.set_items(items);
    }

    /// Whether the sidebar is drawn as its own column.
    pub fn sidebar_column(route: &Route, class: DeviceClass) -> bool {
        match class {
            DeviceClass::Wide => true,
            DeviceClass::Compact => *route == Route::Home,
        }
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.focus.current()
    }

    pub fn focus_next(&mut self) -> Option<ComponentId> {
        self.focus.next()
    }

    pub fn focus_prev(&mut self) -> Option<ComponentId> {
        self.focus.prev()
    }

    pub fn focus_set(&mut self, id: ComponentId) -> bool {
        self.focus.set(id)
    }

    pub fn toggle_log_panel(&mut self) {
        self.show_log_panel = !self.show_log_panel;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_keys_bar(&mut self) {
        self.show_keys_bar = !self.show_keys_bar;
    }
}
