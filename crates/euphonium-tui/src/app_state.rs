//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::path::PathBuf;

use euphonium_proto::protocol::{PluginKind, PluginSummary};

use crate::event_source::ConnectionState;
use crate::playback::PlaybackViewModel;
use crate::route::{Route, Router};
use crate::widgets::status_bar::InputMode;

/// Layout class of the terminal.  Decided from the width at start-up and on
/// resize; components only ever read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Narrow terminal: no sidebar column, no playback controls.
    Compact,
    Wide,
}

impl DeviceClass {
    pub fn from_width(width: u16, compact_width: u16) -> Self {
        if width < compact_width {
            DeviceClass::Compact
        } else {
            DeviceClass::Wide
        }
    }

    pub fn is_compact(self) -> bool {
        self == DeviceClass::Compact
    }
}

/// Plugin list as fetched from the device.
#[derive(Debug, Clone, Default)]
pub enum PluginList {
    #[default]
    Loading,
    Loaded(Vec<PluginSummary>),
    Failed(String),
}

impl PluginList {
    pub fn entries(&self) -> &[PluginSummary] {
        match self {
            PluginList::Loaded(list) => list,
            _ => &[],
        }
    }

    pub fn of_kind(&self, kind: PluginKind) -> impl Iterator<Item = &PluginSummary> {
        self.entries().iter().filter(move |p| p.kind == kind)
    }
}

/// The full shared state of the application.
pub struct AppState {
    // ── Device ─────────────────────────────────────────────────────────────
    pub device_url: String,
    pub connection: ConnectionState,
    pub playback: PlaybackViewModel,
    pub plugins: PluginList,

    // ── Layout ─────────────────────────────────────────────────────────────
    pub device_class: DeviceClass,
    pub compact_width: u16,
    pub router: Router,
    pub input_mode: InputMode,

    // ── Log ────────────────────────────────────────────────────────────────
    pub log_path: PathBuf,
    /// Cached tail of panel.log (refreshed periodically by App).
    pub log_lines: Vec<String>,
}

impl AppState {
    pub fn route(&self) -> &Route {
        self.router.current()
    }

    pub fn is_compact(&self) -> bool {
        self.device_class.is_compact()
    }

    /// Re-derive the device class after a resize.  Returns `true` if it
    /// changed.
    pub fn update_device_class(&mut self, width: u16) -> bool {
        let class = DeviceClass::from_width(width, self.compact_width);
        let changed = class != self.device_class;
        self.device_class = class;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_breakpoint() {
        assert_eq!(DeviceClass::from_width(79, 80), DeviceClass::Compact);
        assert_eq!(DeviceClass::from_width(80, 80), DeviceClass::Wide);
        assert_eq!(DeviceClass::from_width(200, 80), DeviceClass::Wide);
        assert!(DeviceClass::from_width(0, 80).is_compact());
    }

    #[test]
    fn test_plugin_list_split_by_kind() {
        let list = PluginList::Loaded(vec![
            PluginSummary {
                name: "cspot".into(),
                display_name: "Spotify".into(),
                kind: PluginKind::Plugin,
            },
            PluginSummary {
                name: "webradio".into(),
                display_name: "Web Radio".into(),
                kind: PluginKind::App,
            },
        ]);
        let plugins: Vec<_> = list.of_kind(PluginKind::Plugin).map(|p| p.name.as_str()).collect();
        let apps: Vec<_> = list.of_kind(PluginKind::App).map(|p| p.name.as_str()).collect();
        assert_eq!(plugins, vec!["cspot"]);
        assert_eq!(apps, vec!["webradio"]);
        assert!(PluginList::Loading.entries().is_empty());
    }
}
