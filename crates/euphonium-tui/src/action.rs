//! Action enum: user intents and internal events flowing through the App.

use euphonium_proto::protocol::{PluginConfiguration, WebRadioCommand};

use crate::route::Route;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Sidebar,
    Content,
    PlaybackBar,
    LogPanel,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    /// Slider stop picked by the user (0..=15, not validated).
    SetVolume(i32),
    ToggleEqualizer,
    RefetchPlayback,

    // ── Routing ──────────────────────────────────────────────────────────────
    Navigate(Route),
    Back,

    // ── Focus ────────────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Text input ───────────────────────────────────────────────────────────
    OpenInput,
    CloseInput,

    // ── Plugins ──────────────────────────────────────────────────────────────
    ReloadPlugins,
    LoadPluginConfig(String),
    SavePluginConfig(PluginConfiguration),

    // ── Web radio ────────────────────────────────────────────────────────────
    SearchStations(String),
    PlayStation(WebRadioCommand),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
    Noop,
}
