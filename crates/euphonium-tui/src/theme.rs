//! Color palette and style constants for the control panel.

use ratatui::style::{Color, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(17, 19, 24);
pub const C_BAR_BG: Color = Color::Rgb(36, 40, 50); // playback bar, gray-700-ish
pub const C_POPOVER_BG: Color = Color::Rgb(46, 50, 62);
pub const C_ACCENT: Color = Color::Rgb(236, 120, 80);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_CONNECTING: Color = Color::Rgb(255, 184, 80);
pub const C_ERROR: Color = Color::Rgb(255, 90, 90);
pub const C_MUTED: Color = Color::Rgb(96, 102, 118);
pub const C_SECONDARY: Color = Color::Rgb(156, 163, 175); // gray-400
pub const C_PRIMARY: Color = Color::Rgb(225, 228, 235);
pub const C_SELECTION_BG: Color = Color::Rgb(40, 44, 58);
pub const C_PANEL_BORDER: Color = Color::Rgb(44, 48, 60);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(236, 120, 80);
pub const C_NUMBER_HINT: Color = Color::Rgb(100, 106, 124);
pub const C_INPUT_BG: Color = Color::Rgb(26, 29, 38);
pub const C_INPUT_FG: Color = Color::Rgb(255, 200, 80);
pub const C_TAG: Color = Color::Rgb(96, 150, 210);
pub const C_LOCATION: Color = Color::Rgb(100, 160, 130);
pub const C_SLIDER_FILL: Color = Color::Rgb(236, 120, 80);
pub const C_SLIDER_EMPTY: Color = Color::Rgb(70, 75, 90);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_MODE_NORMAL: Color = Color::Rgb(156, 163, 175);
pub const C_MODE_FILTER: Color = Color::Rgb(255, 200, 80);
pub const C_MODE_EDIT: Color = Color::Rgb(120, 180, 255);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
