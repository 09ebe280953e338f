pub mod equalizer;
pub mod help_overlay;
pub mod home;
pub mod log_panel;
pub mod playback_bar;
pub mod plugin_config;
pub mod sidebar;
pub mod web_radio;
