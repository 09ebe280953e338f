use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub radio_browser: RadioBrowserConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the device's HTTP API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_playback_path")]
    pub playback_path: String,
    #[serde(default = "default_volume_path")]
    pub volume_path: String,
    #[serde(default = "default_events_path")]
    pub events_path: String,
    #[serde(default = "default_plugins_path")]
    pub plugins_path: String,
    #[serde(default = "default_webradio_path")]
    pub webradio_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Delay before reopening a dropped event stream, unless the device
    /// asks for another one with `retry:`.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioBrowserConfig {
    #[serde(default = "default_radio_browser_url")]
    pub base_url: String,
    #[serde(default = "default_radio_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Terminals narrower than this many columns get the compact layout.
    #[serde(default = "default_compact_width")]
    pub compact_width: u16,
    #[serde(default = "default_start_route")]
    pub start_route: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            playback_path: default_playback_path(),
            volume_path: default_volume_path(),
            events_path: default_events_path(),
            plugins_path: default_plugins_path(),
            webradio_path: default_webradio_path(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Default for RadioBrowserConfig {
    fn default() -> Self {
        Self {
            base_url: default_radio_browser_url(),
            limit: default_radio_limit(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            compact_width: default_compact_width(),
            start_route: default_start_route(),
        }
    }
}

fn default_base_url() -> String {
    "http://euphonium.local".to_string()
}

fn default_playback_path() -> String {
    "/playback".to_string()
}

fn default_volume_path() -> String {
    "/playback/volume".to_string()
}

fn default_events_path() -> String {
    "/events".to_string()
}

fn default_plugins_path() -> String {
    "/plugins".to_string()
}

fn default_webradio_path() -> String {
    "/webradio".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_radio_browser_url() -> String {
    "https://de1.api.radio-browser.info".to_string()
}

fn default_radio_limit() -> u32 {
    50
}

fn default_compact_width() -> u16 {
    80
}

fn default_start_route() -> String {
    "/web".to_string()
}

impl ServiceConfig {
    /// Join a configured path onto the base URL, tolerating a trailing slash
    /// on the base and a missing leading slash on the path.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub fn playback_url(&self) -> String {
        self.url(&self.playback_path)
    }

    pub fn volume_url(&self) -> String {
        self.url(&self.volume_path)
    }

    pub fn events_url(&self) -> String {
        self.url(&self.events_path)
    }

    pub fn plugins_url(&self) -> String {
        self.url(&self.plugins_path)
    }

    pub fn plugin_url(&self, name: &str) -> String {
        format!("{}/{}", self.plugins_url().trim_end_matches('/'), name)
    }

    pub fn webradio_url(&self) -> String {
        self.url(&self.webradio_path)
    }
}

impl EventsConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

impl Config {
    /// Load the config from its default location, writing the defaults there
    /// on first run.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("wrote default config to {}", path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
