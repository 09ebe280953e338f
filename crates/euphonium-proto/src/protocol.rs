use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the push event that carries a full [`PlaybackState`] snapshot.
pub const PLAYBACK_EVENT: &str = "playback";

/// Highest position of the volume slider.  The slider has 16 stops (0..=15),
/// the service speaks percent (0..=100).
pub const VOLUME_SLIDER_MAX: i32 = 15;

/// Errors raised while decoding a payload received from the device.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not a valid playback state: {0}")]
    Playback(#[source] serde_json::Error),
    #[error("payload is empty")]
    Empty,
}

/// Track metadata as reported by whichever source plugin is playing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SongInfo {
    #[serde(default)]
    pub song_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_name: String,
    #[serde(default)]
    pub source_name: String,
    /// Cover art reference (usually an http URL).
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Empty,
    /// Any status string this panel does not know about.
    #[serde(other)]
    Unknown,
}

impl PlaybackStatus {
    /// Name of the icon the transport button shows: the action it would
    /// perform, so a playing device shows "pause".
    pub fn transport_icon(&self) -> &'static str {
        match self {
            PlaybackStatus::Playing => "pause",
            _ => "play",
        }
    }
}

/// Equalizer settings are owned by the device; the panel passes them to the
/// equalizer view untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct EqualizerSettings(pub Map<String, Value>);

impl EqualizerSettings {
    /// Numeric members in key order, for drawing as bands.
    pub fn bands(&self) -> Vec<(&str, f64)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|f| (k.as_str(), f)))
            .collect()
    }
}

/// Full snapshot of what the device is playing.  Always replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackState {
    pub song: SongInfo,
    pub volume: i32,
    pub status: PlaybackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<EqualizerSettings>,
}

impl PlaybackState {
    /// Decode a push-event payload.  Anything that is not a complete
    /// snapshot is rejected.
    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        if payload.trim().is_empty() {
            return Err(DecodeError::Empty);
        }
        serde_json::from_str(payload).map_err(DecodeError::Playback)
    }

    /// Slider stop matching the reported volume.
    pub fn slider_position(&self) -> i32 {
        slider_from_volume(self.volume)
    }
}

/// Convert a slider stop into the percent value sent to the device.
/// Out-of-range stops are passed through; the device decides what is valid.
pub fn volume_from_slider(slider: i32) -> i32 {
    ((slider as f64 / VOLUME_SLIDER_MAX as f64) * 100.0).round() as i32
}

/// Nearest slider stop for a percent volume.
pub fn slider_from_volume(volume: i32) -> i32 {
    ((volume as f64 / 100.0) * VOLUME_SLIDER_MAX as f64).round() as i32
}

/// Body of the set-volume command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeCommand {
    pub volume: i32,
}

impl VolumeCommand {
    pub fn from_slider(slider: i32) -> Self {
        Self {
            volume: volume_from_slider(slider),
        }
    }
}

// ── Plugins ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    #[default]
    Plugin,
    App,
}

/// Entry of the plugin list shown in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PluginSummary {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub kind: PluginKind,
}

impl PluginSummary {
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Select {
        #[serde(default)]
        options: Vec<String>,
    },
}

/// One editable setting of a plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigField {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: Value,
}

impl ConfigField {
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// Value rendered for display and as the starting text of an edit.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => (if *b { "on" } else { "off" }).to_string(),
            other => other.to_string(),
        }
    }

    /// Store user-entered text according to the field kind.  Numbers that do
    /// not parse are rejected and leave the value unchanged.
    pub fn set_from_text(&mut self, text: &str) -> bool {
        match self.kind {
            FieldKind::Number => {
                let trimmed = text.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    self.value = Value::from(i);
                    true
                } else if let Some(n) = trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                {
                    self.value = Value::Number(n);
                    true
                } else {
                    false
                }
            }
            FieldKind::Checkbox => false,
            FieldKind::Text | FieldKind::Select { .. } => {
                self.value = Value::String(text.to_string());
                true
            }
        }
    }

    pub fn toggle(&mut self) -> bool {
        if let FieldKind::Checkbox = self.kind {
            let on = self.value.as_bool().unwrap_or(false);
            self.value = Value::Bool(!on);
            true
        } else {
            false
        }
    }

    /// Step a select field through its options, wrapping at both ends.
    pub fn cycle(&mut self, forward: bool) -> bool {
        let FieldKind::Select { options } = &self.kind else {
            return false;
        };
        if options.is_empty() {
            return false;
        }
        let current = self
            .value
            .as_str()
            .and_then(|v| options.iter().position(|o| o == v));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(0), false) => options.len() - 1,
            (Some(i), false) => i - 1,
        };
        self.value = Value::String(options[next].clone());
        true
    }
}

/// Settings page of a single plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfiguration {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub fields: Vec<ConfigField>,
}

impl PluginConfiguration {
    /// Body posted when saving: `{ key: value, ... }`.
    pub fn to_values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.value.clone()))
            .collect()
    }
}

// ── Web radio ─────────────────────────────────────────────────────────────────

/// A station as returned by the radio directory search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RadioStation {
    #[serde(default)]
    pub stationuuid: String,
    pub name: String,
    #[serde(default)]
    pub url_resolved: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub favicon: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub bitrate: u32,
    #[serde(default)]
    pub tags: String,
}

impl RadioStation {
    /// Stream address to hand to the device; the directory's resolved URL
    /// wins over the raw one (which is often a playlist).
    pub fn stream_url(&self) -> &str {
        if self.url_resolved.is_empty() {
            &self.url
        } else {
            &self.url_resolved
        }
    }

    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Body of the play-web-radio command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebRadioCommand {
    pub station_name: String,
    pub station_url: String,
    #[serde(default)]
    pub codec: String,
}

impl From<&RadioStation> for WebRadioCommand {
    fn from(s: &RadioStation) -> Self {
        Self {
            station_name: s.name.clone(),
            station_url: s.stream_url().to_string(),
            codec: s.codec.to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "song": {
            "songName": "Windowlicker",
            "artistName": "Aphex Twin",
            "albumName": "Windowlicker",
            "sourceName": "cspot",
            "icon": "https://i.scdn.co/image/abc"
        },
        "volume": 60,
        "status": "playing",
        "eq": { "low": 2, "mid": 0, "high": -1.5 }
    }"#;

    #[test]
    fn test_volume_from_slider_boundaries() {
        assert_eq!(volume_from_slider(0), 0);
        assert_eq!(volume_from_slider(15), 100);
        assert_eq!(volume_from_slider(7), 47);
    }

    #[test]
    fn test_volume_from_slider_matches_formula_for_every_stop() {
        for stop in 0..=VOLUME_SLIDER_MAX {
            let expected = (stop as f64 / 15.0 * 100.0).round() as i32;
            assert_eq!(volume_from_slider(stop), expected, "stop {}", stop);
        }
    }

    #[test]
    fn test_volume_from_slider_is_not_clamped() {
        assert_eq!(volume_from_slider(30), 200);
        assert_eq!(volume_from_slider(-3), -20);
    }

    #[test]
    fn test_slider_from_volume_rounds_to_nearest_stop() {
        assert_eq!(slider_from_volume(0), 0);
        assert_eq!(slider_from_volume(100), 15);
        assert_eq!(slider_from_volume(47), 7);
        assert_eq!(slider_from_volume(50), 8);
    }

    #[test]
    fn test_decode_full_snapshot() {
        let state = PlaybackState::decode(SNAPSHOT).unwrap();
        assert_eq!(state.song.song_name, "Windowlicker");
        assert_eq!(state.song.source_name, "cspot");
        assert_eq!(state.volume, 60);
        assert_eq!(state.status, PlaybackStatus::Playing);
        let eq = state.eq.unwrap();
        assert_eq!(eq.bands(), vec![("high", -1.5), ("low", 2.0), ("mid", 0.0)]);
    }

    #[test]
    fn test_decode_rejects_partial_snapshot() {
        assert!(PlaybackState::decode(r#"{"volume": 10}"#).is_err());
        assert!(PlaybackState::decode("not json").is_err());
        assert!(matches!(PlaybackState::decode("  "), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_unknown_status_does_not_fail_decode() {
        let payload = r#"{"song":{},"volume":5,"status":"buffering"}"#;
        let state = PlaybackState::decode(payload).unwrap();
        assert_eq!(state.status, PlaybackStatus::Unknown);
        assert!(state.eq.is_none());
    }

    #[test]
    fn test_transport_icon() {
        assert_eq!(PlaybackStatus::Playing.transport_icon(), "pause");
        assert_eq!(PlaybackStatus::Paused.transport_icon(), "play");
        assert_eq!(PlaybackStatus::Empty.transport_icon(), "play");
        assert_eq!(PlaybackStatus::Unknown.transport_icon(), "play");
    }

    #[test]
    fn test_equalizer_passes_through_unchanged() {
        let raw = r#"{"song":{},"volume":1,"status":"paused","eq":{"low":1,"preset":"rock"}}"#;
        let state = PlaybackState::decode(raw).unwrap();
        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["eq"]["preset"], "rock");
        assert_eq!(back["eq"]["low"], 1);
    }

    #[test]
    fn test_config_field_kinds() {
        let raw = r#"{
            "name": "cspot",
            "displayName": "Spotify",
            "fields": [
                {"key": "receiverName", "label": "Name", "type": "text", "value": "Euphonium"},
                {"key": "audioBitrate", "type": "select", "options": ["96", "160", "320"], "value": "160"},
                {"key": "autoplay", "type": "checkbox", "value": false},
                {"key": "volume", "type": "number", "value": 255}
            ]
        }"#;
        let mut cfg: PluginConfiguration = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.fields[0].label(), "Name");
        assert_eq!(cfg.fields[1].label(), "audioBitrate");

        assert!(cfg.fields[1].cycle(true));
        assert_eq!(cfg.fields[1].display_value(), "320");
        assert!(cfg.fields[1].cycle(true));
        assert_eq!(cfg.fields[1].display_value(), "96");
        assert!(cfg.fields[1].cycle(false));
        assert_eq!(cfg.fields[1].display_value(), "320");

        assert!(cfg.fields[2].toggle());
        assert_eq!(cfg.fields[2].display_value(), "on");
        assert!(!cfg.fields[0].toggle());

        assert!(!cfg.fields[3].set_from_text("loud"));
        assert!(cfg.fields[3].set_from_text(" 128 "));

        let values = cfg.to_values();
        assert_eq!(values["volume"], 128);
        assert_eq!(values["autoplay"], true);
        assert_eq!(values["audioBitrate"], "320");
    }

    #[test]
    fn test_plugin_summary_label_falls_back_to_name() {
        let list: Vec<PluginSummary> = serde_json::from_str(
            r#"[{"name":"cspot","displayName":"Spotify","type":"plugin"},
                {"name":"webradio","type":"app"}]"#,
        )
        .unwrap();
        assert_eq!(list[0].label(), "Spotify");
        assert_eq!(list[1].label(), "webradio");
        assert_eq!(list[1].kind, PluginKind::App);
    }

    #[test]
    fn test_web_radio_command_prefers_resolved_url() {
        let station = RadioStation {
            name: "FIP".into(),
            url: "http://example.org/fip.m3u".into(),
            url_resolved: "http://example.org/fip.mp3".into(),
            codec: "MP3".into(),
            ..Default::default()
        };
        let cmd = WebRadioCommand::from(&station);
        assert_eq!(cmd.station_url, "http://example.org/fip.mp3");
        assert_eq!(cmd.codec, "mp3");
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["stationName"], "FIP");
    }
}
