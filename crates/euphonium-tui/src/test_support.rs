//! In-process stand-in for the device's HTTP API, used by the tests.
//!
//! Serves the playback, volume, plugin, web radio and event endpoints on an
//! ephemeral port, plus the radio directory search so one mock covers both
//! remotes.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use euphonium_proto::config::{RadioBrowserConfig, ServiceConfig};
use euphonium_proto::protocol::{
    EqualizerSettings, PlaybackState, PlaybackStatus, PluginConfiguration, PluginSummary,
    RadioStation, SongInfo, WebRadioCommand, PLAYBACK_EVENT,
};
use futures_util::{Stream, StreamExt};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::api::ApiClient;
use crate::app_state::{AppState, DeviceClass, PluginList};
use crate::event_source::ConnectionState;
use crate::playback::PlaybackViewModel;
use crate::radio_directory::RadioDirectory;
use crate::route::{Route, Router};
use crate::widgets::status_bar::InputMode;
use ratatui::buffer::Buffer;

/// A fresh app state for render tests; the view-model is never mounted.
pub fn app_state(class: DeviceClass) -> AppState {
    AppState {
        device_url: "http://euphonium.local".to_string(),
        connection: ConnectionState::Connecting,
        playback: PlaybackViewModel::new(mpsc::channel(16).0),
        plugins: PluginList::Loading,
        device_class: class,
        compact_width: 80,
        router: Router::new(Route::Home),
        input_mode: InputMode::Normal,
        log_path: std::env::temp_dir().join("euphonium-test-panel.log"),
        log_lines: Vec::new(),
    }
}

/// Rendered buffer as plain text, one line per row.
pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        out.push('\n');
    }
    out
}

pub fn sample_state(song: &str, volume: i32, status: PlaybackStatus, eq: bool) -> PlaybackState {
    let eq = eq.then(|| {
        let mut bands = Map::new();
        bands.insert("low".into(), Value::from(3));
        bands.insert("mid".into(), Value::from(0));
        bands.insert("high".into(), Value::from(-2));
        EqualizerSettings(bands)
    });
    PlaybackState {
        song: SongInfo {
            song_name: song.to_string(),
            artist_name: format!("{} Artist", song),
            album_name: format!("{} Album", song),
            source_name: "cspot".to_string(),
            icon: String::new(),
        },
        volume,
        status,
        eq,
    }
}

#[derive(Default)]
struct Shared {
    playback: Mutex<Option<PlaybackState>>,
    playback_delay: Mutex<Duration>,
    playback_requests: AtomicUsize,
    volumes: Mutex<Vec<i32>>,
    streams: Mutex<Vec<mpsc::UnboundedSender<(String, String)>>>,
    pending: Mutex<Vec<(String, String)>>,
    connections: AtomicUsize,
    plugins: Mutex<Vec<PluginSummary>>,
    configs: Mutex<HashMap<String, PluginConfiguration>>,
    saved: Mutex<Vec<(String, Map<String, Value>)>>,
    radio_plays: Mutex<Vec<WebRadioCommand>>,
    stations: Mutex<Vec<RadioStation>>,
    searches: Mutex<Vec<HashMap<String, String>>>,
}

pub struct MockDevice {
    addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl MockDevice {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let router = axum::Router::new()
            .route("/playback", get(playback))
            .route("/playback/volume", post(volume))
            .route("/events", get(events))
            .route("/plugins", get(plugins))
            .route("/plugins/:name", get(plugin_config).post(save_plugin_config))
            .route("/webradio", post(webradio))
            .route("/json/stations/search", get(search_stations))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock device");
        let addr = listener.local_addr().expect("mock device address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self { addr, shared, task }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            base_url: format!("http://{}", self.addr),
            ..Default::default()
        }
    }

    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(self.service_config())
    }

    pub fn radio_directory(&self) -> RadioDirectory {
        RadioDirectory::new(
            reqwest::Client::new(),
            RadioBrowserConfig {
                base_url: format!("http://{}", self.addr),
                limit: 10,
            },
        )
    }

    /// `None` makes `GET /playback` answer 503.
    pub fn set_playback(&self, state: Option<PlaybackState>) {
        *self.shared.playback.lock().unwrap() = state;
    }

    pub fn set_playback_delay(&self, delay: Duration) {
        *self.shared.playback_delay.lock().unwrap() = delay;
    }

    pub fn playback_requests(&self) -> usize {
        self.shared.playback_requests.load(Ordering::SeqCst)
    }

    pub fn volumes(&self) -> Vec<i32> {
        self.shared.volumes.lock().unwrap().clone()
    }

    pub async fn wait_for_volumes(&self, count: usize, timeout: Duration) -> Vec<i32> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let volumes = self.volumes();
            if volumes.len() >= count || tokio::time::Instant::now() >= deadline {
                return volumes;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Send one event to every open stream.  With no stream open the event
    /// is held back and delivered to the next connection.
    pub fn push_raw(&self, name: &str, data: &str) {
        let event = (name.to_string(), data.to_string());
        let mut streams = self.shared.streams.lock().unwrap();
        streams.retain(|tx| tx.send(event.clone()).is_ok());
        if streams.is_empty() {
            self.shared.pending.lock().unwrap().push(event);
        }
    }

    pub fn push_playback(&self, state: &PlaybackState) {
        let payload = serde_json::to_string(state).expect("encode playback state");
        self.push_raw(PLAYBACK_EVENT, &payload);
    }

    /// End every open event stream, as a device reboot would.
    pub fn drop_event_streams(&self) {
        self.shared.streams.lock().unwrap().clear();
    }

    pub fn event_connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    pub fn set_plugins(&self, plugins: Vec<PluginSummary>) {
        *self.shared.plugins.lock().unwrap() = plugins;
    }

    pub fn set_plugin_config(&self, config: PluginConfiguration) {
        self.shared
            .configs
            .lock()
            .unwrap()
            .insert(config.name.clone(), config);
    }

    pub fn saved_configs(&self) -> Vec<(String, Map<String, Value>)> {
        self.shared.saved.lock().unwrap().clone()
    }

    pub fn radio_plays(&self) -> Vec<WebRadioCommand> {
        self.shared.radio_plays.lock().unwrap().clone()
    }

    pub fn set_stations(&self, stations: Vec<RadioStation>) {
        *self.shared.stations.lock().unwrap() = stations;
    }

    pub fn searches(&self) -> Vec<HashMap<String, String>> {
        self.shared.searches.lock().unwrap().clone()
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn playback(State(shared): State<Arc<Shared>>) -> Response {
    shared.playback_requests.fetch_add(1, Ordering::SeqCst);
    let delay = *shared.playback_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let state = shared.playback.lock().unwrap().clone();
    match state {
        Some(state) => Json(state).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn volume(State(shared): State<Arc<Shared>>, Json(body): Json<Value>) -> StatusCode {
    match body.get("volume").and_then(Value::as_i64) {
        Some(v) => {
            shared.volumes.lock().unwrap().push(v as i32);
            StatusCode::OK
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn events(
    State(shared): State<Arc<Shared>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel();
    {
        let mut streams = shared.streams.lock().unwrap();
        for event in shared.pending.lock().unwrap().drain(..) {
            let _ = tx.send(event);
        }
        streams.push(tx);
    }
    shared.connections.fetch_add(1, Ordering::SeqCst);
    Sse::new(
        UnboundedReceiverStream::new(rx)
            .map(|(name, data)| Ok(Event::default().event(name).data(data))),
    )
}

async fn plugins(State(shared): State<Arc<Shared>>) -> Json<Vec<PluginSummary>> {
    Json(shared.plugins.lock().unwrap().clone())
}

async fn plugin_config(
    State(shared): State<Arc<Shared>>,
    Path(name): Path<String>,
) -> Response {
    let config = shared.configs.lock().unwrap().get(&name).cloned();
    match config {
        Some(config) => Json(config).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn save_plugin_config(
    State(shared): State<Arc<Shared>>,
    Path(name): Path<String>,
    Json(values): Json<Map<String, Value>>,
) -> StatusCode {
    if let Some(config) = shared.configs.lock().unwrap().get_mut(&name) {
        for field in &mut config.fields {
            if let Some(v) = values.get(&field.key) {
                field.value = v.clone();
            }
        }
    }
    shared.saved.lock().unwrap().push((name, values));
    StatusCode::OK
}

async fn webradio(
    State(shared): State<Arc<Shared>>,
    Json(command): Json<WebRadioCommand>,
) -> StatusCode {
    shared.radio_plays.lock().unwrap().push(command);
    StatusCode::OK
}

async fn search_stations(
    State(shared): State<Arc<Shared>>,
    axum::extract::Query(query): axum::extract::Query<HashMap<String, String>>,
) -> Json<Vec<RadioStation>> {
    let needle = query.get("name").cloned().unwrap_or_default().to_lowercase();
    shared.searches.lock().unwrap().push(query);
    let stations = shared
        .stations
        .lock()
        .unwrap()
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Json(stations)
}
