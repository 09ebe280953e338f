//! Playback view-model: the panel's single source of truth for what the
//! device is playing.
//!
//! Lifecycle per mount:
//! - `initialize` fetches the current state once.
//! - `subscribe` listens for `playback` events on the shared `EventSource`.
//! - Both background tasks post `PlaybackUpdate`s back to the UI task, which
//!   calls `apply`.  Whatever arrives last replaces the held state wholesale.
//! - `unmount` cancels both tasks and bumps the mount id, so an update that
//!   was already in flight is recognised as stale and dropped.
//!
//! Volume changes are fire-and-forget: the command is sent and the held
//! state is left alone until the device pushes (or a refetch returns) a new
//! snapshot.

use euphonium_proto::protocol::{
    EqualizerSettings, PlaybackState, VolumeCommand, PLAYBACK_EVENT,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::event_source::EventSource;

/// Messages from background tasks to the view-model.
#[derive(Debug)]
pub enum PlaybackUpdate {
    /// Result of the initial fetch or a manual refetch.
    Fetched {
        mount: u64,
        result: Result<PlaybackState, String>,
    },
    /// Raw payload of a `playback` push event.
    Pushed { mount: u64, payload: String },
    /// A volume command could not be delivered.
    VolumeFailed { volume: i32, error: String },
}

/// What `apply` did with an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Held state was replaced.
    Replaced,
    /// Payload failed to decode; held state untouched.
    Rejected,
    /// Update belongs to a mount that no longer exists.
    Stale,
    FetchFailed(String),
    VolumeFailed(String),
}

impl Applied {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, Applied::Replaced)
    }
}

struct Mount {
    id: u64,
    token: CancellationToken,
    initialized: bool,
    subscribed: bool,
}

pub struct PlaybackViewModel {
    state: Option<PlaybackState>,
    eq_open: bool,
    next_mount: u64,
    mount: Option<Mount>,
    updates: mpsc::Sender<PlaybackUpdate>,
}

impl PlaybackViewModel {
    pub fn new(updates: mpsc::Sender<PlaybackUpdate>) -> Self {
        Self {
            state: None,
            eq_open: false,
            next_mount: 1,
            mount: None,
            updates,
        }
    }

    /// Last snapshot received, or `None` while the state is unknown.
    pub fn state(&self) -> Option<&PlaybackState> {
        self.state.as_ref()
    }

    pub fn eq_open(&self) -> bool {
        self.eq_open
    }

    /// Equalizer settings to show in the popover: only when the popover is
    /// open and the device actually reported an equalizer.
    pub fn visible_equalizer(&self) -> Option<&EqualizerSettings> {
        if !self.eq_open {
            return None;
        }
        self.state.as_ref().and_then(|s| s.eq.as_ref())
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    pub fn mount_id(&self) -> Option<u64> {
        self.mount.as_ref().map(|m| m.id)
    }

    /// Start a mount: initial fetch plus push subscription.  A second call
    /// while mounted does nothing.
    pub fn mount(&mut self, api: &ApiClient, events: &EventSource) {
        if self.mount.is_none() {
            let id = self.next_mount;
            self.next_mount += 1;
            debug!("playback view-model mounted (mount {})", id);
            self.mount = Some(Mount {
                id,
                token: CancellationToken::new(),
                initialized: false,
                subscribed: false,
            });
        }
        self.initialize(api);
        self.subscribe(events);
    }

    /// Fetch the current state once per mount.  Returns `false` if this
    /// mount already fetched (or nothing is mounted).
    pub fn initialize(&mut self, api: &ApiClient) -> bool {
        let Some(mount) = self.mount.as_mut() else {
            return false;
        };
        if mount.initialized {
            return false;
        }
        mount.initialized = true;
        let (id, token) = (mount.id, mount.token.clone());
        self.spawn_fetch(api, id, token);
        true
    }

    /// Ask the device for a fresh snapshot outside the mount lifecycle
    /// (the user pressed refresh).
    pub fn refetch(&self, api: &ApiClient) -> bool {
        let Some(mount) = self.mount.as_ref() else {
            return false;
        };
        self.spawn_fetch(api, mount.id, mount.token.clone());
        true
    }

    fn spawn_fetch(&self, api: &ApiClient, mount: u64, token: CancellationToken) {
        let api = api.clone();
        let tx = self.updates.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                r = api.playback_state() => r,
            };
            let result = result.map_err(|e| e.to_string());
            let _ = tx.send(PlaybackUpdate::Fetched { mount, result }).await;
        });
    }

    /// Listen for `playback` push events once per mount.  The listener is
    /// registered independently of the held state and lives until unmount.
    pub fn subscribe(&mut self, events: &EventSource) -> bool {
        let Some(mount) = self.mount.as_mut() else {
            return false;
        };
        if mount.subscribed {
            return false;
        }
        mount.subscribed = true;

        let mut listener = events.listen(PLAYBACK_EVENT);
        let (id, token) = (mount.id, mount.token.clone());
        let tx = self.updates.clone();
        tokio::spawn(async move {
            loop {
                let payload = tokio::select! {
                    _ = token.cancelled() => break,
                    p = listener.recv() => p,
                };
                let Some(payload) = payload else {
                    debug!("playback listener: event source closed");
                    break;
                };
                if tx
                    .send(PlaybackUpdate::Pushed { mount: id, payload })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });
        true
    }

    /// Tear the mount down: stop listening, forget the state.
    pub fn unmount(&mut self) {
        if let Some(mount) = self.mount.take() {
            debug!("playback view-model unmounted (mount {})", mount.id);
            mount.token.cancel();
        }
        self.state = None;
        self.eq_open = false;
    }

    /// Fold a background update into the held state.
    pub fn apply(&mut self, update: PlaybackUpdate) -> Applied {
        match update {
            PlaybackUpdate::Fetched { mount, result } => {
                if !self.is_current(mount) {
                    return Applied::Stale;
                }
                match result {
                    Ok(state) => {
                        debug!("playback state fetched: {:?}", state.song.song_name);
                        self.state = Some(state);
                        Applied::Replaced
                    }
                    Err(e) => {
                        warn!("playback state fetch failed: {}", e);
                        Applied::FetchFailed(e)
                    }
                }
            }
            PlaybackUpdate::Pushed { mount, payload } => {
                if !self.is_current(mount) {
                    return Applied::Stale;
                }
                match PlaybackState::decode(&payload) {
                    Ok(state) => {
                        self.state = Some(state);
                        Applied::Replaced
                    }
                    Err(e) => {
                        warn!("ignoring playback event: {}", e);
                        Applied::Rejected
                    }
                }
            }
            PlaybackUpdate::VolumeFailed { volume, error } => {
                Applied::VolumeFailed(format!("volume {} not applied: {}", volume, error))
            }
        }
    }

    fn is_current(&self, mount: u64) -> bool {
        self.mount.as_ref().is_some_and(|m| m.id == mount)
    }

    /// Turn a slider stop into a volume command and fire it.  The held
    /// state is not touched; the new volume shows up when the device
    /// reports it.
    pub fn set_volume(&self, api: &ApiClient, slider: i32) -> VolumeCommand {
        let command = VolumeCommand::from_slider(slider);
        info!("volume slider {} -> {}%", slider, command.volume);
        let api = api.clone();
        let tx = self.updates.clone();
        tokio::spawn(async move {
            if let Err(e) = api.set_volume(command).await {
                warn!("volume command failed: {}", e);
                let _ = tx
                    .send(PlaybackUpdate::VolumeFailed {
                        volume: command.volume,
                        error: e.to_string(),
                    })
                    .await;
            }
        });
        command
    }

    pub fn toggle_equalizer_panel(&mut self) -> bool {
        self.eq_open = !self.eq_open;
        self.eq_open
    }
}

#[cfg(test)]
impl PlaybackViewModel {
    pub(crate) fn replace_state_for_test(&mut self, state: Option<PlaybackState>) {
        self.state = state;
    }
}

impl Drop for PlaybackViewModel {
    fn drop(&mut self) {
        if let Some(mount) = self.mount.take() {
            mount.token.cancel();
        }
    }
}
