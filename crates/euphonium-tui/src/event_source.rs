//! EventSource: one long-lived server-sent-events connection to the device.
//!
//! A single reader task owns the HTTP stream and fans decoded events out on a
//! broadcast channel.  Consumers call `listen(name)` to get a `Listener` that
//! only yields events with that name, so several views can share the one
//! connection.  The connection is owned: dropping the `EventSource` (or
//! cancelling its token) stops the reader task.
//!
//! Reconnect: when the stream ends or fails the reader waits for the
//! server-provided `retry:` delay (or the configured default) and reopens it,
//! sending `Last-Event-ID` if the server ever tagged an event.

use std::time::Duration;

use euphonium_proto::sse::{SseDecoder, SseEvent};
use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "live",
            ConnectionState::Closed => "offline",
        }
    }
}

pub struct EventSource {
    url: String,
    events: broadcast::Sender<SseEvent>,
    state: watch::Receiver<ConnectionState>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl EventSource {
    /// Open the connection and start the reader task.  Must be called from
    /// inside a tokio runtime.
    pub fn connect(
        http: Client,
        url: String,
        reconnect_delay: Duration,
        token: CancellationToken,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);

        let task = tokio::spawn(read_loop(
            http,
            url.clone(),
            reconnect_delay,
            events.clone(),
            state_tx,
            token.clone(),
        ));

        Self {
            url,
            events,
            state,
            token,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Register interest in events named `name`.  Events that arrived before
    /// this call are not replayed.
    pub fn listen(&self, name: &str) -> Listener {
        Listener {
            name: name.to_string(),
            rx: self.events.subscribe(),
        }
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.task.is_finished()
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Receives the payloads of one named event.
pub struct Listener {
    name: String,
    rx: broadcast::Receiver<SseEvent>,
}

impl Listener {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next payload for this listener's event name.  `None` once the
    /// connection has been torn down.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(ev) if ev.event == self.name => return Some(ev.data),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("listener {:?} lagged by {} events", self.name, n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

async fn read_loop(
    http: Client,
    url: String,
    default_delay: Duration,
    events: broadcast::Sender<SseEvent>,
    state: watch::Sender<ConnectionState>,
    token: CancellationToken,
) {
    let mut decoder = SseDecoder::new();

    'connect: loop {
        state.send_replace(ConnectionState::Connecting);

        let mut req = http
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Some(id) = decoder.last_event_id() {
            req = req.header("Last-Event-ID", id);
        }

        let sent = tokio::select! {
            _ = token.cancelled() => break 'connect,
            r = req.send() => r,
        };

        match sent {
            Ok(resp) if resp.status().is_success() => {
                info!("event stream open: {}", url);
                state.send_replace(ConnectionState::Open);
                let mut body = resp.bytes_stream();
                loop {
                    let next = tokio::select! {
                        _ = token.cancelled() => break 'connect,
                        n = body.next() => n,
                    };
                    match next {
                        Some(Ok(chunk)) => {
                            for ev in decoder.feed(&chunk) {
                                trace!("event {:?} ({} bytes)", ev.event, ev.data.len());
                                // No receivers is fine: nobody is listening yet.
                                let _ = events.send(ev);
                            }
                        }
                        Some(Err(e)) => {
                            warn!("event stream {} failed: {}", url, e);
                            break;
                        }
                        None => {
                            info!("event stream {} ended", url);
                            break;
                        }
                    }
                }
            }
            Ok(resp) => warn!("event stream {} answered {}", url, resp.status()),
            Err(e) => warn!("event stream {} unreachable: {}", url, e),
        }

        decoder.reset_partial();
        state.send_replace(ConnectionState::Closed);

        let delay = decoder.retry().unwrap_or(default_delay);
        debug!("reconnecting event stream in {:?}", delay);
        tokio::select! {
            _ = token.cancelled() => break 'connect,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    state.send_replace(ConnectionState::Closed);
    debug!("event stream reader for {} stopped", url);
}
