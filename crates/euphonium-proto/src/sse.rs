//! Incremental decoder for the `text/event-stream` wire format.
//!
//! Bytes arrive in arbitrary chunks from the HTTP body; `SseDecoder::feed`
//! buffers partial lines and returns every event completed by the chunk.
//! A blank line dispatches the event being built.  Events with no data lines
//! are dropped, as are `:` comment lines (the device sends them as
//! keep-alives).

use std::time::Duration;

/// Name given to events that carry no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
    retry: Option<Duration>,
    /// Set when the previous chunk ended on `\r`; a leading `\n` in the next
    /// chunk belongs to the same line break.
    pending_cr: bool,
    /// False until the first line of the current stream has been read.
    mid_stream: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconnection delay requested by the server, if any.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Id of the last dispatched event; sent back as `Last-Event-ID` on
    /// reconnect.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Drop any half-received event.  Called when the connection is lost.
    pub fn reset_partial(&mut self) {
        self.buf.clear();
        self.event = None;
        self.data.clear();
        self.pending_cr = false;
        self.mid_stream = false;
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut out = Vec::new();
        let mut rest = chunk;

        if self.pending_cr {
            self.pending_cr = false;
            if let Some((b'\n', tail)) = rest.split_first() {
                rest = tail;
            }
        }

        while let Some(pos) = rest.iter().position(|b| *b == b'\n' || *b == b'\r') {
            self.buf.extend_from_slice(&rest[..pos]);
            let mut line = String::from_utf8_lossy(&self.buf).into_owned();
            self.buf.clear();
            if !self.mid_stream {
                self.mid_stream = true;
                if let Some(rest) = line.strip_prefix('\u{FEFF}') {
                    line = rest.to_string();
                }
            }

            if rest[pos] == b'\r' {
                match rest.get(pos + 1) {
                    Some(b'\n') => rest = &rest[pos + 2..],
                    Some(_) => rest = &rest[pos + 1..],
                    None => {
                        self.pending_cr = true;
                        rest = &[];
                    }
                }
            } else {
                rest = &rest[pos + 1..];
            }

            if let Some(ev) = self.process_line(&line) {
                out.push(ev);
            }
        }
        self.buf.extend_from_slice(rest);
        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = Some(value.to_string());
                }
            }
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(ms));
                }
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}
