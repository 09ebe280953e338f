use euphonium_proto::config::Config;
use euphonium_proto::protocol::{PlaybackState, PlaybackStatus, PLAYBACK_EVENT};
use euphonium_proto::sse::SseDecoder;

fn snapshot(song: &str, volume: i32, status: &str) -> String {
    format!(
        r#"{{"song":{{"songName":"{song}","artistName":"A","albumName":"B","sourceName":"cspot","icon":""}},"volume":{volume},"status":"{status}"}}"#
    )
}

/// What the panel keeps after a stream: the last `playback` event that
/// decoded.  Other event names and broken payloads leave it alone.
fn last_playback(chunks: &[&[u8]]) -> Option<PlaybackState> {
    let mut decoder = SseDecoder::new();
    let mut held = None;
    for chunk in chunks {
        for ev in decoder.feed(chunk) {
            if ev.event != PLAYBACK_EVENT {
                continue;
            }
            if let Ok(state) = PlaybackState::decode(&ev.data) {
                held = Some(state);
            }
        }
    }
    held
}

#[test]
fn playback_events_replace_in_arrival_order() {
    let stream = format!(
        ": keep-alive\n\nevent: playback\ndata: {}\n\nevent: plugins\ndata: []\n\nevent: playback\ndata: {}\n\n",
        snapshot("First", 20, "playing"),
        snapshot("Second", 80, "paused"),
    );

    // Byte-at-a-time delivery must give the same result as one chunk.
    let whole = last_playback(&[stream.as_bytes()]).expect("state");
    let bytes: Vec<&[u8]> = stream.as_bytes().chunks(1).collect();
    let split = last_playback(&bytes).expect("state");

    assert_eq!(whole, split);
    assert_eq!(whole.song.song_name, "Second");
    assert_eq!(whole.volume, 80);
    assert_eq!(whole.status, PlaybackStatus::Paused);
    assert_eq!(whole.slider_position(), 12);
}

#[test]
fn broken_payload_keeps_previous_state() {
    let stream = format!(
        "event: playback\r\ndata: {}\r\n\r\nevent: playback\r\ndata: {{\"song\":\r\n\r\nevent: playback\r\ndata:\r\n\r\n",
        snapshot("Kept", 33, "playing"),
    );
    let held = last_playback(&[stream.as_bytes()]).expect("state");
    assert_eq!(held.song.song_name, "Kept");
    assert_eq!(held.status, PlaybackStatus::Playing);
}

#[test]
fn unknown_status_still_decodes() {
    let stream = format!(
        "event: playback\ndata: {}\n\n",
        snapshot("Odd", 10, "buffering")
    );
    let held = last_playback(&[stream.as_bytes()]).expect("state");
    assert_eq!(held.status, PlaybackStatus::Unknown);
    assert_eq!(held.status.transport_icon(), "play");
}

#[test]
fn config_written_on_first_load_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let first = Config::load_from(&path).unwrap();
    assert!(path.exists());

    let mut edited = first.clone();
    edited.service.base_url = "http://10.0.0.7".to_string();
    edited.ui.compact_width = 100;
    edited.save_to(&path).unwrap();

    let reread = Config::load_from(&path).unwrap();
    assert_eq!(reread.service.base_url, "http://10.0.0.7");
    assert_eq!(reread.ui.compact_width, 100);
    assert_eq!(reread.service.playback_url(), "http://10.0.0.7/playback");
}
