// Web2Text Console - tests/e2e_stream.rs
//
// End-to-end tests for the live log stream over a real WebSocket.
//
// These tests run a real tungstenite server on a real socket and point
// the stream manager at it: real handshake, real frames, real reconnect
// behaviour. No mocks, no stubs.

use std::net::TcpListener;
use std::time::{Duration, Instant};
use tungstenite::Message;
use web2text_console::app::stream::{StreamManager, StreamProgress};
use web2text_console::core::model::Level;

/// Accept one WebSocket connection, send the given text frames, close.
fn one_shot_server(frames: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut socket = tungstenite::accept(stream).expect("handshake");
        for frame in frames {
            socket.send(Message::text(frame)).expect("send frame");
        }
        let _ = socket.close(None);
        // Drain until the peer closes so the close handshake completes.
        while socket.read().is_ok() {}
    });

    format!("ws://{addr}/ws/logs")
}

/// Poll the manager until the predicate is satisfied or the timeout hits,
/// accumulating every progress message seen.
fn collect_until(
    manager: &StreamManager,
    timeout: Duration,
    done: impl Fn(&[StreamProgress]) -> bool,
) -> Vec<StreamProgress> {
    let start = Instant::now();
    let mut seen = Vec::new();
    while start.elapsed() < timeout {
        seen.extend(manager.poll_progress());
        if done(&seen) {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    seen
}

fn events(seen: &[StreamProgress]) -> Vec<&web2text_console::core::model::LogEvent> {
    seen.iter()
        .filter_map(|p| match p {
            StreamProgress::Event(e) => Some(e),
            _ => None,
        })
        .collect()
}

/// Plain frames, a double-encoded frame, and garbage over one connection:
/// the good frames come through decoded, the garbage is reported as
/// malformed without dropping the connection, and the server close turns
/// into a reconnect announcement.
#[test]
fn e2e_stream_decodes_frames_and_survives_garbage() {
    let plain = serde_json::json!({
        "message": "Scraped 4 pages",
        "level": "success",
        "extra": {"site": "news.example.com"}
    })
    .to_string();

    // A frame the worker JSON-encoded twice: a JSON string whose content
    // is itself the JSON object.
    let inner = serde_json::json!({
        "message": "Worker heartbeat",
        "level": "info"
    })
    .to_string();
    let double_encoded = serde_json::to_string(&inner).expect("encode");

    let url = one_shot_server(vec![
        plain,
        double_encoded,
        "not json at all {{{".to_string(),
        "[1, 2, 3]".to_string(),
        serde_json::json!({"message": "after the garbage"}).to_string(),
    ]);

    let mut manager = StreamManager::new();
    manager.start(url);

    let seen = collect_until(&manager, Duration::from_secs(5), |seen| {
        events(seen).len() >= 3
            && seen
                .iter()
                .any(|p| matches!(p, StreamProgress::Disconnected { .. }))
    });
    manager.stop();

    assert!(
        matches!(seen.first(), Some(StreamProgress::Connected)),
        "first message should be Connected, got {seen:?}"
    );

    let decoded = events(&seen);
    assert_eq!(decoded.len(), 3, "progress was: {seen:?}");
    assert_eq!(decoded[0].message, "Scraped 4 pages");
    assert_eq!(decoded[0].level, Level::Success);
    assert!(decoded[0].has_extra());

    // The double-encoded frame decodes to the same event a plain frame would.
    assert_eq!(decoded[1].message, "Worker heartbeat");
    assert_eq!(decoded[1].level, Level::Info);

    // Missing level defaults to info, and the stream kept going past the
    // two bad frames.
    assert_eq!(decoded[2].message, "after the garbage");
    assert_eq!(decoded[2].level, Level::Info);

    let malformed: Vec<_> = seen
        .iter()
        .filter(|p| matches!(p, StreamProgress::Malformed { .. }))
        .collect();
    assert_eq!(malformed.len(), 2, "progress was: {seen:?}");
}

/// When the server goes away the manager announces the loss and schedules
/// reconnect attempts instead of dying silently.
#[test]
fn e2e_stream_announces_reconnect_after_server_close() {
    let url = one_shot_server(vec![
        serde_json::json!({"message": "only event"}).to_string()
    ]);

    let mut manager = StreamManager::new();
    manager.start(url);

    let seen = collect_until(&manager, Duration::from_secs(5), |seen| {
        seen.iter()
            .any(|p| matches!(p, StreamProgress::Reconnecting { .. }))
    });
    manager.stop();

    assert!(
        seen.iter()
            .any(|p| matches!(p, StreamProgress::Disconnected { .. })),
        "progress was: {seen:?}"
    );
    let reconnect = seen.iter().find_map(|p| match p {
        StreamProgress::Reconnecting { attempt, delay } => Some((*attempt, *delay)),
        _ => None,
    });
    let (attempt, delay) = reconnect.expect("a reconnect announcement");
    assert_eq!(attempt, 1);
    assert!(delay >= Duration::from_millis(1));
}

/// Stopping the manager tears the reader down promptly even while the
/// connection is idle.
#[test]
fn e2e_stream_stop_is_prompt() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut socket = tungstenite::accept(stream).expect("handshake");
        // Hold the connection open without sending anything.
        while socket.read().is_ok() {}
    });

    let mut manager = StreamManager::new();
    manager.start(format!("ws://{addr}/ws/logs"));

    // Wait for the connection to establish.
    let seen = collect_until(&manager, Duration::from_secs(5), |seen| {
        seen.iter().any(|p| matches!(p, StreamProgress::Connected))
    });
    assert!(
        seen.iter().any(|p| matches!(p, StreamProgress::Connected)),
        "progress was: {seen:?}"
    );

    manager.stop();
    assert!(!manager.is_active());
}
