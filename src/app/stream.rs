// Web2Text Console - app/stream.rs
//
// Live log stream: maintains a WebSocket connection to the backend's
// /ws/logs endpoint and forwards decoded log events to the UI.
//
// Architecture:
//   - `StreamManager` lives on the UI thread; `run_stream_reader` runs on a
//     background thread owning the socket.
//   - An `Arc<AtomicBool>` cancel flag allows the UI to stop the stream.
//   - Decoded events are sent as `StreamProgress::Event` over an mpsc channel;
//     the UI thread polls the channel each frame (same pattern as Dispatcher).
//   - A malformed frame is reported and skipped; it never tears the
//     connection down.
//   - On disconnect the reader retries with bounded exponential backoff and
//     jitter, announcing each attempt so the UI can show a reconnecting
//     badge. After STREAM_MAX_RECONNECT_ATTEMPTS consecutive failures it
//     gives up and sends `Stopped`.
//
// The socket read timeout is kept short so the cancel flag is honoured
// within STREAM_READ_TIMEOUT_MS even while blocked waiting for a frame.

use crate::core::backoff::Backoff;
use crate::core::model::LogEvent;
use crate::core::stream::decode_frame;
use crate::util::constants::{
    MAX_FRAME_PREVIEW, MAX_STREAM_MESSAGES_PER_FRAME, STREAM_CANCEL_CHECK_INTERVAL_MS,
    STREAM_MAX_RECONNECT_ATTEMPTS, STREAM_READ_TIMEOUT_MS,
};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

// =============================================================================
// Public types
// =============================================================================

/// Progress messages sent from the background reader thread to the UI.
#[derive(Debug)]
pub enum StreamProgress {
    /// Connection established (initial connect or successful reconnect).
    Connected,
    /// One decoded log event.
    Event(LogEvent),
    /// A frame that failed strict decoding. Skipped, connection intact.
    Malformed { reason: String, preview: String },
    /// Connection lost; a reconnect attempt is scheduled after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
    /// Connection lost with no further retries pending.
    Disconnected { reason: String },
    /// Reader thread exited (cancelled or retries exhausted).
    Stopped,
}

// =============================================================================
// StreamManager
// =============================================================================

/// Manages the live log stream on a background thread.
///
/// The manager lives on the UI thread and exposes a simple start/stop/poll
/// interface that mirrors `Dispatcher`.
pub struct StreamManager {
    /// Channel receiver for the UI to poll stream progress messages.
    pub progress_rx: Option<mpsc::Receiver<StreamProgress>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl StreamManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
        }
    }

    /// Start streaming from the given ws:// or wss:// URL.
    ///
    /// Spawns a background reader thread immediately. If a stream is already
    /// running it is stopped first.
    pub fn start(&mut self, url: String) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        tracing::info!(%url, "Log stream starting");
        std::thread::spawn(move || {
            run_stream_reader(url, tx, cancel);
        });
    }

    /// Request the background reader thread to stop.
    ///
    /// The thread will notice within STREAM_READ_TIMEOUT_MS (or one backoff
    /// slice if it is between reconnect attempts) and exit.
    pub fn stop(&mut self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
        self.cancel_flag = None;
        self.progress_rx = None;
    }

    /// Returns `true` if a reader background thread is currently active.
    pub fn is_active(&self) -> bool {
        self.cancel_flag.is_some()
    }

    /// Poll for pending stream progress messages without blocking.
    /// Bounded per frame so a bursty backend cannot stall the render loop.
    pub fn poll_progress(&self) -> Vec<StreamProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < MAX_STREAM_MESSAGES_PER_FRAME {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        messages
    }
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Background reader
// =============================================================================

/// Outcome of one connection's read loop, driving the retry decision.
enum SessionEnd {
    /// Cancel flag observed; exit without retrying.
    Cancelled,
    /// Server closed or the transport failed; retry with backoff.
    Lost(String),
}

fn run_stream_reader(url: String, tx: mpsc::Sender<StreamProgress>, cancel: Arc<AtomicBool>) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // UI channel closed — exit silently.
                return;
            }
        };
    }

    let mut backoff = Backoff::new();

    loop {
        if cancel.load(Ordering::SeqCst) {
            send!(StreamProgress::Stopped);
            return;
        }

        match connect(&url) {
            Ok(socket) => {
                backoff.reset();
                send!(StreamProgress::Connected);

                match read_loop(socket, &tx, &cancel) {
                    SessionEnd::Cancelled => {
                        send!(StreamProgress::Stopped);
                        return;
                    }
                    SessionEnd::Lost(reason) => {
                        tracing::warn!(%url, %reason, "Log stream connection lost");
                        send!(StreamProgress::Disconnected { reason });
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Log stream connect failed");
            }
        }

        let attempt = backoff.attempt();
        if attempt >= STREAM_MAX_RECONNECT_ATTEMPTS {
            tracing::error!(%url, attempts = attempt, "Log stream giving up");
            send!(StreamProgress::Disconnected {
                reason: format!("Gave up after {attempt} reconnect attempts"),
            });
            send!(StreamProgress::Stopped);
            return;
        }

        let delay = backoff.next_delay();
        send!(StreamProgress::Reconnecting {
            attempt: attempt + 1,
            delay,
        });

        // Interruptible backoff sleep: check cancel flag between slices.
        let mut remaining = delay;
        let slice = Duration::from_millis(STREAM_CANCEL_CHECK_INTERVAL_MS);
        while !remaining.is_zero() {
            std::thread::sleep(remaining.min(slice));
            remaining = remaining.saturating_sub(slice);
            if cancel.load(Ordering::SeqCst) {
                send!(StreamProgress::Stopped);
                return;
            }
        }
    }
}

/// Open the socket and put the underlying TCP stream into short-timeout
/// mode so the read loop can poll the cancel flag.
fn connect(url: &str) -> tungstenite::Result<WebSocket<MaybeTlsStream<TcpStream>>> {
    let (socket, _response) = tungstenite::connect(url)?;

    let timeout = Some(Duration::from_millis(STREAM_READ_TIMEOUT_MS));
    match socket.get_ref() {
        MaybeTlsStream::Plain(s) => {
            let _ = s.set_read_timeout(timeout);
        }
        MaybeTlsStream::Rustls(s) => {
            let _ = s.get_ref().set_read_timeout(timeout);
        }
        _ => {}
    }

    Ok(socket)
}

/// Read frames until the connection drops or cancel is requested.
fn read_loop(
    mut socket: WebSocket<MaybeTlsStream<TcpStream>>,
    tx: &mpsc::Sender<StreamProgress>,
    cancel: &Arc<AtomicBool>,
) -> SessionEnd {
    loop {
        if cancel.load(Ordering::SeqCst) {
            // Best effort; the server will notice the TCP close regardless.
            let _ = socket.close(None);
            return SessionEnd::Cancelled;
        }

        match socket.read() {
            Ok(Message::Text(text)) => match decode_frame(text.as_str()) {
                Ok(event) => {
                    if tx.send(StreamProgress::Event(event)).is_err() {
                        return SessionEnd::Cancelled;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Log stream: malformed frame skipped");
                    let msg = StreamProgress::Malformed {
                        reason: e.to_string(),
                        preview: frame_preview(text.as_str()),
                    };
                    if tx.send(msg).is_err() {
                        return SessionEnd::Cancelled;
                    }
                }
            },
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // tungstenite answers pings internally on the next write/read.
            }
            Ok(Message::Close(frame)) => {
                let reason = match frame {
                    Some(f) => format!("Server closed connection: {}", f.reason),
                    None => "Server closed connection".to_string(),
                };
                return SessionEnd::Lost(reason);
            }
            Ok(Message::Binary(_)) | Ok(Message::Frame(_)) => {
                // The backend only sends text frames; ignore anything else.
            }
            Err(tungstenite::Error::Io(e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Read timeout expired; loop back to the cancel check.
            }
            Err(e) => {
                return SessionEnd::Lost(e.to_string());
            }
        }
    }
}

/// Truncate a raw frame for display in the log viewer without flooding it.
fn frame_preview(raw: &str) -> String {
    if raw.chars().count() <= MAX_FRAME_PREVIEW {
        raw.to_string()
    } else {
        let truncated: String = raw.chars().take(MAX_FRAME_PREVIEW).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_starts_inactive() {
        let m = StreamManager::new();
        assert!(!m.is_active());
        assert!(m.poll_progress().is_empty());
    }

    #[test]
    fn stop_clears_channel_and_flag() {
        let mut m = StreamManager::new();
        m.start("ws://127.0.0.1:1/ws/logs".to_string());
        assert!(m.is_active());
        m.stop();
        assert!(!m.is_active());
        assert!(m.poll_progress().is_empty());
    }

    #[test]
    fn frame_preview_truncates_long_frames() {
        let long = "x".repeat(MAX_FRAME_PREVIEW * 2);
        let preview = frame_preview(&long);
        assert_eq!(preview.chars().count(), MAX_FRAME_PREVIEW + 1);
        assert!(preview.ends_with('…'));
        assert_eq!(frame_preview("short"), "short");
    }
}
