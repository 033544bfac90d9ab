// Web2Text Console - core/stream.rs
//
// Log stream buffer and frame decoding. Pure logic, no sockets.
//
// The buffer keeps the most recent MAX_LOG_ENTRIES events in arrival
// order; appending past the cap evicts the oldest entry (FIFO, not LRU).
//
// Frames follow one strict schema. The worker historically pushed frames
// through two JSON encoders, so a frame whose top level is a JSON string
// gets exactly one extra decode; anything deeper or otherwise malformed
// is rejected with a FrameError rather than guessed at.

use crate::core::model::LogEvent;
use crate::util::constants::MAX_LOG_ENTRIES;
use crate::util::error::FrameError;
use std::collections::VecDeque;

// =============================================================================
// LogBuffer
// =============================================================================

/// Bounded, ephemeral view of the most recent log events.
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: VecDeque<LogEvent>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    /// Append an event, evicting the oldest entry once the cap is reached.
    pub fn push(&mut self, event: LogEvent) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries (the console's Clear button).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Frame decoding
// =============================================================================

/// Decode one inbound text frame into a `LogEvent`.
///
/// Accepts the strict schema `{message, level, extra, timestamp?}` and the
/// legacy double-encoded form where that object arrives as a JSON string.
pub fn decode_frame(raw: &str) -> Result<LogEvent, FrameError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| FrameError::Syntax { source })?;

    let value = match value {
        // Legacy framing: the payload is a JSON-encoded string. One extra
        // decode is tolerated; a string inside the string is rejected.
        serde_json::Value::String(inner) => {
            let inner: serde_json::Value =
                serde_json::from_str(&inner).map_err(|source| FrameError::Syntax { source })?;
            if inner.is_string() {
                return Err(FrameError::DepthExceeded);
            }
            inner
        }
        other => other,
    };

    if !value.is_object() {
        return Err(FrameError::Schema {
            detail: format!("expected a JSON object, got {}", kind_of(&value)),
        });
    }

    serde_json::from_value(value).map_err(|e| FrameError::Schema {
        detail: e.to_string(),
    })
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
