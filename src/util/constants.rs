// Web2Text Console - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Web2Text Console";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "Web2TextConsole";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Backend endpoints
// =============================================================================

/// Default backend base URL when neither the CLI nor config.toml sets one.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Path of the log stream WebSocket endpoint, relative to the base URL.
pub const LOG_STREAM_PATH: &str = "/ws/logs";

/// Request timeout for all REST calls.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Log stream limits
// =============================================================================

/// Maximum number of log entries held in the live console buffer.
/// Appending past this cap evicts the oldest entry (FIFO).
pub const MAX_LOG_ENTRIES: usize = 200;

/// Socket read timeout for the stream reader thread. Bounds how long a
/// blocked read can delay a cancel-flag check.
pub const STREAM_READ_TIMEOUT_MS: u64 = 200;

/// How often the cancel flag is checked while sleeping between
/// reconnection attempts.
pub const STREAM_CANCEL_CHECK_INTERVAL_MS: u64 = 100;

/// First reconnection delay. Subsequent attempts double this value.
pub const STREAM_BACKOFF_BASE_MS: u64 = 500;

/// Upper bound on the reconnection delay.
pub const STREAM_BACKOFF_MAX_MS: u64 = 30_000;

/// Reconnection attempts before the stream reader gives up. The user can
/// re-enter the Logs view to start a fresh connection cycle.
pub const STREAM_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Maximum characters of a malformed frame included in diagnostics.
pub const MAX_FRAME_PREVIEW: usize = 200;

// =============================================================================
// Per-frame UI message budgets
// =============================================================================

/// Maximum REST-response events processed by the UI update loop per frame.
/// Remaining events stay queued and are processed on subsequent frames.
pub const MAX_API_MESSAGES_PER_FRAME: usize = 100;

/// Maximum log-stream events processed per UI frame. A bursty backend can
/// queue many frames between repaints; this cap keeps frame times stable.
pub const MAX_STREAM_MESSAGES_PER_FRAME: usize = 200;

// =============================================================================
// Feed defaults
// =============================================================================

/// Default number of feed records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Minimum user-configurable feed page size.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Maximum user-configurable feed page size.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Default lookback window for the feed "since" filter, in hours.
pub const DEFAULT_FEED_LOOKBACK_HOURS: i64 = 24;

/// Selectable lookback windows for the feed "since" filter, as
/// (hours, label) pairs.
pub const FEED_LOOKBACK_PRESETS: &[(i64, &str)] = &[
    (1, "Last hour"),
    (24, "Last 24 hours"),
    (168, "Last 7 days"),
    (720, "Last 30 days"),
];

// =============================================================================
// Settings
// =============================================================================

/// Worker settings editable from the Settings view. The backend notifies
/// the worker when one of these changes.
pub const WORKER_SETTING_KEYS: &[&str] = &["scrape_interval_minutes", "lookback_days"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
