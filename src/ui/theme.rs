// Web2Text Console - ui/theme.rs
//
// Colour scheme, log-level colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::app::state::ConnState;
use crate::core::model::Level;
use egui::Color32;

/// Colour for a given log level.
pub fn level_colour(level: &Level) -> Color32 {
    match level {
        Level::Error => Color32::from_rgb(220, 38, 38),    // Red 600
        Level::Warning => Color32::from_rgb(217, 119, 6),  // Amber 600
        Level::Success => Color32::from_rgb(22, 163, 74),  // Green 600
        Level::Info => Color32::from_rgb(209, 213, 219),   // Gray 300
    }
}

/// Badge colour for the stream connection state.
pub fn conn_colour(conn: &ConnState) -> Color32 {
    match conn {
        ConnState::Live => Color32::from_rgb(22, 163, 74),          // Green 600
        ConnState::Connecting => Color32::from_rgb(217, 119, 6),    // Amber 600
        ConnState::Reconnecting { .. } => Color32::from_rgb(217, 119, 6),
        ConnState::Disconnected => Color32::from_rgb(220, 38, 38),  // Red 600
        ConnState::Idle => Color32::from_rgb(107, 114, 128),        // Gray 500
    }
}

/// Human-readable label for the stream connection state.
pub fn conn_label(conn: &ConnState) -> String {
    match conn {
        ConnState::Live => "Live".to_string(),
        ConnState::Connecting => "Connecting…".to_string(),
        ConnState::Reconnecting { attempt } => format!("Reconnecting (attempt {attempt})…"),
        ConnState::Disconnected => "Disconnected".to_string(),
        ConnState::Idle => "Idle".to_string(),
    }
}

/// Accent colour for enabled/positive chips (active sites, active keys).
pub const ACCENT_OK: Color32 = Color32::from_rgb(22, 163, 74); // Green 600
/// Muted colour for disabled/inactive chips.
pub const MUTED: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500
/// Error text colour for inline form and load errors.
pub const ERROR_TEXT: Color32 = Color32::from_rgb(220, 38, 38); // Red 600

/// Status bar colours.
pub const STATUS_BG: Color32 = Color32::from_rgb(31, 41, 55); // Gray 800
pub const STATUS_TEXT: Color32 = Color32::from_rgb(209, 213, 219); // Gray 300

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 200.0;
pub const ROW_HEIGHT: f32 = 20.0;
pub const STATUS_BAR_HEIGHT: f32 = 28.0;
pub const LOGIN_FORM_WIDTH: f32 = 320.0;
pub const FORM_WIDTH: f32 = 420.0;
