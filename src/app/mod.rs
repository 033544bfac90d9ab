// Web2Text Console - app/mod.rs
//
// Application layer: UI-facing state plus the background workers that
// talk to the backend (REST dispatcher and WebSocket log stream).

pub mod dispatch;
pub mod state;
pub mod stream;
