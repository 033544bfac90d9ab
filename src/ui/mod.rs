// Web2Text Console - ui/mod.rs
//
// UI layer: panels render into egui and communicate outward solely by
// mutating AppState (request members drained by gui.rs each frame).

pub mod panels;
pub mod theme;
