// Web2Text Console - lib.rs
//
// Library crate root. The binary (main.rs + gui.rs) wires these layers
// into an eframe application:
//
//   core     - pure data: DTOs, the bounded log buffer, frame decoding, backoff
//   api      - blocking REST client with the shared cookie session
//   app      - UI-facing state plus background workers (dispatcher, stream)
//   ui       - egui panels and theme
//   platform - platform directories and config.toml
//   util     - constants, errors, logging

pub mod api;
pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
