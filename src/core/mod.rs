// Web2Text Console - core/mod.rs
//
// Core data model and pure logic. No I/O, no UI, no sockets.
// These types are the shared vocabulary across all layers.

pub mod backoff;
pub mod model;
pub mod stream;
