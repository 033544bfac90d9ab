// Web2Text Console - api/mod.rs
//
// Transport layer: the blocking REST client. The live log stream has its
// own manager in `app::stream`.

pub mod client;

pub use client::ApiClient;
