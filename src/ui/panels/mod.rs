// Web2Text Console - ui/panels/mod.rs

pub mod api_keys;
pub mod feed;
pub mod login;
pub mod logs;
pub mod settings;
pub mod sites;
