// Web2Text Console - platform/mod.rs

pub mod config;
