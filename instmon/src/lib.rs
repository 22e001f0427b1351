//! instmon client library: stream decoding, rolling windows, instance API
//! helpers and the terminal dashboard.

pub mod api;
pub mod app;
pub mod cli;
pub mod history;
pub mod types;
pub mod ui;
pub mod ws;
