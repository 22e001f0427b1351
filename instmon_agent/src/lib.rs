//! instmon agent: instance registry plus a simulated telemetry stream per
//! WebSocket subscriber.

pub mod api;
pub mod config;
pub mod error;
pub mod producers;
pub mod registry;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;
