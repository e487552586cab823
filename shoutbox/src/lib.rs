//! shoutbox library
//!
//! Exposes the API router and app state so the server can be exercised
//! end to end from integration tests.

pub mod api;
pub mod app_state;
pub mod http;
pub mod init_telemetry;
pub mod scheduler;
pub mod services;
pub mod settings;
pub mod stop_flag;

pub use app_state::AppState;
