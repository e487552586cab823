//! Shared helpers for the API tests.

use axum::extract::ConnectInfo;
use axum::Extension;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use config::Config;
use shoutbox_core::flood_control::ManualClock;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::router::ApiRoutes;
use crate::app_state::{AppState, SharedAppState};
use crate::settings::config::Settings;
use crate::stop_flag::StopFlag;

pub const EDITOR_TOKEN: &str = "editor-token";
pub const MEMBER_TOKEN: &str = "member-token";

/// Socket peer of every request sent through [`create_test_server`]. It lies
/// inside the trusted proxy network of `tests/test_config.yaml`, so tests
/// pick their client address with `X-Forwarded-For`.
pub const PROXY_PEER: ([u8; 4], u16) = ([10, 0, 0, 1], 44321);

pub fn load_test_settings(overrides: &[(&str, config::Value)]) -> Settings {
    let mut builder = Config::builder().add_source(config::File::with_name("tests/test_config.yaml"));
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.clone()).unwrap();
    }
    Settings::from_config(builder.build().unwrap()).unwrap()
}

pub fn create_test_app_state(settings: Settings) -> (SharedAppState, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let state = AppState::from_parts(settings, Arc::new(clock.clone()), StopFlag::new());
    (state, clock)
}

pub fn create_test_server(state: SharedAppState) -> TestServer {
    let app = ApiRoutes::create(state)
        .unwrap()
        .layer(Extension(ConnectInfo(SocketAddr::from(PROXY_PEER))));
    TestServer::new(app).unwrap()
}
