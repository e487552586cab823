//! End-to-end checks over a real HTTP transport, so flood control sees the
//! socket peer address.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, TimeZone, Utc};
use config::Config;
use serde_json::{json, Value};
use shoutbox::api::router::ApiRoutes;
use shoutbox::app_state::AppState;
use shoutbox::settings::config::Settings;
use shoutbox::stop_flag::StopFlag;
use shoutbox_core::flood_control::ManualClock;

fn create_server(trusted_proxies: Option<Vec<&str>>) -> (TestServer, ManualClock) {
    let mut builder =
        Config::builder().add_source(config::File::with_name("tests/test_config.yaml"));
    if let Some(trusted_proxies) = trusted_proxies {
        builder = builder
            .set_override("api.trusted_proxies", trusted_proxies)
            .unwrap();
    }
    let config = builder.build().unwrap();
    let settings = Settings::from_config(config).unwrap();

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let state = AppState::from_parts(settings, Arc::new(clock.clone()), StopFlag::new());
    let app = ApiRoutes::create(state).unwrap();

    let server = TestServer::builder()
        .http_transport()
        .build(app.into_make_service_with_connect_info::<SocketAddr>())
        .unwrap();
    (server, clock)
}

async fn post_shout(server: &TestServer, forwarded_for: Option<&'static str>, message: &str) -> Value {
    let mut request = server.post("/api/v1/modules/1/shouts");
    if let Some(address) = forwarded_for {
        request = request.add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static(address),
        );
    }
    let response = request.json(&json!({ "message": message })).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()
}

#[tokio::test]
async fn test_peer_address_is_the_client_identity() {
    let (server, clock) = create_server(None);

    assert_eq!(post_shout(&server, None, "hello over tcp").await["success"], true);
    assert_eq!(post_shout(&server, None, "again").await["success"], false);

    clock.advance(Duration::minutes(2));
    let body = post_shout(&server, None, "later").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_forwarded_headers_from_untrusted_peer_are_ignored() {
    let (server, _clock) = create_server(None);

    assert_eq!(post_shout(&server, None, "first").await["success"], true);

    for address in ["198.51.100.1", "198.51.100.2", "198.51.100.3"] {
        let body = post_shout(&server, Some(address), "fresh bucket?").await;
        assert_eq!(body["success"], false);
    }
    let response = server
        .post("/api/v1/modules/1/shouts")
        .add_header(
            HeaderName::from_static("x-real-ip"),
            HeaderValue::from_static("198.51.100.9"),
        )
        .json(&json!({ "message": "fresh bucket?" }))
        .await;
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_address() {
    let (server, _clock) = create_server(Some(vec!["127.0.0.1", "::1"]));

    assert_eq!(post_shout(&server, Some("192.0.2.44"), "from client a").await["success"], true);
    assert_eq!(post_shout(&server, Some("192.0.2.44"), "again from a").await["success"], false);

    let body = post_shout(&server, Some("192.0.2.45"), "from client b").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 2);
}
