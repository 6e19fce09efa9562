//! Shared mock servers and fixtures for integration tests.

#![allow(dead_code)]

use homelab_automation::config::{ForwardScheme, ServiceDescriptor};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "changeme";
pub const TOKEN: &str = "test_token_12345";

/// Start a mock proxy manager that issues `TOKEN` and lists `hosts`.
pub async fn start_proxy_manager(hosts: Value) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens"))
        .and(body_partial_json(json!({"identity": EMAIL, "secret": PASSWORD})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "expires": "2030-01-01T00:00:00.000Z"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/nginx/proxy-hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hosts))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Start a mock hub whose `/api/states` returns `entities`.
pub async fn start_hub(entities: Value) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entities))
        .mount(&mock_server)
        .await;

    mock_server
}

pub fn service(name: &str, port: u16) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        forward_scheme: ForwardScheme::Http,
        forward_host: name.to_string(),
        forward_port: port,
        websocket: false,
        cache_assets: false,
        block_exploits: true,
        allow_websocket_upgrade: false,
        ssl_forced: true,
    }
}
