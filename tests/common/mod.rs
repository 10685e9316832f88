//! Shared helpers for the integration tests.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;

use clickexpress_cms::api;
use clickexpress_cms::app_state::AppState;
use clickexpress_cms::config::ServerConfig;

/// Spins up the server on an OS-assigned port with seeded in-memory
/// storage, returning the `/api` base URL.
pub async fn spawn_test_server() -> String {
    spawn_with_config(ServerConfig::default()).await
}

/// Same as [`spawn_test_server`] with a custom configuration.
pub async fn spawn_with_config(config: ServerConfig) -> String {
    let Ok(state) = AppState::in_memory(&config).await else {
        panic!("state should build");
    };
    let app = api::build_app(state, &config);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    base_url(addr)
}

/// An `/api` base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    drop(listener);
    base_url(addr)
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}/api")
}

/// Signs in as the default admin and returns the bearer token.
pub async fn admin_token(http: &reqwest::Client, base: &str) -> String {
    let Ok(resp) = http
        .post(format!("{base}/auth/login"))
        .json(&serde_json::json!({ "username": "admin", "password": "admin123" }))
        .send()
        .await
    else {
        panic!("login request failed");
    };
    let Ok(body) = resp.json::<serde_json::Value>().await else {
        panic!("login body should be JSON");
    };
    let Some(token) = body["token"].as_str() else {
        panic!("login should return a token: {body}");
    };
    token.to_string()
}
