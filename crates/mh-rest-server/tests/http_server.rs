// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Runs the server on a real socket and talks to it over HTTP

use mh_rest_server::{mock_dependencies::MockServerDependencies, Server, ServerConfig};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::time::Duration;
use tokio::task::JoinHandle;

async fn spawn_mock_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind to ephemeral port");
    let addr = listener.local_addr().expect("port");
    drop(listener);

    let config = ServerConfig {
        bind_addr: addr,
        ..Default::default()
    };
    let deps = MockServerDependencies::new(config.clone()).await.expect("mock deps");
    let server = Server::with_state(config, deps.into_state()).expect("server");
    let base = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    wait_for_health(&base).await;
    (base, handle)
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    let health = format!("{base_url}/api/health");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(response) = client.get(&health).send().await {
            if response.status().is_success() {
                return;
            }
        }
        if tokio::time::Instant::now() > deadline {
            panic!("mock server did not become healthy at {health}");
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::test]
async fn repository_lifecycle_over_http() {
    let (base, handle) = spawn_mock_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/repos"))
        .header("x-acting-user", "1")
        .json(&json!({"name": "over-http", "description": "made over a socket"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let listed: Value = client
        .get(format!("{base}/api/repos"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = client
        .delete(format!("{base}/api/repos/{id}"))
        .header("x-acting-user", "1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let outcome: Value = response.json().await.unwrap();
    assert_eq!(outcome["remote_cleanup_succeeded"], true);

    handle.abort();
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() {
    let (base, handle) = spawn_mock_server().await;
    let client = reqwest::Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/repos"))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,x-acting-user")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-acting-user"), "{allowed}");
    assert!(allowed.contains("content-type"), "{allowed}");

    handle.abort();
}
