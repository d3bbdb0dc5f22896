mod common;

use std::fs;
use std::time::Duration;

use clinic_console::server::{router, serve_with_shutdown};
use common::{GOOD_TOKEN, spawn_fake_api};
use reqwest::StatusCode;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

struct Console {
    base: String,
    _assets: TempDir,
    _shutdown: oneshot::Sender<()>,
}

/// Start the console server in front of `upstream`, with a small built
/// console in a temp directory.
async fn start_console(upstream: &str) -> Console {
    let assets = TempDir::new().unwrap();
    fs::write(
        assets.path().join("index.html"),
        "<html><body>clinic console</body></html>",
    )
    .unwrap();
    fs::write(assets.path().join("app.js"), "console.log('app');").unwrap();

    let app = router(
        Url::parse(upstream).unwrap(),
        assets.path(),
        Duration::from_secs(5),
    )
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        serve_with_shutdown(listener, app, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    Console {
        base: format!("http://{addr}"),
        _assets: assets,
        _shutdown: tx,
    }
}

#[tokio::test]
async fn test_api_requests_are_forwarded_with_headers() {
    let api = spawn_fake_api().await;
    let console = start_console(&api.base_url).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/queue/details", console.base))
        .bearer_auth(GOOD_TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let rows: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(api.count("GET /api/queue/details"), 1);
}

#[tokio::test]
async fn test_upstream_status_and_body_pass_through() {
    let api = spawn_fake_api().await;
    let console = start_console(&api.base_url).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/queue/details", console.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "invalid token");
}

#[tokio::test]
async fn test_auth_requests_are_forwarded_with_body() {
    let api = spawn_fake_api().await;
    let console = start_console(&api.base_url).await;

    let response = reqwest::Client::new()
        .post(format!("{}/auth/login", console.base))
        .json(&serde_json::json!({ "username": "desk", "password": "pw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token"], GOOD_TOKEN);
}

#[tokio::test]
async fn test_static_assets_and_client_route_fallback() {
    let api = spawn_fake_api().await;
    let console = start_console(&api.base_url).await;
    let client = reqwest::Client::new();

    let script = client
        .get(format!("{}/app.js", console.base))
        .send()
        .await
        .unwrap();
    assert_eq!(script.status(), StatusCode::OK);
    assert_eq!(script.text().await.unwrap(), "console.log('app');");

    let route = client
        .get(format!("{}/dashboard/queue", console.base))
        .send()
        .await
        .unwrap();
    assert_eq!(route.status(), StatusCode::OK);
    assert!(route.text().await.unwrap().contains("clinic console"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Bind then drop to get a port nothing listens on
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let console = start_console(&format!("http://{addr}")).await;
    let response = reqwest::get(format!("{}/api/queue/details", console.base))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
