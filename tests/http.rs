//! HTTP bootstrap tests driven through the router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use blog_service::config::Settings;
use blog_service::http::{HttpServer, X_REQUEST_ID};
use blog_service::lifecycle::Shutdown;
use tower::ServiceExt;

mod common;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_ping_logs_with_request_id() {
    let (logger, sink) = common::memory_logger();
    let server = HttpServer::new(Arc::new(Settings::default()), logger);

    let request = Request::builder()
        .uri("/ping")
        .header(X_REQUEST_ID, "req-123")
        .body(Body::empty())
        .unwrap();
    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[X_REQUEST_ID], "req-123");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"pong");

    let records = common::records(&sink);
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["level"], "debug");
    assert_eq!(records[0]["message"], "ping req-123");

    let access = &records[1];
    assert_eq!(access["message"], "request completed");
    assert_eq!(access["request_id"], "req-123");
    assert_eq!(access["method"], "GET");
    assert_eq!(access["path"], "/ping");
    assert_eq!(access["status"], 200);
    assert!(access["latency_us"].is_u64());
}

#[tokio::test]
async fn test_request_id_generated_when_absent() {
    let (logger, sink) = common::memory_logger();
    let server = HttpServer::new(Arc::new(Settings::default()), logger);

    let response = server.router().oneshot(get("/ping")).await.unwrap();
    let id = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
    let parsed = uuid::Uuid::parse_str(&id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);

    let records = common::records(&sink);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["request_id"] == id.as_str()));
}

#[tokio::test]
async fn test_paging_reflects_settings() {
    let (logger, _) = common::memory_logger();
    let mut settings = Settings::default();
    settings.app.default_page_size = 15;
    let server = HttpServer::new(Arc::new(settings), logger);

    let response = server.router().oneshot(get("/api/v1/paging")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "default_page_size": 15, "max_page_size": 100 }));
}

#[tokio::test]
async fn test_unknown_route_is_logged() {
    let (logger, sink) = common::memory_logger();
    let server = HttpServer::new(Arc::new(Settings::default()), logger);

    let response = server.router().oneshot(get("/api/v1/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let records = common::records(&sink);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["level"], "Warn");
    assert_eq!(records[0]["uri"], "/api/v1/missing");
    assert_eq!(records[1]["status"], 404);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let (logger, sink) = common::memory_logger();
    let server = HttpServer::new(Arc::new(Settings::default()), logger);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    let messages: Vec<_> = common::records(&sink)
        .into_iter()
        .map(|r| r["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages, ["HTTP server starting", "HTTP server stopped"]);
}
