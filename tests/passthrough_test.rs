mod common;

use axum::{
    http::{Method, StatusCode},
    response::Html,
    routing::get,
    Json, Router,
};
use serde_json::json;
use talentflow_backend::{
    client::{ApiError, ApiRequest, Transport},
    config::Config,
};
use tokio::net::TcpListener;

use common::{call, start, test_config};

#[tokio::test]
async fn unmatched_requests_reach_the_upstream() {
    let upstream = Router::new()
        .route("/api/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route(
            "/jobs",
            axum::routing::delete(|| async { (StatusCode::ACCEPTED, Json(json!({ "deleted": true }))) }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    let app = start(Config {
        passthrough_url: Some(format!("http://{}/", addr)),
        ..test_config()
    })
    .await;

    let (status, body) = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    // Known path, unlisted method.
    let (status, body) = call(&app, Method::DELETE, "/jobs", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["deleted"], true);
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = start(Config {
        passthrough_url: Some(format!("http://{}", addr)),
        ..test_config()
    })
    .await;

    let (status, body) = call(&app, Method::GET, "/elsewhere", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "PASSTHROUGH_UNAVAILABLE");
}

#[tokio::test]
async fn upstream_content_type_reaches_the_client() {
    let upstream = Router::new().route(
        "/landing",
        get(|| async { Html("<html><body>Loading</body></html>") }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    let app = start(Config {
        passthrough_url: Some(format!("http://{}", addr)),
        ..test_config()
    })
    .await;

    let html = app.send(ApiRequest::get("/landing")).await.unwrap();
    assert_eq!(html.status, 200);
    assert!(!html.is_json());
    let err = serde_json::from_slice::<serde_json::Value>(&html.body).unwrap_err();
    assert!(matches!(
        ApiError::unparseable(&html, err),
        ApiError::InvalidResponseFormat(_)
    ));

    let jobs = app.send(ApiRequest::get("/jobs")).await.unwrap();
    assert!(jobs.is_json());
}
