#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use talentflow_backend::{
    config::Config,
    interceptor::Interceptor,
    models::{
        candidate::{Candidate, Stage},
        timeline::{CandidateTimelineItem, TimelineKind},
    },
    store::LocalStore,
    utils::time,
};
use uuid::Uuid;

/// In-memory store, no latency, no injected failures, no fixtures.
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        latency_min_ms: 0,
        latency_max_ms: 0,
        write_failure_rate: 0.0,
        fault_seed: Some(7),
        passthrough_url: None,
        seed_on_start: false,
        seed_candidates: 20,
        ..Config::default()
    }
}

pub async fn start(config: Config) -> Interceptor {
    Interceptor::start(&config).await.expect("start interceptor")
}

pub async fn call(
    app: &Interceptor,
    method: Method,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let resp = app.dispatch(req).await;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn insert_candidate(
    store: &LocalStore,
    job_id: &str,
    name: &str,
    email: &str,
    stage: Stage,
) -> Candidate {
    let ts = time::now();
    let candidate = Candidate {
        id: Uuid::new_v4().to_string(),
        job_id: job_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        stage,
        created_at: ts,
        updated_at: ts,
    };
    store.candidates.add(&candidate).await.unwrap();
    candidate
}

pub async fn insert_timeline_item(
    store: &LocalStore,
    candidate_id: &str,
    message: &str,
    created_at: DateTime<Utc>,
) -> CandidateTimelineItem {
    let item = CandidateTimelineItem {
        id: Uuid::new_v4().to_string(),
        candidate_id: candidate_id.to_string(),
        kind: TimelineKind::StatusChange,
        message: message.to_string(),
        created_at,
    };
    store.timeline.add(&item).await.unwrap();
    item
}
