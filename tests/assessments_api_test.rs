mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value as JsonValue};
use talentflow_backend::config::Config;

use common::{call, start, test_config};

fn document(section_title: &str) -> JsonValue {
    json!({
        "id": "ignored",
        "sections": [
            { "id": "s1", "title": section_title, "questionIds": ["q1", "q2"] }
        ],
        "questions": {
            "q1": { "id": "q1", "type": "single", "label": "Remote?", "required": true, "options": ["yes", "no"] },
            "q2": {
                "id": "q2",
                "type": "number",
                "label": "Years of experience",
                "min": 0,
                "max": 50,
                "showIf": { "questionId": "q1", "equals": "yes" }
            }
        }
    })
}

#[tokio::test]
async fn missing_assessment_is_null() {
    let app = start(test_config()).await;
    let (status, body) = call(&app, Method::GET, "/assessments/job-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, JsonValue::Null);
}

#[tokio::test]
async fn save_overwrites_under_the_path_job_id() {
    let app = start(test_config()).await;

    let (status, body) = call(&app, Method::PUT, "/assessments/job-1", Some(document("Basics"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _) = call(&app, Method::PUT, "/assessments/job-1", Some(document("Updated"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, saved) = call(&app, Method::GET, "/assessments/job-1", None).await;
    assert_eq!(saved["id"], "job-1");
    assert_eq!(saved["sections"][0]["title"], "Updated");
    assert_eq!(saved["questions"]["q2"]["showIf"]["questionId"], "q1");
    assert!(saved["updatedAt"].is_i64());
    assert_eq!(app.store().assessments.count().await.unwrap(), 1);
}

#[tokio::test]
async fn save_rejects_broken_sections() {
    let app = start(test_config()).await;

    let mut doc = document("Basics");
    doc["sections"][0]["questionIds"] = json!(["q1", "q9"]);
    let (status, body) = call(&app, Method::PUT, "/assessments/job-1", Some(doc)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let mut doc = document("Basics");
    doc["sections"][0]["questionIds"] = json!(["q1", "q1"]);
    let (status, _) = call(&app, Method::PUT, "/assessments/job-1", Some(doc)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, saved) = call(&app, Method::GET, "/assessments/job-1", None).await;
    assert_eq!(saved, JsonValue::Null);
}

#[tokio::test]
async fn submit_appends_responses_without_checking_answers() {
    let app = start(test_config()).await;
    call(&app, Method::PUT, "/assessments/job-1", Some(document("Basics"))).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/assessments/job-1/submit",
        Some(json!({ "answers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/assessments/job-1/submit",
        Some(json!({ "candidateId": "c1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let (status, body) = call(
            &app,
            Method::POST,
            "/assessments/job-1/submit",
            Some(json!({ "candidateId": "c1", "answers": { "q1": "maybe", "q2": 900 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    let responses = app.store().responses.to_vec().await.unwrap();
    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r.job_id == "job-1" && r.candidate_id == "c1"));
}

#[tokio::test]
async fn assessment_writes_are_fault_eligible() {
    let app = start(Config {
        write_failure_rate: 1.0,
        ..test_config()
    })
    .await;

    let (status, body) = call(&app, Method::PUT, "/assessments/job-1", Some(document("Basics"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Random failure");

    let (status, _) = call(&app, Method::GET, "/assessments/job-1", None).await;
    assert_eq!(status, StatusCode::OK);
}
