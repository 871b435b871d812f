use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::assessment_dto::{SaveAssessmentPayload, SubmitResponsePayload},
    error::Result,
    AppState,
};

/// Responds with JSON `null` when the job has no assessment yet.
#[utoipa::path(
    get,
    path = "/assessments/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Assessment document or null", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse> {
    let assessment = state.assessment_service.get(&job_id).await?;
    Ok(Json(assessment))
}

#[utoipa::path(
    put,
    path = "/assessments/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID")
    ),
    request_body = SaveAssessmentPayload,
    responses(
        (status = 200, description = "Assessment replaced", body = Json<serde_json::Value>),
        (status = 400, description = "Section references an unknown or repeated question"),
        (status = 500, description = "Simulated write failure")
    )
)]
#[axum::debug_handler]
pub async fn save_assessment(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    payload: std::result::Result<Json<SaveAssessmentPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state.faults.check("save_assessment")?;
    let Json(payload) = payload?;
    state.assessment_service.save(&job_id, payload).await?;
    Ok(Json(json!({ "ok": true })))
}

#[utoipa::path(
    post,
    path = "/assessments/{job_id}/submit",
    params(
        ("job_id" = String, Path, description = "Job ID")
    ),
    request_body = SubmitResponsePayload,
    responses(
        (status = 200, description = "Response recorded", body = Json<serde_json::Value>),
        (status = 400, description = "candidateId or answers missing"),
        (status = 500, description = "Simulated write failure")
    )
)]
#[axum::debug_handler]
pub async fn submit_response(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    payload: std::result::Result<Json<SubmitResponsePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state.faults.check("submit_assessment")?;
    let Json(payload) = payload?;
    state.assessment_service.submit(&job_id, payload).await?;
    Ok(Json(json!({ "ok": true })))
}
