use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::job_dto::{CreateJobPayload, JobListQuery, JobPatch, ReorderPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/jobs",
    params(
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("pageSize" = Option<usize>, Query, description = "Jobs per page, default 10"),
        ("title" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("status" = Option<String>, Query, description = "active or archived"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags, all required")
    ),
    responses(
        (status = 200, description = "Page of jobs, newest first", body = Json<serde_json::Value>),
        (status = 400, description = "Malformed query string")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    query: std::result::Result<Query<JobListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let page = state.job_service.list(query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Json<serde_json::Value>),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_by_id(&id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = Json<serde_json::Value>),
        (status = 400, description = "Title missing or payload invalid"),
        (status = 500, description = "Simulated write failure")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateJobPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state.faults.check("create_job")?;
    let Json(payload) = payload?;
    payload.validate()?;
    let job = state.job_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    patch,
    path = "/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    request_body = JobPatch,
    responses(
        (status = 200, description = "Job updated", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found"),
        (status = 500, description = "Simulated write failure")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<JobPatch>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state.faults.check("update_job")?;
    let Json(patch) = payload?;
    patch.validate()?;
    let job = state.job_service.update(&id, patch).await?;
    Ok(Json(job))
}

/// The `{id}` segment is part of the route shape only; the body carries the
/// full ordering.
#[utoipa::path(
    patch,
    path = "/jobs/{id}/reorder",
    params(
        ("id" = String, Path, description = "Ignored")
    ),
    request_body = ReorderPayload,
    responses(
        (status = 200, description = "Jobs re-ranked", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload"),
        (status = 500, description = "Simulated write failure")
    )
)]
#[axum::debug_handler]
pub async fn reorder_jobs(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    payload: std::result::Result<Json<ReorderPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state.faults.check("reorder_jobs")?;
    let Json(payload) = payload?;
    state.job_service.reorder(&payload.ordered_ids).await?;
    Ok(Json(json!({ "ok": true })))
}
