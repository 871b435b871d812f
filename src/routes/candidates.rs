use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        candidate_dto::{CandidateListQuery, CandidatePatch, NotePayload},
        common_dto::ItemsResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/candidates",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive name or email substring"),
        ("stage" = Option<String>, Query, description = "Pipeline stage"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("pageSize" = Option<usize>, Query, description = "Candidates per page, default 50")
    ),
    responses(
        (status = 200, description = "Page of candidates", body = Json<serde_json::Value>),
        (status = 400, description = "Malformed query string")
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    query: std::result::Result<Query<CandidateListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let page = state.candidate_service.list(query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/candidates/{id}/timeline",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Timeline, oldest first", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let items = state.candidate_service.timeline(&id).await?;
    Ok(Json(ItemsResponse { items }))
}

#[utoipa::path(
    post,
    path = "/candidates/{id}/notes",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    request_body = NotePayload,
    responses(
        (status = 201, description = "Note appended", body = Json<serde_json::Value>),
        (status = 400, description = "Message missing or blank")
    )
)]
#[axum::debug_handler]
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<NotePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let note = state.candidate_service.add_note(&id, payload).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    patch,
    path = "/candidates/{id}",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    request_body = CandidatePatch,
    responses(
        (status = 200, description = "Candidate updated", body = Json<serde_json::Value>),
        (status = 400, description = "Unknown stage or malformed email"),
        (status = 404, description = "Candidate not found"),
        (status = 500, description = "Simulated write failure")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<CandidatePatch>, JsonRejection>,
) -> Result<impl IntoResponse> {
    state.faults.check("update_candidate")?;
    let Json(patch) = payload?;
    patch.validate()?;
    let candidate = state.candidate_service.update(&id, patch).await?;
    Ok(Json(candidate))
}
