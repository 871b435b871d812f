use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Random failure")]
    SimulatedFailure,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    #[error("Passthrough error: {0}")]
    Passthrough(String),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Machine-readable code carried next to the message in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Validation(_) => "VALIDATION_ERROR",
            Error::Json(_) | Error::JsonBody(_) => "INVALID_BODY",
            Error::Query(_) => "INVALID_QUERY",
            Error::NotFound(_) => "NOT_FOUND",
            Error::DuplicateKey(_) => "DUPLICATE_KEY",
            Error::SimulatedFailure => "SIMULATED_FAILURE",
            Error::Passthrough(_) | Error::Reqwest(_) => "PASSTHROUGH_UNAVAILABLE",
            Error::Database(_) | Error::Migration(_) => "STORE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let code = self.code();
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::DuplicateKey(key) => (
                StatusCode::CONFLICT,
                format!("Record with key {} already exists", key),
            ),
            Error::SimulatedFailure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Random failure".to_string(),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::JsonBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Error::Query(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Error::Passthrough(msg) => (StatusCode::BAD_GATEWAY, msg),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                format!("Upstream request failed: {}", err),
            ),
            Error::Database(err) => {
                tracing::error!(error = %err, "Local store error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            other => {
                tracing::error!(error = %other, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "message": error_message, "code": code }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Not found".to_string()),
            other => Error::Database(other),
        }
    }
}
