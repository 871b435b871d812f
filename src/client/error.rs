use serde::Deserialize;

use super::RawResponse;

/// Failure of one client call, classified for retry decisions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Request rejected with {status}: {message}")]
    Client { status: u16, message: String },

    #[error("Simulated server failure: {message}")]
    SimulatedFailure { message: String },

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    InvalidResponseFormat(String),

    #[error("Could not parse response body: {0}")]
    JsonParse(String),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ApiError {
    /// Classifies a non-2xx response from its status and `{message, code}` body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .message
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        match status {
            400 => ApiError::Validation { message },
            404 => ApiError::NotFound { message },
            401..=499 => ApiError::Client { status, message },
            500 if parsed.code.as_deref() == Some("SIMULATED_FAILURE") => {
                ApiError::SimulatedFailure { message }
            }
            500..=599 => ApiError::Server { status, message },
            other => ApiError::InvalidResponseFormat(format!("unexpected status {}", other)),
        }
    }

    /// A body that is not valid JSON: a non-JSON content type means the
    /// service answered with something other than the API, otherwise the
    /// JSON itself is broken.
    pub fn unparseable(response: &RawResponse, err: serde_json::Error) -> Self {
        if response.is_json() {
            ApiError::JsonParse(err.to_string())
        } else {
            ApiError::InvalidResponseFormat(format!(
                "status {} with content-type {}",
                response.status,
                response.content_type.as_deref().unwrap_or("none")
            ))
        }
    }

    /// HTTP status the failure corresponds to, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::SimulatedFailure { .. } => Some(500),
            ApiError::Timeout => Some(408),
            ApiError::Network(_) | ApiError::InvalidResponseFormat(_) | ApiError::JsonParse(_) => {
                None
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Client { .. } => "CLIENT_ERROR",
            ApiError::SimulatedFailure { .. } => "SIMULATED_FAILURE",
            ApiError::Server { .. } => "SERVER_ERROR",
            ApiError::Timeout => "TIMEOUT",
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::InvalidResponseFormat(_) => "INVALID_RESPONSE_FORMAT",
            ApiError::JsonParse(_) => "JSON_PARSE_ERROR",
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout
                | ApiError::Network(_)
                | ApiError::SimulatedFailure { .. }
                | ApiError::Server { .. }
        )
    }
}
