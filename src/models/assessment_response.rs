use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub answers: Map<String, JsonValue>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record for AssessmentResponse {
    const COLLECTION: &'static str = "assessment_responses";
    const INDEXES: &'static [&'static str] = &["jobId", "candidateId", "createdAt"];

    fn key(&self) -> &str {
        &self.id
    }
}
